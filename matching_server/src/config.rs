use std::env;

use chrono::Duration;
use log::*;
use matching_engine::SweepDeadlines;
use mm_common::parse_boolean_flag;

const DEFAULT_MMS_HOST: &str = "127.0.0.1";
const DEFAULT_MMS_PORT: u16 = 8360;
const DEFAULT_RESPONSE_TIMEOUT_DAYS: i64 = 7;
const DEFAULT_COMPLETION_TIMEOUT_DAYS: i64 = 30;
const DEFAULT_RETENTION_WINDOW_DAYS: i64 = 3;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The time a matched pair may wait for schedule choices before it is failed and refunded.
    pub response_timeout: Duration,
    /// The time a confirmed pair may wait for the meeting to complete before it is failed.
    pub completion_timeout: Duration,
    /// The time a finished request is retained before the retention sweeper cleans it.
    pub retention_window: Duration,
    /// How often the sweep worker runs, in seconds.
    pub sweep_interval_secs: u64,
    /// Whether the background sweep worker runs at all. When false, deadlines are only enforced
    /// through the operator's forced-sweep endpoint.
    pub run_sweeper: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MMS_HOST.to_string(),
            port: DEFAULT_MMS_PORT,
            database_url: String::default(),
            response_timeout: Duration::days(DEFAULT_RESPONSE_TIMEOUT_DAYS),
            completion_timeout: Duration::days(DEFAULT_COMPLETION_TIMEOUT_DAYS),
            retention_window: Duration::days(DEFAULT_RETENTION_WINDOW_DAYS),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            run_sweeper: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MMS_HOST").ok().unwrap_or_else(|| DEFAULT_MMS_HOST.into());
        let port = env::var("MMS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MMS_PORT. {e} Using the default, {DEFAULT_MMS_PORT}, instead."
                    );
                    DEFAULT_MMS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MMS_PORT);
        let database_url = env::var("MMS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MMS_DATABASE_URL is not set. Please set it to the URL for the matching store database.");
            String::default()
        });
        let response_timeout = duration_from_env("MMS_RESPONSE_TIMEOUT_DAYS", DEFAULT_RESPONSE_TIMEOUT_DAYS);
        let completion_timeout = duration_from_env("MMS_COMPLETION_TIMEOUT_DAYS", DEFAULT_COMPLETION_TIMEOUT_DAYS);
        let retention_window = duration_from_env("MMS_RETENTION_WINDOW_DAYS", DEFAULT_RETENTION_WINDOW_DAYS);
        let sweep_interval_secs = env::var("MMS_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for MMS_SWEEP_INTERVAL_SECS. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
        let run_sweeper = parse_boolean_flag(env::var("MMS_RUN_SWEEPER").ok(), true);
        Self {
            host,
            port,
            database_url,
            response_timeout,
            completion_timeout,
            retention_window,
            sweep_interval_secs,
            run_sweeper,
        }
    }

    /// The deadline set handed to the sweeper on every pass.
    pub fn sweep_deadlines(&self) -> SweepDeadlines {
        SweepDeadlines {
            response_timeout: self.response_timeout,
            completion_timeout: self.completion_timeout,
            retention_window: self.retention_window,
        }
    }
}

fn duration_from_env(var: &str, default_days: i64) -> Duration {
    env::var(var)
        .map_err(|_| info!("🪛️ {var} is not set. Using the default value of {default_days} days."))
        .and_then(|s| {
            s.parse::<i64>().map(Duration::days).map_err(|e| warn!("🪛️ Invalid configuration value for {var}. {e}"))
        })
        .ok()
        .unwrap_or_else(|| Duration::days(default_days))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn the_sweep_worker_runs_by_default() {
        let config = ServerConfig::default();
        assert!(config.run_sweeper);
        assert_eq!(config.sweep_interval_secs, DEFAULT_SWEEP_INTERVAL_SECS);
    }
}
