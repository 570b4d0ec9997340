use chrono::Utc;
use log::*;
use matching_engine::{db_types::MatchPair, events::EventProducers, SqliteDatabase, SweeperApi};
use tokio::task::JoinHandle;

use crate::config::ServerConfig;

/// Starts the lifecycle sweep worker. Do not await the returned JoinHandle, as it will run
/// indefinitely.
pub fn start_sweep_worker(db: SqliteDatabase, producers: EventProducers, config: ServerConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(config.sweep_interval_secs));
        let api = SweeperApi::new(db, producers);
        info!("🕰️ Lifecycle sweep worker started (every {}s)", config.sweep_interval_secs);
        loop {
            timer.tick().await;
            trace!("🕰️ Running lifecycle sweep job");
            match api.sweep(Utc::now(), config.sweep_deadlines()).await {
                Ok(result) => {
                    if !result.is_empty() {
                        debug!("🕰️ Auto-confirmed pairs: {}", pair_list(&result.auto_confirmed));
                        let timed_out = result.timed_out.iter().map(|t| t.pair.clone()).collect::<Vec<_>>();
                        debug!("🕰️ Response-timeout pairs: {}", pair_list(&timed_out));
                        let unmet = result.unmet.iter().map(|t| t.pair.clone()).collect::<Vec<_>>();
                        debug!("🕰️ Completion-timeout pairs: {}", pair_list(&unmet));
                        debug!("🕰️ {} requests cleaned", result.cleaned.len());
                    }
                },
                Err(e) => {
                    error!("🕰️ Error running lifecycle sweep job: {e}");
                },
            }
        }
    })
}

fn pair_list(pairs: &[MatchPair]) -> String {
    pairs
        .iter()
        .map(|p| format!("[{}] {} / {}", p.pair_id, p.match_a_id, p.match_b_id))
        .collect::<Vec<String>>()
        .join(", ")
}
