use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};
use log::*;
use mm_common::Credits;

use crate::{
    db_types::{MatchingRequest, MatchPair},
    events::{EventProducers, RequestFailedEvent},
    mm_api::LifecycleError,
    traits::{MatchingGatewayDatabase, TimedOutPair},
};

/// What one sweep pass did. Every list may legitimately be empty; a re-run over the same data
/// yields empty lists, since every transition it takes is guarded.
#[derive(Debug, Clone, Default)]
pub struct SweepResult {
    /// Pairs promoted to `Confirmed` because both sides' stored choices already overlapped.
    pub auto_confirmed: Vec<MatchPair>,
    /// Matched pairs that blew the response deadline, with their refunds.
    pub timed_out: Vec<TimedOutPair>,
    /// Confirmed pairs whose meeting never completed within the deadline. No refunds here.
    pub unmet: Vec<TimedOutPair>,
    /// Finished requests soft-deleted after the retention window.
    pub cleaned: Vec<MatchingRequest>,
}

impl SweepResult {
    pub fn is_empty(&self) -> bool {
        self.auto_confirmed.is_empty() && self.timed_out.is_empty() && self.unmet.is_empty() && self.cleaned.is_empty()
    }
}

/// The deadlines one sweep pass enforces, expressed as durations measured back from `now`.
#[derive(Debug, Clone, Copy)]
pub struct SweepDeadlines {
    /// How long a matched pair may sit without both sides responding.
    pub response_timeout: Duration,
    /// How long a confirmed pair may sit without the meeting completing.
    pub completion_timeout: Duration,
    /// How long a finished request is retained before being cleaned.
    pub retention_window: Duration,
}

/// `SweeperApi` is the engine's background caretaker. One [`Self::sweep`] pass auto-confirms
/// pairs that are ready, force-fails pairs that blew a deadline (refunding each side at most
/// once), and cleans finished requests past the retention window.
pub struct SweeperApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for SweeperApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SweeperApi")
    }
}

impl<B> SweeperApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> SweeperApi<B>
where B: MatchingGatewayDatabase
{
    /// Runs one full sweep pass at `now`. The order matters: ready pairs are confirmed before the
    /// response timeout runs, so a pair that agreed in time is never failed by the same pass.
    pub async fn sweep(&self, now: DateTime<Utc>, deadlines: SweepDeadlines) -> Result<SweepResult, LifecycleError> {
        trace!("🕰️ Sweep pass starting");
        let auto_confirmed = self.db.auto_confirm_ready_pairs(now).await?;
        let response_cutoff = now - deadlines.response_timeout;
        let refund = Credits::request_cost();
        let timed_out = self.db.expire_unresponsive_pairs(response_cutoff, refund, now).await?;
        let completion_cutoff = now - deadlines.completion_timeout;
        let unmet = self.db.expire_unmet_pairs(completion_cutoff, now).await?;
        let retention_cutoff = now - deadlines.retention_window;
        let cleaned = self.db.clean_finished_requests(retention_cutoff, now).await?;
        let result = SweepResult { auto_confirmed, timed_out, unmet, cleaned };
        if result.is_empty() {
            trace!("🕰️ Sweep pass complete; nothing to do");
        } else {
            info!(
                "🕰️ Sweep pass complete: {} auto-confirmed, {} response timeouts, {} completion timeouts, {} cleaned",
                result.auto_confirmed.len(),
                result.timed_out.len(),
                result.unmet.len(),
                result.cleaned.len()
            );
            self.call_request_failed_hook(&result).await;
        }
        Ok(result)
    }

    async fn call_request_failed_hook(&self, result: &SweepResult) {
        for emitter in &self.producers.request_failed_producer {
            debug!("🕰️ Notifying request failed hook subscribers");
            for timed_out in result.timed_out.iter().chain(&result.unmet) {
                for request in &timed_out.failed_requests {
                    let event = RequestFailedEvent::new(request.clone());
                    emitter.publish_event(event).await;
                }
            }
        }
    }
}
