use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::{DateChoices, RequestId},
    events::{EventProducers, PairConfirmedEvent},
    mm_api::LifecycleError,
    traits::{MatchingGatewayDatabase, SubmissionOutcome},
};

/// `NegotiationApi` runs the scheduling negotiation: each side of a matched pair submits candidate
/// dates and locations, and the engine decides whether they agree.
pub struct NegotiationApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for NegotiationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NegotiationApi")
    }
}

impl<B> NegotiationApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> NegotiationApi<B>
where B: MatchingGatewayDatabase
{
    /// Submits one side's schedule choices.
    ///
    /// If the partner has not submitted yet, the choices are stored and the pair waits. If both
    /// sides are in, the overlap is computed immediately: a common date and region confirms the
    /// pair (the earliest shared date wins), no common ground marks the submitter `Mismatched`,
    /// from where a fresh submission re-enters the negotiation.
    pub async fn submit_choices(
        &self,
        request_id: &RequestId,
        choices: DateChoices,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, LifecycleError> {
        if choices.dates.is_empty() || choices.locations.is_empty() {
            return Err(LifecycleError::EmptyChoices);
        }
        let outcome = self.db.submit_choices(request_id, choices, now).await?;
        match &outcome {
            SubmissionOutcome::WaitingForPartner(r) => {
                debug!("📅️ [{}] choices stored; waiting on partner", r.request_id);
            },
            SubmissionOutcome::Confirmed { request, partner, schedule } => {
                info!(
                    "📅️ [{}] and [{}] agreed on {} at {}",
                    request.request_id,
                    partner.request_id,
                    schedule.final_date,
                    schedule.final_location()
                );
                self.call_pair_confirmed_hook(&outcome).await;
            },
            SubmissionOutcome::Mismatched(r) => {
                info!("📅️ [{}] found no schedule overlap; marked mismatched", r.request_id);
            },
        }
        Ok(outcome)
    }

    async fn call_pair_confirmed_hook(&self, outcome: &SubmissionOutcome) {
        let SubmissionOutcome::Confirmed { request, partner, .. } = outcome else { return };
        for emitter in &self.producers.pair_confirmed_producer {
            debug!("📅️ Notifying pair confirmed hook subscribers");
            for req in [request, partner] {
                let event = PairConfirmedEvent::new(req.clone());
                emitter.publish_event(event).await;
            }
        }
    }
}
