use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::PairId,
    mm_api::LifecycleError,
    traits::{ExchangeOutcome, MatchingGatewayDatabase},
};

/// `ExchangeApi` guards the post-meeting flow: meet-again votes and the contact exchange gate.
/// Contact details only travel once both sides have opted in.
pub struct ExchangeApi<B> {
    db: B,
}

impl<B> Debug for ExchangeApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExchangeApi")
    }
}

impl<B> ExchangeApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ExchangeApi<B>
where B: MatchingGatewayDatabase
{
    /// Records one side's meet-again vote. When both sides have voted yes, the pair finishes with
    /// `contact_shared` set and both requests move to `Finished`.
    pub async fn vote_meet_again(
        &self,
        pair_id: &PairId,
        requester_id: &str,
        wants_again: bool,
        now: DateTime<Utc>,
    ) -> Result<ExchangeOutcome, LifecycleError> {
        let outcome = self.db.record_meet_again(pair_id, requester_id, wants_again, now).await?;
        if outcome.finalized {
            info!("💌️ Pair [{pair_id}] has mutual interest; contact exchange is open");
        } else {
            debug!("💌️ Vote recorded for {requester_id} on pair [{pair_id}]");
        }
        Ok(outcome)
    }

    /// Attaches the contact payload from one side's review. Once both sides have supplied a
    /// non-empty contact, the pair moves to `Exchanged`.
    pub async fn submit_contact(
        &self,
        pair_id: &PairId,
        requester_id: &str,
        contact: &str,
        now: DateTime<Utc>,
    ) -> Result<ExchangeOutcome, LifecycleError> {
        if contact.trim().is_empty() {
            return Err(LifecycleError::EmptyContact);
        }
        let outcome = self.db.attach_review_contact(pair_id, requester_id, contact, now).await?;
        if outcome.finalized {
            info!("💌️ Pair [{pair_id}] exchanged contact details");
        } else {
            debug!("💌️ Contact stored for {requester_id} on pair [{pair_id}]");
        }
        Ok(outcome)
    }
}
