use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::{NewProposal, Proposal, ProposalId},
    events::{EventProducers, RequestMatchedEvent},
    mm_api::LifecycleError,
    traits::{MatchingGatewayDatabase, ProposalResolution},
};

/// `ProposalApi` drives the introduction workflow: recording directed offers and resolving them
/// exactly once into a live pair (accept) or a released proposer (refuse).
pub struct ProposalApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ProposalApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProposalApi")
    }
}

impl<B> ProposalApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ProposalApi<B>
where B: MatchingGatewayDatabase
{
    /// Records a directed introduction offer from `proposer_id` to `target_id`.
    pub async fn propose(&self, proposer_id: &str, target_id: &str) -> Result<Proposal, LifecycleError> {
        if proposer_id == target_id {
            return Err(LifecycleError::SelfProposal);
        }
        let proposal = self.db.create_proposal(NewProposal::new(proposer_id, target_id)).await?;
        info!("🤝️ Proposal [{}] recorded: {proposer_id} → {target_id}", proposal.propose_id);
        Ok(proposal)
    }

    /// Accepts a pending proposal. The first resolution wins; any later accept or refuse of the
    /// same proposal fails with `AlreadyResolved` and has no side effects.
    pub async fn accept(&self, propose_id: &ProposalId, now: DateTime<Utc>) -> Result<ProposalResolution, LifecycleError> {
        let resolution = self.db.accept_proposal(propose_id, now).await?;
        if let Some(pair) = &resolution.pair {
            info!("🤝️ Proposal [{propose_id}] accepted. Pair [{}] is live", pair.pair_id);
            self.call_request_matched_hook(&resolution).await;
        }
        Ok(resolution)
    }

    /// Refuses a pending proposal, releasing the proposer's request back to the waiting pool.
    pub async fn refuse(&self, propose_id: &ProposalId, now: DateTime<Utc>) -> Result<ProposalResolution, LifecycleError> {
        let resolution = self.db.refuse_proposal(propose_id, now).await?;
        info!("🤝️ Proposal [{propose_id}] refused");
        Ok(resolution)
    }

    async fn call_request_matched_hook(&self, resolution: &ProposalResolution) {
        let Some(pair) = &resolution.pair else { return };
        for emitter in &self.producers.request_matched_producer {
            debug!("🤝️ Notifying request matched hook subscribers");
            let event = RequestMatchedEvent::new(
                pair.clone(),
                resolution.proposer_request.clone(),
                resolution.target_request.clone(),
            );
            emitter.publish_event(event).await;
        }
    }
}
