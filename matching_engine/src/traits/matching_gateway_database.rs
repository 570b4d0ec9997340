use chrono::{DateTime, Utc};
use mm_common::Credits;

use crate::{
    db_types::{
        CreditAccount,
        DateChoices,
        MatchingRequest,
        MatchPair,
        NewMatchingRequest,
        NewProposal,
        PairId,
        Proposal,
        ProposalId,
        RequestId,
    },
    traits::{ExchangeOutcome, MatchingStoreError, ProposalResolution, SubmissionOutcome, TimedOutPair},
};

/// The transactional contract a backend must satisfy to drive the matching lifecycle.
///
/// Every method is a single unit of work. At-most-once transitions (refund issuance, proposal
/// resolution, pair and request state changes) must be written as conditional updates — "move
/// from the expected prior state to the new state, else no-op" — never as a read followed by a
/// separate write. The timeout sweep methods may run concurrently with the user-driven methods;
/// the shared guards guarantee they never drive one pair to two different terminal states.
#[allow(async_fn_in_trait)]
pub trait MatchingGatewayDatabase: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Creates a matching request for a requester, debiting the fixed credit cost and appending a
    /// `Spend` ledger entry, all atomically.
    ///
    /// Fails with `InsufficientCredits` when the balance cannot cover the cost, and with
    /// `DuplicateRequest` when the requester already has an active request (conditional create).
    async fn create_request(&self, request: NewMatchingRequest, cost: Credits) -> Result<MatchingRequest, MatchingStoreError>;

    /// Credits a requester's account, creating it when absent, and appends a `Deposit` entry.
    async fn deposit_credits(&self, requester_id: &str, amount: Credits, reason: &str) -> Result<CreditAccount, MatchingStoreError>;

    /// Stores a new directed introduction offer in `Propose` status.
    async fn create_proposal(&self, proposal: NewProposal) -> Result<Proposal, MatchingStoreError>;

    /// Accepts a proposal: flips it `Propose`→`Accept` with a guarded update, stamps
    /// `responded_at`, ensures the target's request exists (creating one in `Matched` when
    /// absent), moves both requests to `Matched`, cross-links them, and creates or reactivates
    /// the pair with `confirm_proposed = true`.
    ///
    /// A proposal that is no longer in `Propose` yields `AlreadyResolved` and no side effects.
    async fn accept_proposal(&self, propose_id: &ProposalId, now: DateTime<Utc>) -> Result<ProposalResolution, MatchingStoreError>;

    /// Refuses a proposal: flips it `Propose`→`Refuse`. When the two requests still share a
    /// pending pair (a repeat introduction), that pair is finished with
    /// `confirm_proposed = false` and both sides return to `Waiting`; otherwise only a
    /// still-waiting proposer is released.
    async fn refuse_proposal(&self, propose_id: &ProposalId, now: DateTime<Utc>) -> Result<ProposalResolution, MatchingStoreError>;

    /// Persists one side's schedule choices and decides the pair's next state: waiting on the
    /// partner, confirmed (both sides updated atomically with the agreed date and location), or
    /// mismatched. A `Mismatched` request re-enters here as a fresh `Matched` attempt.
    async fn submit_choices(
        &self,
        request_id: &RequestId,
        choices: DateChoices,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, MatchingStoreError>;

    /// Records a meet-again vote for the caller's side of the pair. When both sides have voted
    /// `true`, marks the pair `contact_shared`/`both_interested` and finishes both requests.
    async fn record_meet_again(
        &self,
        pair_id: &PairId,
        requester_id: &str,
        wants_again: bool,
        now: DateTime<Utc>,
    ) -> Result<ExchangeOutcome, MatchingStoreError>;

    /// Attaches a review's contact payload to the caller's side of the pair. Once both sides
    /// carry non-empty contacts, the pair and both requests move to `Exchanged`.
    async fn attach_review_contact(
        &self,
        pair_id: &PairId,
        requester_id: &str,
        contact: &str,
        now: DateTime<Utc>,
    ) -> Result<ExchangeOutcome, MatchingStoreError>;

    /// Confirms every `Matched` pair whose two sides already submitted overlapping choices.
    /// Heals pairs that missed the synchronous confirmation in [`Self::submit_choices`].
    async fn auto_confirm_ready_pairs(&self, now: DateTime<Utc>) -> Result<Vec<MatchPair>, MatchingStoreError>;

    /// Force-fails every `Matched` pair created strictly before `cutoff`: both requests become
    /// `Failed` with the no-response reason, the pair finishes, and each side whose
    /// `points_refunded` guard is still clear is refunded exactly once.
    async fn expire_unresponsive_pairs(
        &self,
        cutoff: DateTime<Utc>,
        refund: Credits,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimedOutPair>, MatchingStoreError>;

    /// Force-fails every `Confirmed` pair whose confirmation is strictly older than `cutoff`,
    /// returning each pair with the requests it failed. No refund: a date was already agreed.
    async fn expire_unmet_pairs(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Result<Vec<TimedOutPair>, MatchingStoreError>;

    /// Soft-deletes every `Finished` request untouched since before `cutoff` by marking it
    /// `Cleaned` with the retention reason.
    async fn clean_finished_requests(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> Result<Vec<MatchingRequest>, MatchingStoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), MatchingStoreError> {
        Ok(())
    }
}
