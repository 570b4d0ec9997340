use chrono::{DateTime, Utc};

use crate::{
    db_types::{CreditAccount, LedgerEntry, MatchingRequest, MatchPair, PairId, Proposal, ProposalId, RequestId},
    traits::MatchingStoreError,
};

/// Read-only queries over the matching store. These back the operator surface and the public
/// read endpoints; none of them mutate state.
#[allow(async_fn_in_trait)]
pub trait RequestManagement: Clone {
    async fn fetch_request(&self, request_id: &RequestId) -> Result<Option<MatchingRequest>, MatchingStoreError>;

    /// The requester's active (non-terminal) request, if any. At most one exists.
    async fn fetch_active_request_for_requester(&self, requester_id: &str) -> Result<Option<MatchingRequest>, MatchingStoreError>;

    async fn fetch_pair(&self, pair_id: &PairId) -> Result<Option<MatchPair>, MatchingStoreError>;

    async fn fetch_proposal(&self, propose_id: &ProposalId) -> Result<Option<Proposal>, MatchingStoreError>;

    async fn fetch_credit_account(&self, requester_id: &str) -> Result<Option<CreditAccount>, MatchingStoreError>;

    /// The append-only ledger for a requester, oldest first.
    async fn fetch_ledger(&self, requester_id: &str) -> Result<Vec<LedgerEntry>, MatchingStoreError>;

    /// Proposals still awaiting a response, oldest first.
    async fn pending_proposals(&self) -> Result<Vec<Proposal>, MatchingStoreError>;

    /// Non-terminal pairs that have not progressed since before `stalled_since` — the operator's
    /// view of pairs the next sweep will act on.
    async fn stuck_pairs(&self, stalled_since: DateTime<Utc>) -> Result<Vec<MatchPair>, MatchingStoreError>;
}
