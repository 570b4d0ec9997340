use thiserror::Error;

use crate::db_types::{PairId, ProposalId, RequestId, RequestStatus};

#[derive(Debug, Error)]
pub enum MatchingStoreError {
    #[error("Matching request {0} does not exist")]
    RequestNotFound(RequestId),
    #[error("Match pair {0} does not exist")]
    PairNotFound(PairId),
    #[error("Proposal {0} does not exist")]
    ProposalNotFound(ProposalId),
    #[error("No credit account exists for requester {0}")]
    RequesterNotFound(String),
    #[error("Requester {0} has no active matching request")]
    NoActiveRequest(String),
    #[error("Requester {0} already has an active matching request")]
    DuplicateRequest(String),
    #[error("Proposal {0} has already been resolved")]
    AlreadyResolved(ProposalId),
    #[error("Requester {0} has insufficient credits")]
    InsufficientCredits(String),
    #[error("Requester {requester_id} is not a member of pair {pair_id}")]
    NotAPairMember { pair_id: PairId, requester_id: String },
    #[error("Request {request_id} cannot take this transition from {status}")]
    InvalidTransition { request_id: RequestId, status: RequestStatus },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for MatchingStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for MatchingStoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::DatabaseError(format!("Could not serialize date choices: {e}"))
    }
}
