use crate::db_types::{MatchingRequest, MatchPair, RequestStatus};

/// Fired when two requests have been linked into a live pair following an accepted proposal.
#[derive(Debug, Clone)]
pub struct RequestMatchedEvent {
    pub pair: MatchPair,
    pub proposer_request: Option<MatchingRequest>,
    pub target_request: Option<MatchingRequest>,
}

impl RequestMatchedEvent {
    pub fn new(
        pair: MatchPair,
        proposer_request: Option<MatchingRequest>,
        target_request: Option<MatchingRequest>,
    ) -> Self {
        Self { pair, proposer_request, target_request }
    }
}

/// Fired when both sides of a pair have agreed on a date and location.
#[derive(Debug, Clone)]
pub struct PairConfirmedEvent {
    pub pair_request: MatchingRequest,
}

impl PairConfirmedEvent {
    pub fn new(pair_request: MatchingRequest) -> Self {
        Self { pair_request }
    }
}

/// Fired when a request is force-failed, typically by a timeout sweep.
#[derive(Debug, Clone)]
pub struct RequestFailedEvent {
    pub request: MatchingRequest,
    pub status: RequestStatus,
}

impl RequestFailedEvent {
    pub fn new(request: MatchingRequest) -> Self {
        let status = request.status;
        Self { request, status }
    }
}

#[derive(Debug, Clone)]
pub enum EventType {
    RequestMatched(RequestMatchedEvent),
    PairConfirmed(PairConfirmedEvent),
    RequestFailed(RequestFailedEvent),
}
