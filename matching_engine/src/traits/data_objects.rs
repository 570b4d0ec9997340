use crate::{
    db_types::{MatchingRequest, MatchPair, Proposal},
    helpers::ScheduleMatch,
};

/// The result of running one schedule submission through the negotiator.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// Choices stored; the partner has not submitted yet.
    WaitingForPartner(MatchingRequest),
    /// Both sides overlap; the pair is confirmed.
    Confirmed { request: MatchingRequest, partner: MatchingRequest, schedule: ScheduleMatch },
    /// No common ground; the submitter should try different choices.
    Mismatched(MatchingRequest),
}

impl SubmissionOutcome {
    pub fn request(&self) -> &MatchingRequest {
        match self {
            SubmissionOutcome::WaitingForPartner(r) => r,
            SubmissionOutcome::Confirmed { request, .. } => request,
            SubmissionOutcome::Mismatched(r) => r,
        }
    }
}

/// Everything an accepted or refused proposal touched, so callers can notify the right parties.
#[derive(Debug, Clone)]
pub struct ProposalResolution {
    pub proposal: Proposal,
    pub pair: Option<MatchPair>,
    pub proposer_request: Option<MatchingRequest>,
    pub target_request: Option<MatchingRequest>,
}

/// A pair force-failed by a timeout sweep, with the requests it failed and the requester ids
/// that received a refund in this pass. Only the response timeout refunds; the completion
/// timeout always leaves the refund list empty.
#[derive(Debug, Clone)]
pub struct TimedOutPair {
    pub pair: MatchPair,
    pub failed_requests: Vec<MatchingRequest>,
    pub refunded_requesters: Vec<String>,
}

/// The pair state after a meet-again vote or a review submission.
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub pair: MatchPair,
    /// True when this submission completed the gate (both votes true, or both contacts present).
    pub finalized: bool,
}
