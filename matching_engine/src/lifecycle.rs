//! The central transition table for the request lifecycle.
//!
//! Every status change a [`MatchingRequest`](crate::db_types::MatchingRequest) can undergo is
//! listed here as (current state, event) → next state. The storage layer only ever writes
//! transitions this table admits, which keeps the state machine testable in one place instead of
//! being scattered across handlers as string literals.
use crate::db_types::RequestStatus;

/// Everything that can happen to a matching request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A proposal naming this requester was accepted.
    Paired,
    /// The proposal that paired this request was refused; the requester is free again.
    ProposalRefused,
    /// This side submitted (or re-submitted) schedule choices.
    ChoicesSubmitted,
    /// Both sides' choices overlap; a date and location were agreed.
    ScheduleAgreed,
    /// The submitted choices found no common ground.
    ScheduleMismatched,
    /// The pair sat in matched state beyond the response deadline.
    ResponseTimedOut,
    /// The pair confirmed a date but no meeting happened before the completion deadline.
    MeetingTimedOut,
    /// Both sides voted to meet again after the date.
    BothInterested,
    /// Both sides' reviews carried contact details.
    ContactsExchanged,
    /// The retention sweeper reclaimed this terminal record.
    Cleaned,
}

/// Returns the state a request moves to when `event` occurs in `current`, or `None` when the
/// event is not admissible from that state.
pub fn next_status(current: RequestStatus, event: LifecycleEvent) -> Option<RequestStatus> {
    use LifecycleEvent::*;
    use RequestStatus::*;
    match (current, event) {
        (Waiting, Paired) => Some(Matched),
        // A repeat introduction re-pairs two requests that already share a pair, wherever they
        // were in the negotiation.
        (Matched | Mismatched, Paired) => Some(Matched),
        // Refusal leaves the proposer free for another proposal. A request that was paired by a
        // now-refused introduction drops back to Waiting too.
        (Waiting | Matched | Mismatched, ProposalRefused) => Some(Waiting),
        // A mismatched side re-enters negotiation as a fresh matched attempt.
        (Matched | Mismatched, ChoicesSubmitted) => Some(Matched),
        (Matched, ScheduleAgreed) => Some(Confirmed),
        (Matched, ScheduleMismatched) => Some(Mismatched),
        // While the pair is matched, either side may individually be Matched or Mismatched.
        (Matched | Mismatched, ResponseTimedOut) => Some(Failed),
        (Confirmed, MeetingTimedOut) => Some(Failed),
        (Confirmed, BothInterested) => Some(Finished),
        // The review-with-contact path runs in parallel with the meet-again vote, so the
        // exchange can complete from either state.
        (Confirmed | Finished, ContactsExchanged) => Some(Exchanged),
        (Finished, LifecycleEvent::Cleaned) => Some(RequestStatus::Cleaned),
        _ => None,
    }
}
