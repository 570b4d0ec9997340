//! Storage contracts for the matching engine.
//!
//! Backends implement two traits:
//! * [`MatchingGatewayDatabase`] — the transactional orchestration contract. Every mutating
//!   operation of the lifecycle (intake, proposal resolution, schedule negotiation, contact
//!   exchange, the sweeps) is a single method that the backend must execute atomically, with
//!   every at-most-once transition expressed as a guarded update rather than a read-then-write.
//! * [`RequestManagement`] — read-only queries over requests, pairs, proposals and the credits
//!   ledger.
mod data_objects;
mod errors;
mod matching_gateway_database;
mod request_management;

pub use data_objects::{ExchangeOutcome, ProposalResolution, SubmissionOutcome, TimedOutPair};
pub use errors::MatchingStoreError;
pub use matching_gateway_database::MatchingGatewayDatabase;
pub use request_management::RequestManagement;
