//! Matching Engine
//!
//! The matching engine orchestrates the full lifecycle of a curated introduction: a requester
//! opens a matching request (spending credits), an operator-driven proposal pairs two requests,
//! the two sides negotiate a meeting date and location, and a mutual-interest gate decides
//! whether contact details are exchanged at the end. This library contains the core logic and is
//! transport-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You
//!    should never need to access the database directly. Instead, use the public API provided by
//!    the engine. The exception is the data types used in the database, which are defined in the
//!    [`mod@db_types`] module and are public.
//! 2. The engine public API ([`mod@mm_api`]). This provides the public-facing functionality:
//!    intake, proposals, schedule negotiation, the contact exchange gate, and the timeout
//!    sweeper. Backends need to implement the traits in [`mod@traits`] in order to act as a
//!    store for the matching server.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted
//! when certain transitions occur, e.g. when a pair confirms a meeting, a `PairConfirmedEvent`
//! is emitted. A simple actor framework is used so that you can hook into these events and
//! perform custom actions.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod lifecycle;
mod mm_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use mm_api::{
    ExchangeApi,
    IntakeApi,
    LifecycleError,
    NegotiationApi,
    ProposalApi,
    SweepDeadlines,
    SweepResult,
    SweeperApi,
};
