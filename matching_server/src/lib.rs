//! # Matching server
//! This module hosts the HTTP surface for the matching engine. It is responsible for:
//! Accepting intake, proposal, negotiation and exchange requests from clients.
//! Exposing the operator endpoints (pending proposals, stuck pairs, deposits, forced sweeps).
//! Running the background sweep worker that enforces the lifecycle deadlines.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: The matching lifecycle endpoints.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
pub mod sweep_worker;

#[cfg(test)]
mod endpoint_tests;
