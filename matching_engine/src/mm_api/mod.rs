mod errors;
mod exchange_api;
mod intake_api;
mod negotiation_api;
mod proposal_api;
mod sweeper_api;

pub use errors::LifecycleError;
pub use exchange_api::ExchangeApi;
pub use intake_api::IntakeApi;
pub use negotiation_api::NegotiationApi;
pub use proposal_api::ProposalApi;
pub use sweeper_api::{SweepDeadlines, SweepResult, SweeperApi};
