use thiserror::Error;

use crate::traits::MatchingStoreError;

/// Errors surfaced by the lifecycle APIs. Validation failures are caught here, before the store
/// is touched; everything else is a [`MatchingStoreError`] passed through.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("A requester cannot propose an introduction to themselves")]
    SelfProposal,
    #[error("Schedule choices must include at least one date and one location")]
    EmptyChoices,
    #[error("The contact payload may not be empty")]
    EmptyContact,
    #[error(transparent)]
    StoreError(#[from] MatchingStoreError),
}
