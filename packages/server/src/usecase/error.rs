use thiserror::Error;

use crate::domain::RepositoryError;

/// Errors of the room coordinator handle.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Room coordinator is not running")]
    Stopped,
}

/// Errors of the room listing use case.
#[derive(Debug, Error)]
pub enum GetRoomsError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
