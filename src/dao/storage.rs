use std::error::Error;
use thiserror::Error;

use crate::dao::models::GameId;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or rejected the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A conditional write found a different revision than the one it was based on.
    #[error("game `{id}` changed since revision {expected}")]
    RevisionConflict { id: GameId, expected: u64 },
    /// The write would give game `id` an email another game already uses.
    #[error("another game already uses the email of game `{id}`")]
    EmailTaken { id: GameId },
    /// A conditional write targeted a game that no longer exists.
    #[error("game `{id}` does not exist")]
    Missing { id: GameId },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
