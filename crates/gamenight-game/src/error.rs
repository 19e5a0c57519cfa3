use gamenight_domain::ValidationError;
use gamenight_store::StoreError;

/// Errors raised by [`GameService`](crate::GameService).
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A game with the same name (ignoring case) is already cataloged.
    #[error("game already exists")]
    AlreadyExists,

    #[error("game not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}
