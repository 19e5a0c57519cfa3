//! Error types for the player layer.

use gamenight_domain::ValidationError;
use gamenight_store::StoreError;

/// Errors that can occur while registering, authenticating, or looking
/// up players.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// The name, email, password, or id failed a format rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another player already registered this exact name.
    #[error("player already exists")]
    AlreadyExists,

    /// No player matches the given id or token.
    #[error("player not found")]
    NotFound,

    /// Login failed. Deliberately does not say whether the name or the
    /// password was wrong.
    #[error("invalid name or password")]
    InvalidCredentials,

    /// The token does not belong to any logged-in player.
    #[error("player not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Store(#[from] StoreError),
}
