//! Validation error type.
//!
//! Each crate in Gamenight defines its own error enum. This one covers
//! malformed input only: when you see a `ValidationError`, the caller
//! sent something that could never be accepted, regardless of what is
//! stored.

use crate::validation::{
    MAX_DEVELOPER_NAME_LENGTH, MAX_GAME_NAME_LENGTH, MAX_PASSWORD_LENGTH,
    MAX_PLAYER_NAME_LENGTH, MIN_PASSWORD_LENGTH,
};

/// A single violated input rule.
///
/// The `#[error("...")]` messages are meant to be shown to end users as
/// is, so they describe the rule rather than the offending value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("player id must be a positive number")]
    InvalidPlayerId,

    #[error("game id must be a positive number")]
    InvalidGameId,

    #[error("session id must be a positive number")]
    InvalidSessionId,

    /// Capacity is not positive, or (on update) below the current
    /// number of players in the session.
    #[error(
        "session capacity must be a positive number and greater or equal \
         than players in session"
    )]
    InvalidCapacity,

    #[error(
        "name must have at most {max} characters and no spaces",
        max = MAX_PLAYER_NAME_LENGTH
    )]
    InvalidPlayerName,

    #[error("invalid email format")]
    InvalidEmail,

    #[error(
        "password must have between {min} and {max} characters and contain \
         a lower case letter, an upper case letter and a digit",
        min = MIN_PASSWORD_LENGTH,
        max = MAX_PASSWORD_LENGTH
    )]
    InvalidPassword,

    #[error("invalid game name format")]
    InvalidGameName,

    #[error("name must have at most {max} characters", max = MAX_GAME_NAME_LENGTH)]
    InvalidGameNameLength,

    #[error("invalid developer name format")]
    InvalidDeveloperName,

    #[error(
        "developer name must have at most {max} characters",
        max = MAX_DEVELOPER_NAME_LENGTH
    )]
    InvalidDeveloperNameLength,

    /// The genre tag is unknown, or a game was given no genres at all.
    #[error("invalid genre: {0:?}")]
    InvalidGenre(String),

    #[error("invalid date")]
    InvalidDate,

    #[error("state must either be 'open' or 'close'")]
    InvalidState,
}
