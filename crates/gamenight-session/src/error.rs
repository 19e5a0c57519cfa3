//! Error types for the session layer.

use gamenight_domain::ValidationError;
use gamenight_store::StoreError;

/// Every way a session operation can be refused.
///
/// Operations check their rules in a fixed order, so for a given stored
/// state and input exactly one of these is reported.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An id, capacity, date, or search filter was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("session not found")]
    NotFound,

    /// The session's date has passed; it can be read or deleted but no
    /// longer changed.
    #[error("session has expired")]
    Expired,

    #[error("session is full")]
    Full,

    #[error("player is already in the session")]
    PlayerAlreadyInSession,

    #[error("player is not in the session")]
    PlayerNotInSession,

    #[error("the session host cannot be removed")]
    HostCannotBeRemoved,

    /// The caller tried a host-only operation on someone else's session.
    #[error("player is not the session host")]
    NotHost,

    /// The new capacity would be below the current number of members.
    #[error("session capacity cannot be lower than the number of players in it")]
    InvalidCapacity,

    #[error(transparent)]
    Store(#[from] StoreError),
}
