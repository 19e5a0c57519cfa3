//! Unified error type for Gamenight.

use gamenight_domain::ValidationError;
use gamenight_game::GameError;
use gamenight_player::PlayerError;
use gamenight_session::SessionError;
use gamenight_store::StoreError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant lets `?` lift a service error
/// into this type. Call [`GamenightError::kind`] to learn how a caller
/// outside the process should see the failure.
#[derive(Debug, thiserror::Error)]
pub enum GamenightError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The environment named a storage backend we do not have.
    #[error("configuration error: {0}")]
    Config(String),
}

/// The outward class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    /// Reported with the same status as [`ErrorKind::Validation`].
    Conflict,
    Forbidden,
    Unauthenticated,
    Internal,
}

impl ErrorKind {
    /// The HTTP-style status this kind is reported with.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation | ErrorKind::Conflict => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::Unauthenticated => 401,
            ErrorKind::Internal => 500,
        }
    }
}

impl GamenightError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GamenightError::Validation(_) => ErrorKind::Validation,
            GamenightError::Player(err) => player_kind(err),
            GamenightError::Game(err) => game_kind(err),
            GamenightError::Session(err) => session_kind(err),
            GamenightError::Store(_) | GamenightError::Config(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> u16 {
        self.kind().status()
    }
}

fn player_kind(err: &PlayerError) -> ErrorKind {
    match err {
        PlayerError::Validation(_) => ErrorKind::Validation,
        PlayerError::AlreadyExists => ErrorKind::Conflict,
        // A failed login looks like a missing player from outside.
        PlayerError::NotFound | PlayerError::InvalidCredentials => ErrorKind::NotFound,
        PlayerError::NotLoggedIn => ErrorKind::Unauthenticated,
        PlayerError::Store(_) => ErrorKind::Internal,
    }
}

fn game_kind(err: &GameError) -> ErrorKind {
    match err {
        GameError::Validation(_) => ErrorKind::Validation,
        GameError::AlreadyExists => ErrorKind::Conflict,
        GameError::NotFound => ErrorKind::NotFound,
        GameError::Store(_) => ErrorKind::Internal,
    }
}

fn session_kind(err: &SessionError) -> ErrorKind {
    match err {
        SessionError::Validation(_)
        | SessionError::Expired
        | SessionError::PlayerNotInSession
        | SessionError::HostCannotBeRemoved
        | SessionError::InvalidCapacity => ErrorKind::Validation,
        SessionError::NotFound => ErrorKind::NotFound,
        SessionError::Full | SessionError::PlayerAlreadyInSession => ErrorKind::Conflict,
        SessionError::NotHost => ErrorKind::Forbidden,
        SessionError::Store(_) => ErrorKind::Internal,
    }
}
