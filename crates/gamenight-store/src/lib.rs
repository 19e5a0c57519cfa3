//! Storage layer for Gamenight.
//!
//! Three traits describe what the services need from persistence, one
//! per entity: [`PlayerStore`], [`GameStore`] and [`SessionStore`].
//! Storage knows nothing about business rules. It creates, reads,
//! searches and mutates exactly what it is asked to, and answers cheap
//! predicates (`is_session_full`, `is_session_host`, ...) so services
//! can decide.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local maps, always available. Nothing
//!   survives a restart.
//! - [`SqliteStore`] (feature `sqlite`, on by default): a SQLite
//!   database, either a file or `:memory:`.
//!
//! Both backends must produce identical observable results for the same
//! sequence of calls. [`Backend`] picks one of them once at startup and
//! forwards every call to it.
//!
//! # Why `impl Future` instead of `async fn` in the traits?
//!
//! Services run on a multi-threaded Tokio runtime, so every future they
//! await must be `Send`. Spelling the return type out as
//! `impl Future<Output = ...> + Send` puts that bound in the trait
//! itself; implementations can still be written as plain `async fn`.

use std::future::Future;

use chrono::{DateTime, Utc};
use gamenight_domain::{
    Game, GameFilters, GameId, Genre, Paging, Player, PlayerId, PlayerInfo,
    Session, SessionDetails, SessionFilters, SessionId, SessionUpdate,
};

mod backend;
mod error;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use backend::Backend;
pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Persistence for registered players.
pub trait PlayerStore: Send + Sync {
    /// Inserts a player and returns the assigned id.
    fn create_player(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        token_hash: &str,
    ) -> impl Future<Output = Result<PlayerId, StoreError>> + Send;

    fn get_player(
        &self,
        id: PlayerId,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send;

    /// Looks a player up by exact name.
    fn find_player_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send;

    fn player_name_exists(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn token_hash_exists(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn player_id_for_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = Result<Option<PlayerId>, StoreError>> + Send;

    /// Replaces (or with `None`, clears) a player's token digest.
    ///
    /// Returns `false` if the player does not exist.
    fn set_token_hash(
        &self,
        id: PlayerId,
        token_hash: Option<&str>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Players whose name contains `name` (case-insensitive), by id.
    fn search_players(
        &self,
        name: &str,
        paging: Paging,
    ) -> impl Future<Output = Result<Vec<PlayerInfo>, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// Persistence for the game catalog.
pub trait GameStore: Send + Sync {
    fn create_game(
        &self,
        name: &str,
        developer: &str,
        genres: &[Genre],
    ) -> impl Future<Output = Result<GameId, StoreError>> + Send;

    fn get_game(
        &self,
        id: GameId,
    ) -> impl Future<Output = Result<Option<Game>, StoreError>> + Send;

    /// Case-insensitive name lookup.
    fn game_name_exists(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Games matching every supplied filter, ordered by id.
    fn search_games(
        &self,
        filters: &GameFilters,
        paging: Paging,
    ) -> impl Future<Output = Result<Vec<Game>, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Persistence for scheduled sessions.
///
/// Predicates on a session that does not exist answer `false`, and
/// mutations on one return `false`.
pub trait SessionStore: Send + Sync {
    /// Inserts a session whose only member is `host_id`.
    ///
    /// `date` is stored at whole-second precision.
    fn create_session(
        &self,
        capacity: i64,
        game_id: GameId,
        date: DateTime<Utc>,
        host_id: PlayerId,
    ) -> impl Future<Output = Result<SessionId, StoreError>> + Send;

    fn get_session(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// The session with its game and member names resolved.
    fn get_session_details(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<Option<SessionDetails>, StoreError>> + Send;

    /// Sessions matching every supplied filter, ordered by id.
    fn search_sessions(
        &self,
        filters: &SessionFilters,
        paging: Paging,
    ) -> impl Future<Output = Result<Vec<SessionDetails>, StoreError>> + Send;

    fn delete_session(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Appends a member. Returns `false` if the session is missing or the
    /// player is already in it. Capacity is not checked here.
    fn add_player_to_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn remove_player_from_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Merges the supplied fields of `update` into the session.
    fn update_session(
        &self,
        id: SessionId,
        update: &SessionUpdate,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn session_exists(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn is_session_full(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn is_session_host(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn is_player_in_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// `true` if the session's date is strictly before `now`.
    fn is_session_expired(
        &self,
        id: SessionId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// `true` if `capacity` can hold the session's current members.
    fn is_valid_capacity(
        &self,
        id: SessionId,
        capacity: i64,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
