//! Startup-time backend selection.
//!
//! The storage traits return `impl Future`, which makes them unusable as
//! `dyn` trait objects. Since there are exactly two backends, an enum
//! does the job: the application picks a variant once, wraps it in an
//! `Arc`, and hands clones to every service. Each trait method is a
//! single `match` that forwards to the chosen store.

use chrono::{DateTime, Utc};
use gamenight_domain::{
    Game, GameFilters, GameId, Genre, Paging, Player, PlayerId, PlayerInfo,
    Session, SessionDetails, SessionFilters, SessionId, SessionUpdate,
};

use crate::{GameStore, MemoryStore, PlayerStore, SessionStore, StoreError};
#[cfg(feature = "sqlite")]
use crate::SqliteStore;

/// One of the two storage backends, chosen at startup.
pub enum Backend {
    Memory(MemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
}

impl Backend {
    /// A fresh, empty in-memory backend.
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Human-readable backend name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl From<MemoryStore> for Backend {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

#[cfg(feature = "sqlite")]
impl From<SqliteStore> for Backend {
    fn from(store: SqliteStore) -> Self {
        Self::Sqlite(store)
    }
}

/// Forwards `$call` to whichever store `$self` holds, bound as `$store`.
macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Backend::Memory($store) => $call,
            #[cfg(feature = "sqlite")]
            Backend::Sqlite($store) => $call,
        }
    };
}

impl PlayerStore for Backend {
    async fn create_player(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        token_hash: &str,
    ) -> Result<PlayerId, StoreError> {
        dispatch!(self, s => s.create_player(name, email, password_hash, token_hash).await)
    }

    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        dispatch!(self, s => s.get_player(id).await)
    }

    async fn find_player_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Player>, StoreError> {
        dispatch!(self, s => s.find_player_by_name(name).await)
    }

    async fn player_name_exists(&self, name: &str) -> Result<bool, StoreError> {
        dispatch!(self, s => s.player_name_exists(name).await)
    }

    async fn token_hash_exists(&self, token_hash: &str) -> Result<bool, StoreError> {
        dispatch!(self, s => s.token_hash_exists(token_hash).await)
    }

    async fn player_id_for_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PlayerId>, StoreError> {
        dispatch!(self, s => s.player_id_for_token_hash(token_hash).await)
    }

    async fn set_token_hash(
        &self,
        id: PlayerId,
        token_hash: Option<&str>,
    ) -> Result<bool, StoreError> {
        dispatch!(self, s => s.set_token_hash(id, token_hash).await)
    }

    async fn search_players(
        &self,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<PlayerInfo>, StoreError> {
        dispatch!(self, s => s.search_players(name, paging).await)
    }
}

impl GameStore for Backend {
    async fn create_game(
        &self,
        name: &str,
        developer: &str,
        genres: &[Genre],
    ) -> Result<GameId, StoreError> {
        dispatch!(self, s => s.create_game(name, developer, genres).await)
    }

    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        dispatch!(self, s => s.get_game(id).await)
    }

    async fn game_name_exists(&self, name: &str) -> Result<bool, StoreError> {
        dispatch!(self, s => s.game_name_exists(name).await)
    }

    async fn search_games(
        &self,
        filters: &GameFilters,
        paging: Paging,
    ) -> Result<Vec<Game>, StoreError> {
        dispatch!(self, s => s.search_games(filters, paging).await)
    }
}

impl SessionStore for Backend {
    async fn create_session(
        &self,
        capacity: i64,
        game_id: GameId,
        date: DateTime<Utc>,
        host_id: PlayerId,
    ) -> Result<SessionId, StoreError> {
        dispatch!(self, s => s.create_session(capacity, game_id, date, host_id).await)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        dispatch!(self, s => s.get_session(id).await)
    }

    async fn get_session_details(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionDetails>, StoreError> {
        dispatch!(self, s => s.get_session_details(id).await)
    }

    async fn search_sessions(
        &self,
        filters: &SessionFilters,
        paging: Paging,
    ) -> Result<Vec<SessionDetails>, StoreError> {
        dispatch!(self, s => s.search_sessions(filters, paging).await)
    }

    async fn delete_session(&self, id: SessionId) -> Result<bool, StoreError> {
        dispatch!(self, s => s.delete_session(id).await)
    }

    async fn add_player_to_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        dispatch!(self, s => s.add_player_to_session(id, player_id).await)
    }

    async fn remove_player_from_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        dispatch!(self, s => s.remove_player_from_session(id, player_id).await)
    }

    async fn update_session(
        &self,
        id: SessionId,
        update: &SessionUpdate,
    ) -> Result<bool, StoreError> {
        dispatch!(self, s => s.update_session(id, update).await)
    }

    async fn session_exists(&self, id: SessionId) -> Result<bool, StoreError> {
        dispatch!(self, s => s.session_exists(id).await)
    }

    async fn is_session_full(&self, id: SessionId) -> Result<bool, StoreError> {
        dispatch!(self, s => s.is_session_full(id).await)
    }

    async fn is_session_host(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        dispatch!(self, s => s.is_session_host(id, player_id).await)
    }

    async fn is_player_in_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        dispatch!(self, s => s.is_player_in_session(id, player_id).await)
    }

    async fn is_session_expired(
        &self,
        id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        dispatch!(self, s => s.is_session_expired(id, now).await)
    }

    async fn is_valid_capacity(
        &self,
        id: SessionId,
        capacity: i64,
    ) -> Result<bool, StoreError> {
        dispatch!(self, s => s.is_valid_capacity(id, capacity).await)
    }
}
