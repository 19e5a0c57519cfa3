//! In-memory backend.
//!
//! One `RwLock<BTreeMap>` per entity type. `BTreeMap` keeps entries in
//! id order, and ids are handed out in creation order, so iterating a
//! map yields exactly the ordering the SQLite backend gets from
//! `ORDER BY id`.
//!
//! When a method needs more than one map it locks them in the order
//! sessions, games, players.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SubsecRound, Utc};
use gamenight_domain::{
    Game, GameFilters, GameId, GameIdentification, Genre, Paging, Player,
    PlayerId, PlayerInfo, Session, SessionDetails, SessionFilters, SessionId,
    SessionPlayer, SessionUpdate,
};
use tokio::sync::RwLock;

use crate::{GameStore, PlayerStore, SessionStore, StoreError};

/// Process-local storage. Nothing survives a restart.
pub struct MemoryStore {
    players: RwLock<BTreeMap<PlayerId, Player>>,
    games: RwLock<BTreeMap<GameId, Game>>,
    sessions: RwLock<BTreeMap<SessionId, Session>>,

    // Ids are never reused, even after a delete.
    next_player_id: AtomicI64,
    next_game_id: AtomicI64,
    next_session_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(BTreeMap::new()),
            games: RwLock::new(BTreeMap::new()),
            sessions: RwLock::new(BTreeMap::new()),
            next_player_id: AtomicI64::new(1),
            next_game_id: AtomicI64::new(1),
            next_session_id: AtomicI64::new(1),
        }
    }

    /// Resolves a session's game and member names.
    ///
    /// Unknown ids resolve to an empty name.
    fn details(
        session: &Session,
        games: &BTreeMap<GameId, Game>,
        players: &BTreeMap<PlayerId, Player>,
    ) -> SessionDetails {
        let game_name = games
            .get(&session.game_id)
            .map(|g| g.name.clone())
            .unwrap_or_default();
        let members = session
            .players
            .iter()
            .map(|id| SessionPlayer {
                id: *id,
                name: players.get(id).map(|p| p.name.clone()).unwrap_or_default(),
            })
            .collect();

        SessionDetails {
            id: session.id,
            capacity: session.capacity,
            date: session.date,
            game: GameIdentification {
                id: session.game_id,
                name: game_name,
            },
            players: members,
            host_id: session.host_id,
        }
    }

    /// Runs `check` against a session, answering `false` when it is missing.
    async fn check_session(
        &self,
        id: SessionId,
        check: impl FnOnce(&Session) -> bool,
    ) -> bool {
        self.sessions.read().await.get(&id).is_some_and(check)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// PlayerStore
// ---------------------------------------------------------------------------

impl PlayerStore for MemoryStore {
    async fn create_player(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        token_hash: &str,
    ) -> Result<PlayerId, StoreError> {
        let id = PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed));
        let player = Player {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            token_hash: Some(token_hash.to_string()),
        };
        self.players.write().await.insert(id, player);
        Ok(id)
    }

    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(self.players.read().await.get(&id).cloned())
    }

    async fn find_player_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Player>, StoreError> {
        let players = self.players.read().await;
        Ok(players.values().find(|p| p.name == name).cloned())
    }

    async fn player_name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let players = self.players.read().await;
        Ok(players.values().any(|p| p.name == name))
    }

    async fn token_hash_exists(&self, token_hash: &str) -> Result<bool, StoreError> {
        Ok(self.player_id_for_token_hash(token_hash).await?.is_some())
    }

    async fn player_id_for_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PlayerId>, StoreError> {
        let players = self.players.read().await;
        Ok(players
            .values()
            .find(|p| p.token_hash.as_deref() == Some(token_hash))
            .map(|p| p.id))
    }

    async fn set_token_hash(
        &self,
        id: PlayerId,
        token_hash: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut players = self.players.write().await;
        let Some(player) = players.get_mut(&id) else {
            return Ok(false);
        };
        player.token_hash = token_hash.map(str::to_string);
        Ok(true)
    }

    async fn search_players(
        &self,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<PlayerInfo>, StoreError> {
        let needle = name.to_ascii_lowercase();
        let players = self.players.read().await;
        let matching = players
            .values()
            .filter(|p| p.name.to_ascii_lowercase().contains(&needle))
            .map(Player::info);
        Ok(paging.apply(matching))
    }
}

// ---------------------------------------------------------------------------
// GameStore
// ---------------------------------------------------------------------------

impl GameStore for MemoryStore {
    async fn create_game(
        &self,
        name: &str,
        developer: &str,
        genres: &[Genre],
    ) -> Result<GameId, StoreError> {
        let id = GameId(self.next_game_id.fetch_add(1, Ordering::Relaxed));
        let game = Game {
            id,
            name: name.to_string(),
            developer: developer.to_string(),
            genres: genres.to_vec(),
        };
        self.games.write().await.insert(id, game);
        Ok(id)
    }

    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        Ok(self.games.read().await.get(&id).cloned())
    }

    async fn game_name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let games = self.games.read().await;
        Ok(games.values().any(|g| g.name.eq_ignore_ascii_case(name)))
    }

    async fn search_games(
        &self,
        filters: &GameFilters,
        paging: Paging,
    ) -> Result<Vec<Game>, StoreError> {
        let games = self.games.read().await;
        let matching = games.values().filter(|g| filters.matches(g)).cloned();
        Ok(paging.apply(matching))
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

impl SessionStore for MemoryStore {
    async fn create_session(
        &self,
        capacity: i64,
        game_id: GameId,
        date: DateTime<Utc>,
        host_id: PlayerId,
    ) -> Result<SessionId, StoreError> {
        let id = SessionId(self.next_session_id.fetch_add(1, Ordering::Relaxed));
        let session = Session {
            id,
            capacity,
            date: date.trunc_subsecs(0),
            game_id,
            players: vec![host_id],
            host_id,
        };
        self.sessions.write().await.insert(id, session);
        Ok(id)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn get_session_details(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionDetails>, StoreError> {
        let sessions = self.sessions.read().await;
        let Some(session) = sessions.get(&id) else {
            return Ok(None);
        };
        let games = self.games.read().await;
        let players = self.players.read().await;
        Ok(Some(Self::details(session, &games, &players)))
    }

    async fn search_sessions(
        &self,
        filters: &SessionFilters,
        paging: Paging,
    ) -> Result<Vec<SessionDetails>, StoreError> {
        let sessions = self.sessions.read().await;
        let games = self.games.read().await;
        let players = self.players.read().await;
        let matching = sessions
            .values()
            .filter(|s| filters.matches(s))
            .map(|s| Self::details(s, &games, &players));
        Ok(paging.apply(matching))
    }

    async fn delete_session(&self, id: SessionId) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn add_player_to_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if !session.has_player(player_id) => {
                session.players.push(player_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_player_from_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            return Ok(false);
        };
        let before = session.players.len();
        session.players.retain(|p| *p != player_id);
        Ok(session.players.len() < before)
    }

    async fn update_session(
        &self,
        id: SessionId,
        update: &SessionUpdate,
    ) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            return Ok(false);
        };
        update.apply_to(session);
        session.date = session.date.trunc_subsecs(0);
        Ok(true)
    }

    async fn session_exists(&self, id: SessionId) -> Result<bool, StoreError> {
        Ok(self.check_session(id, |_| true).await)
    }

    async fn is_session_full(&self, id: SessionId) -> Result<bool, StoreError> {
        Ok(self.check_session(id, Session::is_full).await)
    }

    async fn is_session_host(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        Ok(self.check_session(id, |s| s.is_host(player_id)).await)
    }

    async fn is_player_in_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        Ok(self.check_session(id, |s| s.has_player(player_id)).await)
    }

    async fn is_session_expired(
        &self,
        id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(self.check_session(id, |s| s.is_expired(now)).await)
    }

    async fn is_valid_capacity(
        &self,
        id: SessionId,
        capacity: i64,
    ) -> Result<bool, StoreError> {
        Ok(self.check_session(id, |s| s.fits_capacity(capacity)).await)
    }
}
