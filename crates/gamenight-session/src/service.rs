//! The session service: the session state machine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gamenight_domain::validation::{
    check_capacity, check_date, check_game_id, check_player_id, check_session_id,
};
use gamenight_domain::{
    GameId, PlayerId, SessionDetails, SessionId, SessionQuery, SessionUpdate,
};
use gamenight_store::SessionStore;
use tokio::sync::OwnedMutexGuard;

use crate::SessionError;
use crate::locks::SessionLocks;

/// Validates session requests, enforces the session rules, and drives a
/// [`SessionStore`].
///
/// # Check ordering
///
/// Each operation checks its rules in a fixed order and stops at the
/// first one that fails, so the error for a given state and input is
/// always the same:
///
/// | operation | order                                                      |
/// |-----------|------------------------------------------------------------|
/// | `delete`  | exists → caller is host                                    |
/// | `add`     | exists → not expired → not full → not already a member     |
/// | `remove`  | exists → not expired → is a member → is not the host       |
/// | `update`  | exists → not expired → caller is host → capacity → date → game |
///
/// All checks happen before the single mutating storage call, and run
/// under the session's lock, so a refused request changes nothing and
/// concurrent requests cannot break capacity.
pub struct SessionService<S> {
    store: Arc<S>,
    locks: SessionLocks,
}

impl<S: SessionStore> SessionService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: SessionLocks::default(),
        }
    }

    /// Schedules a session. The host becomes its first member.
    ///
    /// The game id is only checked for shape, not looked up in the
    /// catalog.
    ///
    /// # Errors
    /// [`SessionError::Validation`] for a past date, or a non-positive
    /// game id, capacity, or host id (checked in that order).
    pub async fn create(
        &self,
        date: DateTime<Utc>,
        game_id: GameId,
        capacity: i64,
        host_id: PlayerId,
    ) -> Result<SessionId, SessionError> {
        check_date(date, Utc::now())?;
        check_game_id(game_id)?;
        check_capacity(capacity)?;
        check_player_id(host_id)?;

        let session_id = self
            .store
            .create_session(capacity, game_id, date, host_id)
            .await?;

        tracing::info!(%session_id, %game_id, %host_id, capacity, "session created");
        Ok(session_id)
    }

    /// Deletes a session. Only its host may do this, even once expired.
    pub async fn delete(
        &self,
        session_id: SessionId,
        caller_id: PlayerId,
    ) -> Result<(), SessionError> {
        check_session_id(session_id)?;
        let guard = self.locks.acquire(session_id).await;

        let guard = self.ensure_exists(session_id, guard).await?;
        if !self.store.is_session_host(session_id, caller_id).await? {
            tracing::debug!(%session_id, %caller_id, "delete refused, not host");
            return Err(SessionError::NotHost);
        }

        if !self.store.delete_session(session_id).await? {
            return Err(SessionError::NotFound);
        }
        self.locks.forget(session_id, guard).await;

        tracing::info!(%session_id, "session deleted");
        Ok(())
    }

    /// Adds a player to a session.
    ///
    /// # Errors
    /// In check order: [`SessionError::NotFound`], [`SessionError::Expired`],
    /// [`SessionError::Full`], [`SessionError::PlayerAlreadyInSession`].
    pub async fn add_player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> Result<(), SessionError> {
        check_session_id(session_id)?;
        check_player_id(player_id)?;
        let guard = self.locks.acquire(session_id).await;

        let _guard = self.ensure_exists(session_id, guard).await?;
        self.ensure_not_expired(session_id).await?;
        if self.store.is_session_full(session_id).await? {
            tracing::debug!(%session_id, %player_id, "join refused, session full");
            return Err(SessionError::Full);
        }
        if self.store.is_player_in_session(session_id, player_id).await? {
            return Err(SessionError::PlayerAlreadyInSession);
        }

        if !self.store.add_player_to_session(session_id, player_id).await? {
            return Err(SessionError::NotFound);
        }

        tracing::info!(%session_id, %player_id, "player joined session");
        Ok(())
    }

    /// Removes a non-host member from a session.
    ///
    /// # Errors
    /// In check order: [`SessionError::NotFound`], [`SessionError::Expired`],
    /// [`SessionError::PlayerNotInSession`], [`SessionError::HostCannotBeRemoved`].
    pub async fn remove_player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> Result<(), SessionError> {
        check_session_id(session_id)?;
        check_player_id(player_id)?;
        let guard = self.locks.acquire(session_id).await;

        let _guard = self.ensure_exists(session_id, guard).await?;
        self.ensure_not_expired(session_id).await?;
        if !self.store.is_player_in_session(session_id, player_id).await? {
            return Err(SessionError::PlayerNotInSession);
        }
        if self.store.is_session_host(session_id, player_id).await? {
            return Err(SessionError::HostCannotBeRemoved);
        }

        if !self
            .store
            .remove_player_from_session(session_id, player_id)
            .await?
        {
            return Err(SessionError::PlayerNotInSession);
        }

        tracing::info!(%session_id, %player_id, "player left session");
        Ok(())
    }

    /// Changes any of capacity, date, and game. Only the host may do this,
    /// and only before the session expires. Omitted fields are kept.
    ///
    /// # Errors
    /// In check order: [`SessionError::NotFound`], [`SessionError::Expired`],
    /// [`SessionError::NotHost`], then for the supplied fields: a
    /// non-positive capacity ([`SessionError::Validation`]), a capacity
    /// below the member count ([`SessionError::InvalidCapacity`]), a bad
    /// date, a bad game id.
    pub async fn update(
        &self,
        session_id: SessionId,
        caller_id: PlayerId,
        update: SessionUpdate,
    ) -> Result<(), SessionError> {
        check_session_id(session_id)?;
        let guard = self.locks.acquire(session_id).await;

        let _guard = self.ensure_exists(session_id, guard).await?;
        self.ensure_not_expired(session_id).await?;
        if !self.store.is_session_host(session_id, caller_id).await? {
            tracing::debug!(%session_id, %caller_id, "update refused, not host");
            return Err(SessionError::NotHost);
        }
        if let Some(capacity) = update.capacity {
            check_capacity(capacity)?;
            if !self.store.is_valid_capacity(session_id, capacity).await? {
                return Err(SessionError::InvalidCapacity);
            }
        }
        if let Some(date) = update.date {
            check_date(date, Utc::now())?;
        }
        if let Some(game_id) = update.game_id {
            check_game_id(game_id)?;
        }
        if update.is_empty() {
            return Ok(());
        }

        if !self.store.update_session(session_id, &update).await? {
            return Err(SessionError::NotFound);
        }

        tracing::info!(%session_id, ?update, "session updated");
        Ok(())
    }

    /// Full details of one session, with game and member names resolved.
    pub async fn info(&self, session_id: SessionId) -> Result<SessionDetails, SessionError> {
        check_session_id(session_id)?;
        self.store
            .get_session_details(session_id)
            .await?
            .ok_or(SessionError::NotFound)
    }

    /// Searches sessions by game, member, day, and open/full state.
    ///
    /// Every supplied filter is validated before storage is queried.
    /// Results are ordered by ascending session id.
    pub async fn search(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<SessionDetails>, SessionError> {
        let filters = query.filters()?;
        Ok(self.store.search_sessions(&filters, query.paging).await?)
    }

    // -- Checks shared by the mutating operations ---------------------------

    /// Hands the guard back if the session exists. Otherwise releases it
    /// through [`SessionLocks::forget`].
    async fn ensure_exists(
        &self,
        session_id: SessionId,
        guard: OwnedMutexGuard<()>,
    ) -> Result<OwnedMutexGuard<()>, SessionError> {
        if !self.store.session_exists(session_id).await? {
            self.locks.forget(session_id, guard).await;
            return Err(SessionError::NotFound);
        }
        Ok(guard)
    }

    async fn ensure_not_expired(&self, session_id: SessionId) -> Result<(), SessionError> {
        if self.store.is_session_expired(session_id, Utc::now()).await? {
            tracing::debug!(%session_id, "request refused, session expired");
            return Err(SessionError::Expired);
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
