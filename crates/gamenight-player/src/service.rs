//! The player service: registration, login, and lookups.

use std::sync::Arc;

use gamenight_domain::validation::{
    check_email, check_password, check_player_id, check_player_name,
};
use gamenight_domain::{Credentials, Paging, PlayerHome, PlayerId, PlayerInfo};
use gamenight_store::PlayerStore;
use tokio::sync::Mutex;

use crate::credentials::{generate_token, hash_password, hash_token, verify_password};
use crate::{Authenticator, PlayerError};

/// Validates player input and drives a [`PlayerStore`].
///
/// Every operation validates first and then makes at most one mutating
/// storage call, so a rejected request never changes anything.
///
/// ## Lifecycle of a token
///
/// ```text
/// create() ──→ [logged in: T1] ──login()──→ [logged in: T2] ──logout()──→ [logged out]
///                                  ▲                                         │
///                                  └──────────────── login() ────────────────┘
/// ```
pub struct PlayerService<S> {
    store: Arc<S>,

    /// Serializes "is this name taken?" + insert so two registrations
    /// racing for one name cannot both succeed.
    registration: Mutex<()>,
}

impl<S: PlayerStore> PlayerService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            registration: Mutex::new(()),
        }
    }

    /// Registers a new player and logs them in.
    ///
    /// # Errors
    /// - [`PlayerError::Validation`]: bad name, email, or password
    /// - [`PlayerError::AlreadyExists`]: the name is taken
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Credentials, PlayerError> {
        check_player_name(name)?;
        check_email(email)?;
        check_password(password)?;

        let _gate = self.registration.lock().await;
        if self.store.player_name_exists(name).await? {
            tracing::debug!(player_name = name, "registration rejected, name taken");
            return Err(PlayerError::AlreadyExists);
        }

        let token = generate_token();
        let player_id = self
            .store
            .create_player(name, email, &hash_password(password), &hash_token(&token))
            .await?;

        tracing::info!(%player_id, player_name = name, "player registered");
        Ok(Credentials { token, player_id })
    }

    /// Checks a name and password and mints a fresh token, invalidating
    /// the previous one.
    ///
    /// # Errors
    /// - [`PlayerError::Validation`]: the name or password could never
    ///   have been registered
    /// - [`PlayerError::InvalidCredentials`]: unknown name or wrong
    ///   password
    pub async fn login(
        &self,
        name: &str,
        password: &str,
    ) -> Result<Credentials, PlayerError> {
        check_player_name(name)?;
        check_password(password)?;

        let player = match self.store.find_player_by_name(name).await? {
            Some(player) if verify_password(password, &player.password_hash) => player,
            _ => {
                tracing::debug!(player_name = name, "login rejected");
                return Err(PlayerError::InvalidCredentials);
            }
        };

        let token = generate_token();
        if !self
            .store
            .set_token_hash(player.id, Some(&hash_token(&token)))
            .await?
        {
            return Err(PlayerError::NotFound);
        }

        tracing::info!(player_id = %player.id, "player logged in");
        Ok(Credentials {
            token,
            player_id: player.id,
        })
    }

    /// Clears the player's token. Their old token stops resolving.
    ///
    /// # Errors
    /// [`PlayerError::NotFound`] if no player has this id.
    pub async fn logout(&self, player_id: PlayerId) -> Result<(), PlayerError> {
        check_player_id(player_id)?;
        if !self.store.set_token_hash(player_id, None).await? {
            return Err(PlayerError::NotFound);
        }
        tracing::info!(%player_id, "player logged out");
        Ok(())
    }

    /// Public information about a player.
    pub async fn info(&self, player_id: PlayerId) -> Result<PlayerInfo, PlayerError> {
        check_player_id(player_id)?;
        self.store
            .get_player(player_id)
            .await?
            .map(|p| p.info())
            .ok_or(PlayerError::NotFound)
    }

    /// The summary a logged-in player sees about themselves.
    ///
    /// # Errors
    /// [`PlayerError::NotFound`] if the token is not held by anyone.
    pub async fn home(&self, token: &str) -> Result<PlayerHome, PlayerError> {
        let player_id = self
            .player_id_for_token(token)
            .await?
            .ok_or(PlayerError::NotFound)?;
        let player = self
            .store
            .get_player(player_id)
            .await?
            .ok_or(PlayerError::NotFound)?;
        Ok(PlayerHome {
            id: player.id,
            name: player.name,
        })
    }

    /// Players whose name contains `name`, case-insensitively.
    ///
    /// `name` must itself be a valid player name.
    pub async fn search_by_name(
        &self,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<PlayerInfo>, PlayerError> {
        check_player_name(name)?;
        Ok(self.store.search_players(name, paging).await?)
    }

    pub async fn token_exists(&self, token: &str) -> Result<bool, PlayerError> {
        Ok(self.store.token_hash_exists(&hash_token(token)).await?)
    }

    pub async fn player_id_for_token(
        &self,
        token: &str,
    ) -> Result<Option<PlayerId>, PlayerError> {
        Ok(self.store.player_id_for_token_hash(&hash_token(token)).await?)
    }
}

impl<S: PlayerStore + 'static> Authenticator for PlayerService<S> {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, PlayerError> {
        if !self.token_exists(token).await? {
            return Err(PlayerError::NotLoggedIn);
        }
        self.player_id_for_token(token)
            .await?
            .ok_or(PlayerError::NotLoggedIn)
    }
}

// =========================================================================
// Tests
// =========================================================================
