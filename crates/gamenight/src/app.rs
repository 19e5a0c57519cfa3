//! The application container and its builder.
//!
//! ## How it fits in the stack
//!
//! ```text
//!                 Gamenight
//!      ┌──────────────┼──────────────┐
//!      ▼              ▼              ▼
//! PlayerService   GameService   SessionService
//!      └──────────────┼──────────────┘
//!                     ▼
//!             Arc<Backend>  (memory | sqlite, chosen once)
//! ```

use std::sync::Arc;

use gamenight_domain::PlayerId;
use gamenight_game::GameService;
use gamenight_player::{Authenticator, PlayerError, PlayerService, bearer_token};
use gamenight_session::SessionService;
use gamenight_store::Backend;

use crate::{GamenightConfig, GamenightError, StorageConfig};

/// All three services over one shared storage backend.
pub struct Gamenight {
    pub players: PlayerService<Backend>,
    pub games: GameService<Backend>,
    pub sessions: SessionService<Backend>,
    backend: &'static str,
}

impl Gamenight {
    /// Creates a builder with the default (in-memory) configuration.
    pub fn builder() -> GamenightBuilder {
        GamenightBuilder::new()
    }

    /// Name of the backend this instance was built on.
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    /// Resolves an `Authorization` header value to the calling player.
    ///
    /// # Errors
    /// [`PlayerError::NotLoggedIn`] if the header is missing, is not a
    /// bearer token, or carries a token nobody holds.
    pub async fn caller(&self, authorization: Option<&str>) -> Result<PlayerId, GamenightError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(PlayerError::NotLoggedIn)?;
        Ok(self.players.authenticate(token).await?)
    }
}

/// Builder for a [`Gamenight`] instance.
///
/// # Example
///
/// ```rust,no_run
/// use gamenight::prelude::*;
///
/// # fn run() -> Result<(), GamenightError> {
/// let app = Gamenight::builder()
///     .storage(StorageConfig::Sqlite { path: "meetups.db".into() })
///     .build()?;
/// assert_eq!(app.backend_name(), "sqlite");
/// # Ok(())
/// # }
/// ```
pub struct GamenightBuilder {
    config: GamenightConfig,
}

impl GamenightBuilder {
    pub fn new() -> Self {
        Self {
            config: GamenightConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: GamenightConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets only the storage backend.
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Opens the backend and wires the services to it.
    ///
    /// # Errors
    /// [`GamenightError::Store`] if the SQLite database cannot be opened
    /// or its schema cannot be created.
    pub fn build(self) -> Result<Gamenight, GamenightError> {
        let store = Arc::new(self.config.storage.open()?);
        let backend = store.name();
        tracing::info!(backend, "gamenight storage ready");

        Ok(Gamenight {
            players: PlayerService::new(Arc::clone(&store)),
            games: GameService::new(Arc::clone(&store)),
            sessions: SessionService::new(store),
            backend,
        })
    }
}

impl Default for GamenightBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_builder_defaults_to_memory() {
        let app = Gamenight::builder().build().unwrap();
        assert_eq!(app.backend_name(), "memory");
    }

    #[test]
    fn test_builder_storage_overrides_config() {
        let app = Gamenight::builder()
            .config(GamenightConfig::default())
            .storage(StorageConfig::Sqlite {
                path: ":memory:".into(),
            })
            .build()
            .unwrap();
        assert_eq!(app.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn test_caller_resolves_bearer_header() {
        let app = Gamenight::builder().build().unwrap();
        let creds = app.players.create("Ann", "ann@x.com", "Passw0rd").await.unwrap();

        let header = format!("Bearer {}", creds.token);
        let caller = app.caller(Some(&header)).await.unwrap();

        assert_eq!(caller, creds.player_id);
    }

    #[tokio::test]
    async fn test_caller_without_valid_header_is_unauthenticated() {
        let app = Gamenight::builder().build().unwrap();

        for header in [None, Some("Basic abc"), Some("Bearer nobody")] {
            let err = app.caller(header).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthenticated, "{header:?}");
        }
    }
}
