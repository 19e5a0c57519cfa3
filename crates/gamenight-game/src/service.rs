//! The game service: catalog creation, lookup, and search.

use std::sync::Arc;

use gamenight_domain::validation::{
    check_developer, check_game_id, check_game_name, check_genres,
    check_query_developer, check_query_name, decode_query_developer,
    decode_query_name,
};
use gamenight_domain::{Game, GameFilters, GameId, GameQuery, Genre};
use gamenight_store::GameStore;
use tokio::sync::Mutex;

use crate::GameError;

/// Validates catalog input and drives a [`GameStore`].
pub struct GameService<S> {
    store: Arc<S>,

    /// Makes the duplicate-name check and the insert one step.
    registration: Mutex<()>,
}

impl<S: GameStore> GameService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            registration: Mutex::new(()),
        }
    }

    /// Adds a game to the catalog.
    ///
    /// Repeated genres are collapsed, keeping the first occurrence.
    ///
    /// # Errors
    /// - [`GameError::Validation`]: bad name or developer, or no genres
    /// - [`GameError::AlreadyExists`]: the name is taken, ignoring case
    pub async fn create(
        &self,
        name: &str,
        developer: &str,
        genres: &[Genre],
    ) -> Result<GameId, GameError> {
        check_game_name(name)?;
        check_developer(developer)?;
        let genres = dedup_genres(genres);
        check_genres(&genres)?;

        let _gate = self.registration.lock().await;
        if self.store.game_name_exists(name).await? {
            tracing::debug!(game_name = name, "game rejected, name taken");
            return Err(GameError::AlreadyExists);
        }
        let game_id = self.store.create_game(name, developer, &genres).await?;

        tracing::info!(%game_id, game_name = name, "game created");
        Ok(game_id)
    }

    pub async fn get(&self, game_id: GameId) -> Result<Game, GameError> {
        check_game_id(game_id)?;
        self.store
            .get_game(game_id)
            .await?
            .ok_or(GameError::NotFound)
    }

    /// Searches the catalog.
    ///
    /// `name` and `developer` in the query are in stored form: a literal
    /// space is rejected, hyphens are decoded to spaces, and the decoded
    /// text must pass the same rules as on creation.
    pub async fn search(&self, query: &GameQuery) -> Result<Vec<Game>, GameError> {
        if let Some(name) = &query.name {
            check_query_name(name)?;
        }
        if let Some(developer) = &query.developer {
            check_query_developer(developer)?;
        }
        let filters = GameFilters {
            name: query.name.as_deref().map(decode_query_name).transpose()?,
            developer: query
                .developer
                .as_deref()
                .map(decode_query_developer)
                .transpose()?,
            genres: query.genres.clone(),
        };
        Ok(self.store.search_games(&filters, query.paging).await?)
    }
}

fn dedup_genres(genres: &[Genre]) -> Vec<Genre> {
    let mut unique = Vec::with_capacity(genres.len());
    for genre in genres {
        if !unique.contains(genre) {
            unique.push(*genre);
        }
    }
    unique
}

// =========================================================================
// Tests
// =========================================================================
