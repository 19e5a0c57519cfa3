//! # Gamenight
//!
//! Organize game meetups. Players register and log in, browse a catalog
//! of games, and schedule *sessions*: dated meetups for one game with a
//! fixed number of seats and a host who controls them.
//!
//! This meta-crate wires the layers together:
//!
//! - [`gamenight_domain`]: types, queries, validation rules
//! - [`gamenight_store`]: in-memory and SQLite storage behind one contract
//! - [`gamenight_player`], [`gamenight_game`], [`gamenight_session`]: the
//!   services that enforce the rules
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gamenight::prelude::*;
//!
//! # async fn run() -> Result<(), GamenightError> {
//! gamenight::telemetry::init();
//!
//! let app = Gamenight::builder()
//!     .config(GamenightConfig::from_env()?)
//!     .build()?;
//!
//! let ann = app.players.create("Ann", "ann@x.com", "Passw0rd").await?;
//! let chess = app.games.create("Chess", "ChessCo", &[Genre::Puzzle]).await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;
pub mod telemetry;

pub use app::{Gamenight, GamenightBuilder};
pub use config::{GamenightConfig, StorageConfig};
pub use error::{ErrorKind, GamenightError};

/// Everything needed to drive Gamenight, in one import.
pub mod prelude {
    pub use crate::{
        ErrorKind, Gamenight, GamenightConfig, GamenightError, StorageConfig,
    };
    pub use gamenight_domain::{
        Credentials, Game, GameId, GameQuery, Genre, Paging, PlayerHome,
        PlayerId, PlayerInfo, SessionDetails, SessionId, SessionQuery,
        SessionUpdate, ValidationError,
    };
    pub use gamenight_game::GameError;
    pub use gamenight_player::{Authenticator, PlayerError, bearer_token};
    pub use gamenight_session::SessionError;
    pub use gamenight_store::{Backend, StoreError};
}
