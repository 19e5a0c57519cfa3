//! Domain model for Gamenight.
//!
//! This crate defines the vocabulary every other layer speaks:
//!
//! - **Types** ([`Player`], [`Game`], [`Session`], the id newtypes and
//!   [`Genre`]): the entities the storage layer persists.
//! - **Views** ([`SessionDetails`], [`PlayerInfo`], etc.): the shapes
//!   services hand back to callers.
//! - **Queries** ([`Paging`], [`SessionQuery`], [`GameQuery`]): search
//!   inputs and the typed filters derived from them.
//! - **Validation** ([`validation`], [`ValidationError`]): pure
//!   predicates over raw inputs. No state, no I/O.
//!
//! # Architecture
//!
//! ```text
//! Services (player / game / session)  ← validate, then call storage
//!     ↕
//! Storage (memory / sqlite)           ← persist entities, answer predicates
//!     ↕
//! Domain (this crate)                 ← types both of them share
//! ```

mod error;
mod query;
mod types;
pub mod validation;

pub use error::ValidationError;
pub use query::{
    DEFAULT_LIMIT, DEFAULT_SKIP, GameFilters, GameQuery, Paging,
    SessionFilters, SessionQuery, SessionUpdate,
};
pub use types::{
    Credentials, Game, GameId, GameIdentification, Genre, Player,
    PlayerHome, PlayerId, PlayerInfo, Session, SessionDetails, SessionId,
    SessionPlayer,
};
