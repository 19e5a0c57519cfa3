//! The game catalog for Gamenight.
//!
//! Games are created once and never change. The service validates the
//! name, developer and genre list, rejects duplicate names (ignoring
//! case), and answers filtered searches.

mod error;
mod service;

pub use error::GameError;
pub use service::GameService;
