//! Player accounts for Gamenight.
//!
//! This crate owns everything about who a player is:
//!
//! 1. **Registration**: validating and storing new accounts
//!    ([`PlayerService::create`]).
//! 2. **Credentials**: password digests and session tokens
//!    ([`credentials`]).
//! 3. **Authentication**: turning a token back into a [`PlayerId`]
//!    ([`Authenticator`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Boundary (HTTP, CLI, ...)   ← resolves callers through Authenticator
//!     ↕
//! Player layer (this crate)   ← validates input, mints and checks credentials
//!     ↕
//! Storage layer (below)       ← PlayerStore
//! ```
//!
//! [`PlayerId`]: gamenight_domain::PlayerId

mod auth;
pub mod credentials;
mod error;
mod service;

pub use auth::{Authenticator, bearer_token};
pub use error::PlayerError;
pub use service::PlayerService;
