//! Session management for Gamenight.
//!
//! A session is a scheduled meetup to play one game. This crate is the
//! state machine around it:
//!
//! - **Capacity**: a session is *open* while it has fewer members than
//!   its capacity, *full* otherwise.
//! - **Host rights**: the creator is the host. Only the host may update
//!   or delete the session, and the host can never leave it.
//! - **Expiry**: once its date has passed a session is *expired*. Joins,
//!   leaves and updates are refused; reads and deletes still work.
//!
//! None of these states are stored. They are computed from the stored
//! capacity, member list and date every time they are needed.
//!
//! # How it fits in the stack
//!
//! ```text
//! Boundary (above)          ← resolves the caller, maps SessionError to a status
//!     ↕
//! Session layer (this crate) ← validates, checks rules in a fixed order, mutates once
//!     ↕
//! Storage layer (below)     ← SessionStore
//! ```

mod error;
mod locks;
mod service;

pub use error::SessionError;
pub use service::SessionService;
