//! Core entities and output views.
//!
//! Entities ([`Player`], [`Game`], [`Session`]) are what the storage
//! layer persists. Views ([`SessionDetails`], [`PlayerInfo`], ...) are
//! what services return to callers; they never carry credentials.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a registered player.
///
/// Newtype over `i64` so a `GameId` can never be passed where a
/// `PlayerId` is expected. Ids are assigned sequentially by storage,
/// starting at 1. The inner value is `i64` (not `u64`) because callers
/// hand us raw numbers that may be zero or negative, and validation has
/// to be able to see and reject them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a catalog game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct GameId(pub i64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// A unique identifier for a scheduled session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

/// The closed set of genre tags a game can carry.
///
/// Serialized as the upper-case tag (`"RPG"`, `"TURNBASED"`). Parsing
/// is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Genre {
    Rpg,
    Adventure,
    Shooter,
    TurnBased,
    Action,
    Multiplayer,
    Puzzle,
    Survival,
    Sports,
    Simulation,
    Racing,
    BattleRoyale,
    Platform,
    Sandbox,
    Horror,
}

impl Genre {
    /// Every genre, in declaration order.
    pub const ALL: [Genre; 15] = [
        Genre::Rpg,
        Genre::Adventure,
        Genre::Shooter,
        Genre::TurnBased,
        Genre::Action,
        Genre::Multiplayer,
        Genre::Puzzle,
        Genre::Survival,
        Genre::Sports,
        Genre::Simulation,
        Genre::Racing,
        Genre::BattleRoyale,
        Genre::Platform,
        Genre::Sandbox,
        Genre::Horror,
    ];

    /// The canonical tag, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rpg => "RPG",
            Self::Adventure => "ADVENTURE",
            Self::Shooter => "SHOOTER",
            Self::TurnBased => "TURNBASED",
            Self::Action => "ACTION",
            Self::Multiplayer => "MULTIPLAYER",
            Self::Puzzle => "PUZZLE",
            Self::Survival => "SURVIVAL",
            Self::Sports => "SPORTS",
            Self::Simulation => "SIMULATION",
            Self::Racing => "RACING",
            Self::BattleRoyale => "BATTLEROYALE",
            Self::Platform => "PLATFORM",
            Self::Sandbox => "SANDBOX",
            Self::Horror => "HORROR",
        }
    }
}

impl FromStr for Genre {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::InvalidGenre(s.to_string()))
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A registered player, as persisted.
///
/// Credentials are stored as digests only (see `gamenight-player`).
/// `token_hash` is `Some` exactly while the player is logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub token_hash: Option<String>,
}

impl Player {
    /// The public view of this player.
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// A catalog entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub developer: String,
    /// Non-empty, in the order supplied at creation.
    pub genres: Vec<Genre>,
}

/// A scheduled play meetup for one game.
///
/// Whether a session is open/full or expired is never stored; those
/// are computed from the fields below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    /// Maximum simultaneous members. Always `>= players.len()`.
    pub capacity: i64,
    pub date: DateTime<Utc>,
    pub game_id: GameId,
    /// Distinct member ids in join order. Always contains `host_id`.
    pub players: Vec<PlayerId>,
    pub host_id: PlayerId,
}

impl Session {
    /// Returns `true` once membership has reached capacity.
    pub fn is_full(&self) -> bool {
        self.players.len() as i64 >= self.capacity
    }

    /// Returns `true` if the session's date is strictly before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }

    pub fn is_host(&self, player_id: PlayerId) -> bool {
        self.host_id == player_id
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.players.contains(&player_id)
    }

    /// Returns `true` if `capacity` could hold the current members.
    pub fn fits_capacity(&self, capacity: i64) -> bool {
        capacity >= self.players.len() as i64
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Public information about a player (no credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub email: String,
}

/// What a logged-in player sees about themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHome {
    pub id: PlayerId,
    pub name: String,
}

/// A freshly minted session token together with its owner.
///
/// Returned by registration and login. The raw `token` is only ever
/// seen here; storage keeps its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub player_id: PlayerId,
}

/// A game reference resolved to its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameIdentification {
    pub id: GameId,
    /// Empty when the id is not in the catalog.
    pub name: String,
}

/// A session member resolved to their name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlayer {
    pub id: PlayerId,
    /// Empty when the id does not belong to a registered player.
    pub name: String,
}

/// Full detail view of a session, with game and member names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub id: SessionId,
    pub capacity: i64,
    pub date: DateTime<Utc>,
    pub game: GameIdentification,
    pub players: Vec<SessionPlayer>,
    pub host_id: PlayerId,
}

impl SessionDetails {
    /// Member ids in join order.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn session(capacity: i64, players: &[i64]) -> Session {
        Session {
            id: SessionId(1),
            capacity,
            date: Utc::now() + Duration::days(1),
            game_id: GameId(1),
            players: players.iter().copied().map(PlayerId).collect(),
            host_id: PlayerId(players[0]),
        }
    }

    #[test]
    fn test_id_display_prefixes() {
        assert_eq!(PlayerId(3).to_string(), "P-3");
        assert_eq!(GameId(4).to_string(), "G-4");
        assert_eq!(SessionId(5).to_string(), "S-5");
    }

    #[test]
    fn test_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&SessionId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_genre_from_str_is_case_insensitive() {
        assert_eq!("rpg".parse::<Genre>().unwrap(), Genre::Rpg);
        assert_eq!("TurnBased".parse::<Genre>().unwrap(), Genre::TurnBased);
        assert_eq!(
            "BATTLEROYALE".parse::<Genre>().unwrap(),
            Genre::BattleRoyale
        );
    }

    #[test]
    fn test_genre_from_str_unknown_returns_invalid_genre() {
        let err = "chess".parse::<Genre>().unwrap_err();
        assert_eq!(err, ValidationError::InvalidGenre("chess".into()));
    }

    #[test]
    fn test_genre_serializes_as_tag() {
        let json = serde_json::to_string(&[Genre::Puzzle, Genre::TurnBased])
            .unwrap();
        assert_eq!(json, r#"["PUZZLE","TURNBASED"]"#);
    }

    #[test]
    fn test_genre_as_str_round_trips_for_all() {
        for genre in Genre::ALL {
            assert_eq!(genre.as_str().parse::<Genre>().unwrap(), genre);
        }
    }

    #[test]
    fn test_session_is_full_at_capacity() {
        assert!(!session(2, &[1]).is_full());
        assert!(session(2, &[1, 2]).is_full());
    }

    #[test]
    fn test_session_is_expired_strictly_before_now() {
        let s = session(2, &[1]);
        assert!(!s.is_expired(s.date));
        assert!(s.is_expired(s.date + Duration::seconds(1)));
    }

    #[test]
    fn test_session_fits_capacity() {
        let s = session(4, &[1, 2, 3]);
        assert!(s.fits_capacity(3));
        assert!(!s.fits_capacity(2));
    }

    #[test]
    fn test_player_info_omits_credentials() {
        let player = Player {
            id: PlayerId(1),
            name: "Ann".into(),
            email: "ann@x.com".into(),
            password_hash: "secret".into(),
            token_hash: Some("token".into()),
        };
        let json = serde_json::to_string(&player.info()).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("token"));
    }
}
