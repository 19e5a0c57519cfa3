//! Search inputs, typed filters, and session patches.
//!
//! Callers speak in loose key/value pairs (`gid=3`, `state=open`). The
//! `*Query` types collect those pairs; the `*Filters` types are the
//! validated, typed predicates storage actually evaluates.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, parse_genres};
use crate::{Game, GameId, Genre, PlayerId, Session, ValidationError};

pub const DEFAULT_SKIP: usize = 0;
pub const DEFAULT_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// Offset pagination applied after filtering.
///
/// Out-of-range values never fail: a `skip` past the end simply yields
/// an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub skip: usize,
    pub limit: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Paging {
    /// Builds paging from optional values, falling back to the defaults.
    pub fn new(skip: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            skip: skip.unwrap_or(DEFAULT_SKIP),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Slices an already-ordered result set.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit).collect()
    }

    fn from_params(params: &BTreeMap<String, String>) -> Self {
        let number = |key: &str| params.get(key).and_then(|v| v.trim().parse().ok());
        Self::new(number("skip"), number("limit"))
    }
}

fn collect_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> BTreeMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
{
    params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Filter keys accepted by session search.
pub const SESSION_FILTER_KEYS: [&str; 4] = ["gid", "pid", "date", "state"];

/// Raw session search input: paging plus the supplied filter values,
/// not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQuery {
    pub paging: Paging,
    pub params: BTreeMap<String, String>,
}

impl SessionQuery {
    pub fn new(paging: Paging) -> Self {
        Self {
            paging,
            params: BTreeMap::new(),
        }
    }

    /// Collects a query from key/value pairs.
    ///
    /// `skip` and `limit` become paging (non-numeric values fall back to
    /// the defaults). The filter keys `gid`, `pid`, `date` and `state`
    /// are kept for validation; anything else is ignored.
    pub fn from_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = collect_params(params);
        let paging = Paging::from_params(&params);
        params.retain(|key, _| SESSION_FILTER_KEYS.contains(&key.as_str()));
        Self { paging, params }
    }

    /// Adds one filter, builder style.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Validates every supplied filter and converts it to its typed form.
    pub fn filters(&self) -> Result<SessionFilters, ValidationError> {
        let mut filters = SessionFilters::default();
        for (key, value) in &self.params {
            match key.as_str() {
                "gid" => {
                    let id = validation::parse_id(value, ValidationError::InvalidGameId)?;
                    filters.game_id = Some(GameId(id));
                }
                "pid" => {
                    let id = validation::parse_id(value, ValidationError::InvalidPlayerId)?;
                    filters.player_id = Some(PlayerId(id));
                }
                "date" => filters.day = Some(validation::parse_filter_date(value)?),
                "state" => filters.full = Some(validation::parse_state(value)?),
                _ => {}
            }
        }
        Ok(filters)
    }
}

/// Validated session search predicates, combined with AND.
/// `None` means the predicate is not applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFilters {
    pub game_id: Option<GameId>,
    /// The session must contain this player.
    pub player_id: Option<PlayerId>,
    /// Calendar day (UTC) the session takes place on.
    pub day: Option<NaiveDate>,
    /// `Some(true)` selects full sessions, `Some(false)` open ones.
    pub full: Option<bool>,
}

impl SessionFilters {
    pub fn matches(&self, session: &Session) -> bool {
        self.game_id.is_none_or(|id| session.game_id == id)
            && self.player_id.is_none_or(|id| session.has_player(id))
            && self.day.is_none_or(|day| session.date.date_naive() == day)
            && self.full.is_none_or(|full| session.is_full() == full)
    }
}

/// A partial session update. `None` fields keep their stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub capacity: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub game_id: Option<GameId>,
}

impl SessionUpdate {
    pub fn is_empty(&self) -> bool {
        self.capacity.is_none() && self.date.is_none() && self.game_id.is_none()
    }

    /// Merges the supplied fields into `session`.
    pub fn apply_to(&self, session: &mut Session) {
        if let Some(capacity) = self.capacity {
            session.capacity = capacity;
        }
        if let Some(date) = self.date {
            session.date = date;
        }
        if let Some(game_id) = self.game_id {
            session.game_id = game_id;
        }
    }
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// Raw game search input.
///
/// `name` and `developer` arrive in stored form (spaces encoded as
/// hyphens); an empty `genres` list applies no genre filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameQuery {
    pub name: Option<String>,
    pub developer: Option<String>,
    pub genres: Vec<Genre>,
    pub paging: Paging,
}

impl GameQuery {
    /// Collects a query from `name`, `developer`, `genres` (comma
    /// separated), `skip` and `limit` pairs.
    pub fn from_params<K, V>(
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, ValidationError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let params = collect_params(params);
        let genres = match params.get("genres") {
            Some(list) => parse_genres(list)?,
            None => Vec::new(),
        };
        Ok(Self {
            name: params.get("name").cloned(),
            developer: params.get("developer").cloned(),
            genres,
            paging: Paging::from_params(&params),
        })
    }
}

/// Validated game search predicates.
///
/// `name` and `developer` are in original form and matched as
/// case-insensitive substrings; a game must carry every listed genre.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilters {
    pub name: Option<String>,
    pub developer: Option<String>,
    pub genres: Vec<Genre>,
}

impl GameFilters {
    pub fn matches(&self, game: &Game) -> bool {
        contains_ignore_case(&game.name, self.name.as_deref())
            && contains_ignore_case(&game.developer, self.developer.as_deref())
            && self.genres.iter().all(|genre| game.genres.contains(genre))
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|needle| {
        haystack
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::SessionId;

    fn session(capacity: i64, players: &[i64]) -> Session {
        Session {
            id: SessionId(1),
            capacity,
            date: Utc.with_ymd_and_hms(2030, 2, 14, 20, 0, 0).unwrap(),
            game_id: GameId(3),
            players: players.iter().copied().map(PlayerId).collect(),
            host_id: PlayerId(players[0]),
        }
    }

    #[test]
    fn test_paging_defaults() {
        let paging = Paging::default();
        assert_eq!(paging.skip, 0);
        assert_eq!(paging.limit, 100);
        assert_eq!(Paging::new(Some(5), None).limit, 100);
    }

    #[test]
    fn test_paging_apply_skip_beyond_end_returns_empty() {
        let page = Paging::new(Some(10), Some(5)).apply(1..=3);
        assert!(page.is_empty());
    }

    #[test]
    fn test_paging_apply_slices() {
        let page = Paging::new(Some(1), Some(2)).apply(1..=5);
        assert_eq!(page, vec![2, 3]);
    }

    #[test]
    fn test_session_query_from_params_keeps_only_filters() {
        let query = SessionQuery::from_params([
            ("skip", "2"),
            ("limit", "oops"),
            ("gid", "1"),
            ("sort", "desc"),
        ]);
        assert_eq!(query.paging, Paging::new(Some(2), None));
        assert_eq!(query.params.len(), 1);
        assert_eq!(query.params["gid"], "1");
    }

    #[test]
    fn test_session_query_filters_parses_all_keys() {
        let filters = SessionQuery::default()
            .with("gid", "3")
            .with("pid", "7")
            .with("date", "2030-02-14")
            .with("state", "close")
            .filters()
            .unwrap();
        assert_eq!(filters.game_id, Some(GameId(3)));
        assert_eq!(filters.player_id, Some(PlayerId(7)));
        assert_eq!(filters.day, NaiveDate::from_ymd_opt(2030, 2, 14));
        assert_eq!(filters.full, Some(true));
    }

    #[test]
    fn test_session_query_filters_rejects_bad_values() {
        let err = SessionQuery::default().with("gid", "x").filters();
        assert_eq!(err, Err(ValidationError::InvalidGameId));

        let err = SessionQuery::default().with("pid", "-1").filters();
        assert_eq!(err, Err(ValidationError::InvalidPlayerId));

        let err = SessionQuery::default().with("state", "full").filters();
        assert_eq!(err, Err(ValidationError::InvalidState));

        let err = SessionQuery::default().with("date", "tomorrow").filters();
        assert_eq!(err, Err(ValidationError::InvalidDate));
    }

    #[test]
    fn test_session_filters_match_conjunction() {
        let s = session(2, &[1, 2]);
        let mut filters = SessionFilters {
            game_id: Some(GameId(3)),
            player_id: Some(PlayerId(2)),
            day: NaiveDate::from_ymd_opt(2030, 2, 14),
            full: Some(true),
        };
        assert!(filters.matches(&s));

        filters.full = Some(false);
        assert!(!filters.matches(&s));
    }

    #[test]
    fn test_session_filters_day_ignores_time_of_day() {
        let s = session(2, &[1]);
        let filters = SessionFilters {
            day: NaiveDate::from_ymd_opt(2030, 2, 14),
            ..Default::default()
        };
        assert!(filters.matches(&s));
    }

    #[test]
    fn test_session_update_apply_keeps_omitted_fields() {
        let mut s = session(4, &[1]);
        let original_date = s.date;
        SessionUpdate {
            capacity: Some(6),
            ..Default::default()
        }
        .apply_to(&mut s);
        assert_eq!(s.capacity, 6);
        assert_eq!(s.date, original_date);
        assert_eq!(s.game_id, GameId(3));
    }

    #[test]
    fn test_session_update_is_empty_only_without_fields() {
        assert!(SessionUpdate::default().is_empty());
        let update = SessionUpdate {
            game_id: Some(GameId(2)),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_game_query_from_params_parses_genres() {
        let query = GameQuery::from_params([
            ("name", "Age-of"),
            ("genres", "rpg,Puzzle"),
            ("limit", "5"),
        ])
        .unwrap();
        assert_eq!(query.name.as_deref(), Some("Age-of"));
        assert_eq!(query.genres, vec![Genre::Rpg, Genre::Puzzle]);
        assert_eq!(query.paging.limit, 5);

        assert!(GameQuery::from_params([("genres", "chess")]).is_err());
    }

    #[test]
    fn test_game_filters_match_case_insensitive_and_all_genres() {
        let game = Game {
            id: GameId(1),
            name: "Chess Master".into(),
            developer: "ChessCo".into(),
            genres: vec![Genre::Puzzle, Genre::TurnBased],
        };
        let filters = GameFilters {
            name: Some("chess m".into()),
            developer: Some("CHESS".into()),
            genres: vec![Genre::TurnBased],
        };
        assert!(filters.matches(&game));

        let filters = GameFilters {
            genres: vec![Genre::Puzzle, Genre::Rpg],
            ..Default::default()
        };
        assert!(!filters.matches(&game));
    }
}
