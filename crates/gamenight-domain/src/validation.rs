//! Input validation rules.
//!
//! Every function here is a pure predicate: it either returns `Ok` or
//! the specific [`ValidationError`] for the rule that failed. Services
//! run these before touching storage, so a rejected call never mutates
//! anything.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::{GameId, Genre, PlayerId, SessionId, ValidationError};

pub const MAX_PLAYER_NAME_LENGTH: usize = 25;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 20;
pub const MAX_DEVELOPER_NAME_LENGTH: usize = 32;
pub const MAX_GAME_NAME_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Identifiers and numbers
// ---------------------------------------------------------------------------

fn check_positive(value: i64, err: ValidationError) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(err);
    }
    Ok(())
}

pub fn check_player_id(id: PlayerId) -> Result<(), ValidationError> {
    check_positive(id.0, ValidationError::InvalidPlayerId)
}

pub fn check_game_id(id: GameId) -> Result<(), ValidationError> {
    check_positive(id.0, ValidationError::InvalidGameId)
}

pub fn check_session_id(id: SessionId) -> Result<(), ValidationError> {
    check_positive(id.0, ValidationError::InvalidSessionId)
}

pub fn check_capacity(capacity: i64) -> Result<(), ValidationError> {
    check_positive(capacity, ValidationError::InvalidCapacity)
}

// ---------------------------------------------------------------------------
// Player credentials
// ---------------------------------------------------------------------------

/// Non-empty, at most 25 characters, no spaces.
pub fn check_player_name(name: &str) -> Result<(), ValidationError> {
    if !within_length(name, MAX_PLAYER_NAME_LENGTH) || name.contains(' ') {
        return Err(ValidationError::InvalidPlayerName);
    }
    Ok(())
}

/// `local@domain`, where the local part may use letters, digits and
/// `+ _ . -`, and the domain letters, digits and `. -`.
pub fn check_email(email: &str) -> Result<(), ValidationError> {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.is_empty()
            && local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "+_.-".contains(c))
            && domain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || ".-".contains(c))
    });
    if !valid {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// 6 to 20 ASCII letters and digits, with at least one lower case
/// letter, one upper case letter and one digit.
pub fn check_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    let valid = (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len)
        && password.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit());
    if !valid {
        return Err(ValidationError::InvalidPassword);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Game catalog
// ---------------------------------------------------------------------------

/// Non-empty, at most 64 characters of ASCII letters, digits and single
/// inner spaces.
pub fn check_game_name(name: &str) -> Result<(), ValidationError> {
    if !within_length(name, MAX_GAME_NAME_LENGTH) {
        return Err(ValidationError::InvalidGameNameLength);
    }
    if name != name.trim()
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ')
        || name.contains("  ")
    {
        return Err(ValidationError::InvalidGameName);
    }
    Ok(())
}

/// Non-empty, at most 32 characters, no leading or trailing whitespace.
pub fn check_developer(developer: &str) -> Result<(), ValidationError> {
    if !within_length(developer, MAX_DEVELOPER_NAME_LENGTH) {
        return Err(ValidationError::InvalidDeveloperNameLength);
    }
    if developer != developer.trim() {
        return Err(ValidationError::InvalidDeveloperName);
    }
    Ok(())
}

/// A game must carry at least one genre.
pub fn check_genres(genres: &[Genre]) -> Result<(), ValidationError> {
    if genres.is_empty() {
        return Err(ValidationError::InvalidGenre(String::new()));
    }
    Ok(())
}

/// Parses a comma-separated genre list (`"rpg,Puzzle"`).
///
/// An empty string yields an empty list; any unknown tag fails the
/// whole list.
pub fn parse_genres(list: &str) -> Result<Vec<Genre>, ValidationError> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    list.split(',').map(|tag| tag.trim().parse()).collect()
}

// ---------------------------------------------------------------------------
// Stored form
// ---------------------------------------------------------------------------

// Free-text query values travel with spaces replaced by hyphens, so a
// stored-form value must not contain a literal space.

/// Decodes a stored-form query value back to its original text.
pub fn to_original_name(stored: &str) -> String {
    stored.replace('-', " ")
}

/// Encodes free text into its stored form.
pub fn to_stored_form(name: &str) -> String {
    name.replace(' ', "-")
}

/// A stored-form game name must not contain a literal space.
pub fn check_query_name(stored: &str) -> Result<(), ValidationError> {
    if stored.contains(' ') {
        return Err(ValidationError::InvalidGameName);
    }
    Ok(())
}

/// A stored-form developer must not contain a literal space.
pub fn check_query_developer(stored: &str) -> Result<(), ValidationError> {
    if stored.contains(' ') {
        return Err(ValidationError::InvalidDeveloperName);
    }
    Ok(())
}

/// Validates and decodes a stored-form game name filter.
pub fn decode_query_name(stored: &str) -> Result<String, ValidationError> {
    check_query_name(stored)?;
    let name = to_original_name(stored);
    check_game_name(&name)?;
    Ok(name)
}

/// Validates and decodes a stored-form developer filter.
pub fn decode_query_developer(stored: &str) -> Result<String, ValidationError> {
    check_query_developer(stored)?;
    let developer = to_original_name(stored);
    check_developer(&developer)?;
    Ok(developer)
}

// ---------------------------------------------------------------------------
// Dates and session state
// ---------------------------------------------------------------------------

/// A session date must have a positive year and must not lie before `now`.
pub fn check_date(
    date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if date.year() <= 0 || date < now {
        return Err(ValidationError::InvalidDate);
    }
    Ok(())
}

/// Parses an ISO calendar date (`YYYY-MM-DD`) used as a day filter.
pub fn parse_filter_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate)?;
    if day.year() <= 0 {
        return Err(ValidationError::InvalidDate);
    }
    Ok(day)
}

/// Translates a state token into the "is full" predicate it selects:
/// `"open"` looks for sessions that are NOT full, `"close"` for full ones.
pub fn parse_state(value: &str) -> Result<bool, ValidationError> {
    match value {
        "open" => Ok(false),
        "close" => Ok(true),
        _ => Err(ValidationError::InvalidState),
    }
}

/// Parses a numeric filter value into a positive id.
pub fn parse_id(value: &str, err: ValidationError) -> Result<i64, ValidationError> {
    let id: i64 = value.trim().parse().map_err(|_| err.clone())?;
    check_positive(id, err)?;
    Ok(id)
}

fn within_length(value: &str, max: usize) -> bool {
    !value.is_empty() && value.chars().count() <= max
}
