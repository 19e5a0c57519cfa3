//! SQLite backend.
//!
//! A single [`rusqlite::Connection`] behind an async mutex. Every call
//! takes the lock first and then runs its statements synchronously;
//! nothing is awaited while a statement is alive. All values travel as
//! bound parameters, never spliced into SQL.
//!
//! Dates are stored as unix seconds, genres as their upper-case tag in
//! a side table that keeps the order they were supplied in.

use std::path::Path;

use chrono::{DateTime, NaiveTime, Utc};
use gamenight_domain::{
    Game, GameFilters, GameId, GameIdentification, Genre, Paging, Player,
    PlayerId, PlayerInfo, Session, SessionDetails, SessionFilters, SessionId,
    SessionPlayer, SessionUpdate,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tokio::sync::Mutex;

use crate::{GameStore, PlayerStore, SessionStore, StoreError};

const SECONDS_PER_DAY: i64 = 86_400;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS players (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        token_hash    TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_players_token ON players(token_hash);

    CREATE TABLE IF NOT EXISTS games (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        name      TEXT NOT NULL,
        developer TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS game_genres (
        game_id  INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        genre    TEXT NOT NULL,
        PRIMARY KEY (game_id, position)
    );

    CREATE TABLE IF NOT EXISTS sessions (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        capacity INTEGER NOT NULL,
        date     INTEGER NOT NULL,
        game_id  INTEGER NOT NULL,
        host_id  INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS session_players (
        session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
        player_id  INTEGER NOT NULL,
        position   INTEGER NOT NULL,
        PRIMARY KEY (session_id, player_id)
    );
";

/// Storage backed by a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and ensures the schema exists.
    ///
    /// The path `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn to_date(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {secs}")))
}

fn to_genre(tag: &str) -> Result<Genre, StoreError> {
    tag.parse()
        .map_err(|_| StoreError::Corrupt(format!("unknown genre tag: {tag}")))
}

/// SQLite integers are signed; paging values beyond `i64::MAX` saturate.
fn paging_params(paging: Paging) -> [Value; 2] {
    let clamp = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
    [
        Value::Integer(clamp(paging.limit)),
        Value::Integer(clamp(paging.skip)),
    ]
}

fn read_player(
    conn: &Connection,
    where_clause: &str,
    arg: Value,
) -> Result<Option<Player>, StoreError> {
    let sql = format!(
        "SELECT id, name, email, password_hash, token_hash FROM players WHERE {where_clause}"
    );
    let player = conn
        .query_row(&sql, [arg], |row| {
            Ok(Player {
                id: PlayerId(row.get(0)?),
                name: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                token_hash: row.get(4)?,
            })
        })
        .optional()?;
    Ok(player)
}

fn read_genres(conn: &Connection, game_id: GameId) -> Result<Vec<Genre>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT genre FROM game_genres WHERE game_id = ?1 ORDER BY position",
    )?;
    let tags = stmt
        .query_map([game_id.0], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    tags.iter().map(|tag| to_genre(tag)).collect()
}

fn read_game(conn: &Connection, id: GameId) -> Result<Option<Game>, StoreError> {
    let row = conn
        .query_row(
            "SELECT name, developer FROM games WHERE id = ?1",
            [id.0],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;
    let Some((name, developer)) = row else {
        return Ok(None);
    };
    Ok(Some(Game {
        id,
        name,
        developer,
        genres: read_genres(conn, id)?,
    }))
}

fn read_session(conn: &Connection, id: SessionId) -> Result<Option<Session>, StoreError> {
    let row = conn
        .query_row(
            "SELECT capacity, date, game_id, host_id FROM sessions WHERE id = ?1",
            [id.0],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )
        .optional()?;
    let Some((capacity, date, game_id, host_id)) = row else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT player_id FROM session_players WHERE session_id = ?1 ORDER BY position",
    )?;
    let players = stmt
        .query_map([id.0], |row| Ok(PlayerId(row.get(0)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Session {
        id,
        capacity,
        date: to_date(date)?,
        game_id: GameId(game_id),
        players,
        host_id: PlayerId(host_id),
    }))
}

/// Resolves a session's game and member names. Unknown ids resolve to
/// an empty name.
fn read_details(conn: &Connection, session: Session) -> Result<SessionDetails, StoreError> {
    let game_name: Option<String> = conn
        .query_row(
            "SELECT name FROM games WHERE id = ?1",
            [session.game_id.0],
            |row| row.get(0),
        )
        .optional()?;

    let mut stmt = conn.prepare(
        "SELECT sp.player_id, COALESCE(p.name, '')
         FROM session_players sp
         LEFT JOIN players p ON p.id = sp.player_id
         WHERE sp.session_id = ?1
         ORDER BY sp.position",
    )?;
    let players = stmt
        .query_map([session.id.0], |row| {
            Ok(SessionPlayer {
                id: PlayerId(row.get(0)?),
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SessionDetails {
        id: session.id,
        capacity: session.capacity,
        date: session.date,
        game: GameIdentification {
            id: session.game_id,
            name: game_name.unwrap_or_default(),
        },
        players,
        host_id: session.host_id,
    })
}

/// Runs `check` against a session, answering `false` when it is missing.
async fn check_session(
    store: &SqliteStore,
    id: SessionId,
    check: impl FnOnce(&Session) -> bool,
) -> Result<bool, StoreError> {
    let conn = store.conn.lock().await;
    Ok(read_session(&conn, id)?.as_ref().is_some_and(check))
}

// ---------------------------------------------------------------------------
// PlayerStore
// ---------------------------------------------------------------------------

impl PlayerStore for SqliteStore {
    async fn create_player(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        token_hash: &str,
    ) -> Result<PlayerId, StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO players (name, email, password_hash, token_hash)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, email, password_hash, token_hash],
        )?;
        Ok(PlayerId(conn.last_insert_rowid()))
    }

    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        let conn = self.conn.lock().await;
        read_player(&conn, "id = ?1", Value::Integer(id.0))
    }

    async fn find_player_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Player>, StoreError> {
        let conn = self.conn.lock().await;
        read_player(&conn, "name = ?1", Value::Text(name.to_string()))
    }

    async fn player_name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM players WHERE name = ?1)",
            [name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn token_hash_exists(&self, token_hash: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM players WHERE token_hash = ?1)",
            [token_hash],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn player_id_for_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PlayerId>, StoreError> {
        let conn = self.conn.lock().await;
        let id = conn
            .query_row(
                "SELECT id FROM players WHERE token_hash = ?1 ORDER BY id LIMIT 1",
                [token_hash],
                |row| Ok(PlayerId(row.get(0)?)),
            )
            .optional()?;
        Ok(id)
    }

    async fn set_token_hash(
        &self,
        id: PlayerId,
        token_hash: Option<&str>,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE players SET token_hash = ?1 WHERE id = ?2",
            params![token_hash, id.0],
        )?;
        Ok(changed > 0)
    }

    async fn search_players(
        &self,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<PlayerInfo>, StoreError> {
        let conn = self.conn.lock().await;
        let [limit, offset] = paging_params(paging);
        let mut stmt = conn.prepare(
            "SELECT id, name, email FROM players
             WHERE instr(lower(name), lower(?1)) > 0
             ORDER BY id LIMIT ?2 OFFSET ?3",
        )?;
        let players = stmt
            .query_map(params![name, limit, offset], |row| {
                Ok(PlayerInfo {
                    id: PlayerId(row.get(0)?),
                    name: row.get(1)?,
                    email: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(players)
    }
}

// ---------------------------------------------------------------------------
// GameStore
// ---------------------------------------------------------------------------

impl GameStore for SqliteStore {
    async fn create_game(
        &self,
        name: &str,
        developer: &str,
        genres: &[Genre],
    ) -> Result<GameId, StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO games (name, developer) VALUES (?1, ?2)",
            params![name, developer],
        )?;
        let id = GameId(tx.last_insert_rowid());
        {
            let mut insert = tx.prepare(
                "INSERT INTO game_genres (game_id, position, genre) VALUES (?1, ?2, ?3)",
            )?;
            for (position, genre) in genres.iter().enumerate() {
                insert.execute(params![id.0, position as i64, genre.as_str()])?;
            }
        }
        tx.commit()?;
        Ok(id)
    }

    async fn get_game(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        let conn = self.conn.lock().await;
        read_game(&conn, id)
    }

    async fn game_name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM games WHERE lower(name) = lower(?1))",
            [name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn search_games(
        &self,
        filters: &GameFilters,
        paging: Paging,
    ) -> Result<Vec<Game>, StoreError> {
        let mut sql = String::from("SELECT id FROM games WHERE 1 = 1");
        let mut args = Vec::new();
        if let Some(name) = &filters.name {
            sql.push_str(" AND instr(lower(name), lower(?)) > 0");
            args.push(Value::Text(name.clone()));
        }
        if let Some(developer) = &filters.developer {
            sql.push_str(" AND instr(lower(developer), lower(?)) > 0");
            args.push(Value::Text(developer.clone()));
        }
        for genre in &filters.genres {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM game_genres g
                              WHERE g.game_id = games.id AND g.genre = ?)",
            );
            args.push(Value::Text(genre.as_str().to_string()));
        }
        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");
        args.extend(paging_params(paging));

        let conn = self.conn.lock().await;
        let ids = {
            let mut stmt = conn.prepare(&sql)?;
            let ids = stmt
                .query_map(params_from_iter(args), |row| Ok(GameId(row.get(0)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };
        let mut games = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(game) = read_game(&conn, id)? {
                games.push(game);
            }
        }
        Ok(games)
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

impl SessionStore for SqliteStore {
    async fn create_session(
        &self,
        capacity: i64,
        game_id: GameId,
        date: DateTime<Utc>,
        host_id: PlayerId,
    ) -> Result<SessionId, StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO sessions (capacity, date, game_id, host_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![capacity, date.timestamp(), game_id.0, host_id.0],
        )?;
        let id = SessionId(tx.last_insert_rowid());
        tx.execute(
            "INSERT INTO session_players (session_id, player_id, position)
             VALUES (?1, ?2, 1)",
            params![id.0, host_id.0],
        )?;
        tx.commit()?;
        Ok(id)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        let conn = self.conn.lock().await;
        read_session(&conn, id)
    }

    async fn get_session_details(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionDetails>, StoreError> {
        let conn = self.conn.lock().await;
        match read_session(&conn, id)? {
            Some(session) => Ok(Some(read_details(&conn, session)?)),
            None => Ok(None),
        }
    }

    async fn search_sessions(
        &self,
        filters: &SessionFilters,
        paging: Paging,
    ) -> Result<Vec<SessionDetails>, StoreError> {
        let mut sql = String::from("SELECT s.id FROM sessions s WHERE 1 = 1");
        let mut args = Vec::new();
        if let Some(game_id) = filters.game_id {
            sql.push_str(" AND s.game_id = ?");
            args.push(Value::Integer(game_id.0));
        }
        if let Some(player_id) = filters.player_id {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM session_players sp
                              WHERE sp.session_id = s.id AND sp.player_id = ?)",
            );
            args.push(Value::Integer(player_id.0));
        }
        if let Some(day) = filters.day {
            // SQLite's date() is NULL past year 9999, so match on seconds.
            let start = day.and_time(NaiveTime::MIN).and_utc().timestamp();
            sql.push_str(" AND s.date >= ? AND s.date < ?");
            args.push(Value::Integer(start));
            args.push(Value::Integer(start + SECONDS_PER_DAY));
        }
        if let Some(full) = filters.full {
            sql.push_str(
                " AND ((SELECT COUNT(*) FROM session_players sp
                        WHERE sp.session_id = s.id) >= s.capacity) = ?",
            );
            args.push(Value::Integer(i64::from(full)));
        }
        sql.push_str(" ORDER BY s.id LIMIT ? OFFSET ?");
        args.extend(paging_params(paging));

        let conn = self.conn.lock().await;
        let ids = {
            let mut stmt = conn.prepare(&sql)?;
            let ids = stmt
                .query_map(params_from_iter(args), |row| Ok(SessionId(row.get(0)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };
        let mut sessions = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(session) = read_session(&conn, id)? {
                sessions.push(read_details(&conn, session)?);
            }
        }
        Ok(sessions)
    }

    async fn delete_session(&self, id: SessionId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute("DELETE FROM sessions WHERE id = ?1", [id.0])?;
        Ok(deleted > 0)
    }

    async fn add_player_to_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO session_players (session_id, player_id, position)
             SELECT s.id, ?2,
                    (SELECT COALESCE(MAX(position), 0) + 1
                     FROM session_players WHERE session_id = s.id)
             FROM sessions s WHERE s.id = ?1",
            params![id.0, player_id.0],
        )?;
        Ok(inserted > 0)
    }

    async fn remove_player_from_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let removed = conn.execute(
            "DELETE FROM session_players WHERE session_id = ?1 AND player_id = ?2",
            params![id.0, player_id.0],
        )?;
        Ok(removed > 0)
    }

    async fn update_session(
        &self,
        id: SessionId,
        update: &SessionUpdate,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE sessions SET
                capacity = COALESCE(?1, capacity),
                date     = COALESCE(?2, date),
                game_id  = COALESCE(?3, game_id)
             WHERE id = ?4",
            params![
                update.capacity,
                update.date.map(|d| d.timestamp()),
                update.game_id.map(|g| g.0),
                id.0
            ],
        )?;
        Ok(changed > 0)
    }

    async fn session_exists(&self, id: SessionId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE id = ?1)",
            [id.0],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn is_session_full(&self, id: SessionId) -> Result<bool, StoreError> {
        check_session(self, id, Session::is_full).await
    }

    async fn is_session_host(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let host = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE id = ?1 AND host_id = ?2)",
            params![id.0, player_id.0],
            |row| row.get(0),
        )?;
        Ok(host)
    }

    async fn is_player_in_session(
        &self,
        id: SessionId,
        player_id: PlayerId,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let member = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM session_players
                           WHERE session_id = ?1 AND player_id = ?2)",
            params![id.0, player_id.0],
            |row| row.get(0),
        )?;
        Ok(member)
    }

    async fn is_session_expired(
        &self,
        id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        check_session(self, id, |s| s.is_expired(now)).await
    }

    async fn is_valid_capacity(
        &self,
        id: SessionId,
        capacity: i64,
    ) -> Result<bool, StoreError> {
        check_session(self, id, |s| s.fits_capacity(capacity)).await
    }
}
