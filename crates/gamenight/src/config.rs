//! Startup configuration: which storage backend to open.
//!
//! The backend is chosen once, when the application is built, and every
//! service shares it for the life of the process.

use std::path::PathBuf;

use gamenight_store::{Backend, SqliteStore};
use serde::{Deserialize, Serialize};

use crate::GamenightError;

/// Environment variable naming the backend: `memory` or `sqlite`.
pub const STORAGE_VAR: &str = "GAMENIGHT_STORAGE";

/// Environment variable holding the SQLite database path.
pub const DATABASE_VAR: &str = "GAMENIGHT_DATABASE";

const DEFAULT_DATABASE: &str = "gamenight.db";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamenightConfig {
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Where sessions, games and players live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process memory. Everything is lost on exit.
    #[default]
    Memory,

    /// A SQLite file. `":memory:"` opens a private in-memory database.
    Sqlite { path: PathBuf },
}

impl GamenightConfig {
    /// Reads [`STORAGE_VAR`] and [`DATABASE_VAR`] from the process
    /// environment.
    ///
    /// # Errors
    /// [`GamenightError::Config`] if the backend name is not recognized.
    pub fn from_env() -> Result<Self, GamenightError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup` instead of the process environment.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GamenightError> {
        let backend = lookup(STORAGE_VAR).unwrap_or_else(|| "memory".to_string());
        let storage = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => StorageConfig::Memory,
            "sqlite" => StorageConfig::Sqlite {
                path: lookup(DATABASE_VAR)
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
                    .into(),
            },
            other => {
                return Err(GamenightError::Config(format!(
                    "unknown storage backend {other:?} in {STORAGE_VAR}"
                )));
            }
        };
        Ok(Self { storage })
    }
}

impl StorageConfig {
    /// Opens the configured backend.
    pub fn open(&self) -> Result<Backend, GamenightError> {
        match self {
            StorageConfig::Memory => Ok(Backend::memory()),
            StorageConfig::Sqlite { path } => Ok(SqliteStore::open(path)?.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults_to_memory() {
        let config = GamenightConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GamenightConfig::default());
        assert_eq!(config.storage, StorageConfig::Memory);
    }

    #[test]
    fn test_from_lookup_sqlite_uses_default_path() {
        let config = GamenightConfig::from_lookup(lookup(&[(STORAGE_VAR, "SQLite")])).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: "gamenight.db".into()
            }
        );
    }

    #[test]
    fn test_from_lookup_sqlite_reads_path() {
        let config = GamenightConfig::from_lookup(lookup(&[
            (STORAGE_VAR, "sqlite"),
            (DATABASE_VAR, "/tmp/meetups.db"),
        ]))
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: "/tmp/meetups.db".into()
            }
        );
    }

    #[test]
    fn test_from_lookup_unknown_backend_returns_config_error() {
        let result = GamenightConfig::from_lookup(lookup(&[(STORAGE_VAR, "postgres")]));
        match result {
            Err(GamenightError::Config(message)) => assert!(message.contains("postgres")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_open_memory_and_in_memory_sqlite() {
        assert_eq!(StorageConfig::Memory.open().unwrap().name(), "memory");

        let sqlite = StorageConfig::Sqlite {
            path: ":memory:".into(),
        };
        assert_eq!(sqlite.open().unwrap().name(), "sqlite");
    }
}
