//! SQLite storage implementation.
//!
//! One database file holds every local table:
//!
//! ```text
//! schema_meta        # single row, schema version
//! play_sessions      # session token -> player name
//! session_progress   # (session token, story) -> current node, unique
//! play_outcomes      # append-only endings reached
//! story_ownership    # story -> owning user, unique on story
//! story_ratings      # (user, story) -> score + comment, unique
//! ```
//!
//! Every trait method runs a single statement under the connection mutex,
//! so each write is atomic and the guard is never held across an await.

mod outcome;
mod ownership;
mod progress;
mod rating;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::health::StoreHealth;

const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS schema_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS play_sessions (
  session_token TEXT PRIMARY KEY,
  player_name TEXT NOT NULL,
  updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS session_progress (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  session_token TEXT NOT NULL,
  story_id TEXT NOT NULL,
  node_id TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  UNIQUE (session_token, story_id)
);

CREATE TABLE IF NOT EXISTS play_outcomes (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id TEXT,
  story_id TEXT NOT NULL,
  ending_node_id TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_play_outcomes_story ON play_outcomes (story_id);
CREATE INDEX IF NOT EXISTS idx_play_outcomes_user ON play_outcomes (user_id);

CREATE TABLE IF NOT EXISTS story_ownership (
  story_id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_story_ownership_user ON story_ownership (user_id);

CREATE TABLE IF NOT EXISTS story_ratings (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id TEXT NOT NULL,
  story_id TEXT NOT NULL,
  score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 5),
  comment TEXT,
  updated_at TEXT NOT NULL,
  UNIQUE (user_id, story_id)
);
"#;

/// SQLite-backed implementation of every store trait.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let conn = Connection::open(path).map_err(|e| StorageError::sqlite("open", e))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| StorageError::sqlite("configure", e))?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .map_err(|e| StorageError::sqlite("configure", e))?;

        let store = Self::from_connection(conn)?;
        debug!(path = %path.display(), "Opened database");
        Ok(store)
    }

    /// Create an in-memory store (for tests and one-off tooling).
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::sqlite("open", e))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> StorageResult<()> {
        self.with_conn("migrate", |conn| {
            conn.execute_batch(SCHEMA)?;
            conn.query_row(
                "SELECT schema_version FROM schema_meta WHERE id = 1",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()
        })
        .and_then(|found| match found {
            Some(SCHEMA_VERSION) => Ok(()),
            Some(found) => Err(StorageError::IncompatibleSchema {
                expected: SCHEMA_VERSION,
                found,
            }),
            None => self.with_conn("migrate", |conn| {
                conn.execute(
                    "INSERT INTO schema_meta (id, schema_version) VALUES (1, ?1)",
                    params![SCHEMA_VERSION],
                )
                .map(|_| ())
            }),
        })
    }

    /// Run `op` against the connection, tagging failures with `operation`.
    fn with_conn<T>(
        &self,
        operation: &'static str,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StorageResult<T> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        op(&conn).map_err(|e| StorageError::sqlite(operation, e))
    }
}

#[async_trait]
impl StoreHealth for SqliteStore {
    async fn ping(&self) -> StorageResult<()> {
        self.with_conn("ping", |conn| conn.query_row("SELECT 1", [], |_| Ok(())))
    }
}
