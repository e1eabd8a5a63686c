/// SQLite-backed durable store for users and moods.
///
/// The `users.external_user_id` column carries a UNIQUE index, so duplicate
/// registrations are rejected by the database itself even when several
/// processes share one file. Timestamps are stored as Unix nanoseconds (UTC).
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use moodline_core::{Mood, StoreError, User};

use crate::store::{MoodStore, UserStore};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id               TEXT PRIMARY KEY,
        external_user_id TEXT NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_users_external_user_id
        ON users(external_user_id);
    CREATE TABLE IF NOT EXISTS moods (
        id               TEXT PRIMARY KEY,
        external_user_id TEXT NOT NULL,
        value            INTEGER NOT NULL,
        timestamp_ns     INTEGER NOT NULL
    );";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("Failed to open SQLite mood database")?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to enable WAL journal")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize mood schema")?;

        info!(path = %path.display(), "SqliteStore opened");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create_user(&self, user: User) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let inserted = conn.execute(
            "INSERT INTO users (id, external_user_id) VALUES (?1, ?2)",
            params![user.id.to_string(), user.external_user_id],
        );
        match inserted {
            Ok(_) => {
                debug!(user = %user.external_user_id, "Inserted user");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Duplicate {
                    external_user_id: user.external_user_id,
                })
            }
            Err(e) => Err(StoreError::backend(e)),
        }
    }

    async fn find_all_users(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT id, external_user_id FROM users ORDER BY rowid")
            .map_err(StoreError::backend)?;
        let users = stmt
            .query_map([], row_to_user)
            .map_err(StoreError::backend)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::backend)?;
        Ok(users)
    }
}

#[async_trait]
impl MoodStore for SqliteStore {
    async fn create_mood(&self, mood: Mood) -> Result<(), StoreError> {
        let timestamp_ns = mood
            .timestamp
            .timestamp_nanos_opt()
            .ok_or_else(|| StoreError::backend(format!("timestamp out of range: {}", mood.timestamp)))?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO moods (id, external_user_id, value, timestamp_ns) VALUES (?1, ?2, ?3, ?4)",
            params![mood.id.to_string(), mood.external_user_id, mood.value, timestamp_ns],
        )
        .map_err(StoreError::backend)?;
        debug!(user = %mood.external_user_id, value = mood.value, "Inserted mood");
        Ok(())
    }

    async fn find_all_moods(&self) -> Result<Vec<Mood>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT id, external_user_id, value, timestamp_ns FROM moods ORDER BY rowid")
            .map_err(StoreError::backend)?;
        let moods = stmt
            .query_map([], row_to_mood)
            .map_err(StoreError::backend)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::backend)?;
        Ok(moods)
    }
}

// ---------------------------------------------------------------------------
// Row deserialization helpers
// ---------------------------------------------------------------------------

fn parse_uuid(raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    Ok(User {
        id: parse_uuid(&id)?,
        external_user_id: row.get(1)?,
    })
}

fn row_to_mood(row: &rusqlite::Row) -> rusqlite::Result<Mood> {
    let id: String = row.get(0)?;
    let timestamp = DateTime::<Utc>::from_timestamp_nanos(row.get(3)?);
    Ok(Mood {
        id: parse_uuid(&id)?,
        external_user_id: row.get(1)?,
        value: row.get(2)?,
        timestamp,
    })
}
