//! SQLite-backed storage for users and chirps.
//!
//! A single connection is shared behind a mutex. Every operation takes the
//! lock for the duration of its statements only, so callers never hold it
//! across an `.await`.

mod schema;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use serde::Serialize;
use uuid::Uuid;

pub use self::schema::SCHEMA_VERSION;

/// Storage error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// SQLite error (open, query, constraint violation).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
}

/// A persisted chirp. The body has already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

/// Handle to the Chirpy database. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Required for ON DELETE CASCADE; off by default in SQLite.
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a new user with a fresh id.
    pub fn create_user(&self, email: &str) -> Result<User> {
        let now = now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
        };

        self.conn.lock().execute(
            "INSERT INTO users (id, created_at, updated_at, email) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                format_timestamp(&user.created_at),
                format_timestamp(&user.updated_at),
                user.email,
            ],
        )?;

        Ok(user)
    }

    /// Delete every user. Their chirps go with them.
    ///
    /// Returns the number of users removed.
    pub fn delete_all_users(&self) -> Result<usize> {
        let deleted = self.conn.lock().execute("DELETE FROM users", [])?;
        Ok(deleted)
    }

    /// Insert a chirp owned by `user_id`.
    ///
    /// Fails with a constraint error if the user does not exist.
    pub fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<Chirp> {
        let now = now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };

        self.conn.lock().execute(
            "INSERT INTO chirps (id, created_at, updated_at, body, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                chirp.id.to_string(),
                format_timestamp(&chirp.created_at),
                format_timestamp(&chirp.updated_at),
                chirp.body,
                chirp.user_id.to_string(),
            ],
        )?;

        Ok(chirp)
    }

    /// Look up a single chirp.
    pub fn get_chirp_by_id(&self, id: Uuid) -> Result<Option<Chirp>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            WHERE id = ?1",
        )?;

        let mut rows = stmt.query_map([id.to_string()], chirp_from_row)?;
        let chirp = rows.next().transpose()?;

        Ok(chirp)
    }

    /// All chirps, oldest first. Chirps created in the same instant keep
    /// insertion order.
    pub fn get_chirps(&self) -> Result<Vec<Chirp>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            ORDER BY created_at ASC, rowid ASC",
        )?;

        let chirps = stmt
            .query_map([], chirp_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(chirps)
    }
}

/// Current time at the precision we store.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn chirp_from_row(row: &Row<'_>) -> rusqlite::Result<Chirp> {
    Ok(Chirp {
        id: uuid_column(row, 0)?,
        created_at: timestamp_column(row, 1)?,
        updated_at: timestamp_column(row, 2)?,
        body: row.get(3)?,
        user_id: uuid_column(row, 4)?,
    })
}

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let value: String = row.get(idx)?;
    Uuid::parse_str(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
