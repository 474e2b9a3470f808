//! SQLite schema for users and chirps.

use rusqlite::{Connection, Result};

/// Current schema version. Increment when making breaking changes.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
///
/// Creates all tables on a fresh database. Calling it again on an
/// initialized database is a no-op.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}

/// Get the current schema version (0 if not initialized).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])?;
    Ok(())
}

/// Create all tables for a fresh database.
///
/// Ids are UUID strings and timestamps are fixed-width RFC 3339 strings, so
/// ordering by `created_at` as text is chronological.
fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS chirps (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            body TEXT NOT NULL,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_chirps_created_at ON chirps(created_at);
        CREATE INDEX IF NOT EXISTS idx_chirps_user_id ON chirps(user_id);
        "#,
    )?;

    Ok(())
}
