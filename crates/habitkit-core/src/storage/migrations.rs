//! Database schema migrations for habitkit.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema
/// version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// v1: users, habits, and entries tables with their lookup indexes.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            external_id TEXT NOT NULL UNIQUE,
            email       TEXT,
            name        TEXT,
            timezone    TEXT NOT NULL DEFAULT 'UTC',
            is_active   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habits (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            title       TEXT NOT NULL,
            description TEXT,
            category    TEXT,
            color       TEXT NOT NULL,
            goal_type   TEXT NOT NULL DEFAULT 'binary',
            goal_target REAL,
            unit        TEXT,
            active      INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entries (
            id          TEXT PRIMARY KEY,
            habit_id    TEXT NOT NULL,
            user_id     TEXT NOT NULL,
            entry_date  TEXT NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            value       REAL,
            notes       TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id);
        CREATE INDEX IF NOT EXISTS idx_habits_user_active ON habits(user_id, active);
        CREATE INDEX IF NOT EXISTS idx_entries_habit ON entries(habit_id);
        CREATE INDEX IF NOT EXISTS idx_entries_user ON entries(user_id);
        CREATE INDEX IF NOT EXISTS idx_entries_user_date ON entries(user_id, entry_date);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_habit_date ON entries(habit_id, entry_date);",
    )?;

    set_schema_version(conn, 1)
}

/// v2: badges table.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS badges (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            name        TEXT NOT NULL,
            description TEXT,
            icon        TEXT,
            metadata    TEXT,
            awarded_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_badges_user ON badges(user_id);",
    )?;

    set_schema_version(conn, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
    }

    #[test]
    fn migrations_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let conn = Connection::open(&path).unwrap();
            migrate(&conn).unwrap();
        }
        let conn = Connection::open(&path).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
    }

    #[test]
    fn unique_entry_per_habit_and_date() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute(
            "INSERT INTO entries (id, habit_id, user_id, entry_date, completed, created_at, updated_at)
             VALUES ('e1', 'h1', 'u1', '2024-06-01', 1, '', '')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO entries (id, habit_id, user_id, entry_date, completed, created_at, updated_at)
             VALUES ('e2', 'h1', 'u1', '2024-06-01', 0, '', '')",
            [],
        );
        assert!(dup.is_err());
    }
}
