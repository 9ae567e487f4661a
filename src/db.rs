use anyhow::{Context, Result};
use rusqlite::{ffi, Connection, ErrorCode};
use std::path::Path;

/// Store-level failures that callers need to tell apart from plain I/O or SQL errors.
///
/// Persistence functions return `anyhow::Result`; these travel inside it and
/// are recovered with `downcast_ref` at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} '{key}' already exists")]
    Duplicate { entity: &'static str, key: String },

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
}

/// Open (or create) a database file and make sure every table exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    setup_database(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Paralympics: regions keyed by NOC code
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS region (
            NOC TEXT PRIMARY KEY NOT NULL,
            region TEXT NOT NULL,
            notes TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Paralympics: games (events)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS event (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            year INTEGER NOT NULL,
            country TEXT NOT NULL,
            host TEXT NOT NULL,
            NOC TEXT,
            start_date TEXT,
            end_date TEXT,
            countries INTEGER,
            events INTEGER,
            sports INTEGER,
            participants INTEGER,
            highlights TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Iris: measurements + users
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS iris (
            rowid INTEGER PRIMARY KEY AUTOINCREMENT,
            sepal_length REAL NOT NULL,
            sepal_width REAL NOT NULL,
            petal_length REAL NOT NULL,
            petal_width REAL NOT NULL,
            species TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        r#"CREATE TABLE IF NOT EXISTS "user" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL
        )"#,
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_event_year ON event(year)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_event_noc ON event(NOC)",
        [],
    )?;

    Ok(())
}

/// Row count for one of the known tables.
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let sql = match table {
        "region" => "SELECT COUNT(*) FROM region",
        "event" => "SELECT COUNT(*) FROM event",
        "iris" => "SELECT COUNT(*) FROM iris",
        "user" => r#"SELECT COUNT(*) FROM "user""#,
        other => anyhow::bail!("Unknown table: {}", other),
    };
    let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

/// True when an insert failed on a UNIQUE or PRIMARY KEY constraint.
/// NOT NULL and CHECK failures are not duplicates.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}
