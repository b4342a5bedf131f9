pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the mnemo database at the given path, with schema
/// initialized and migrations applied.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // Enable WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Enable foreign keys — keyword rows cascade with their memory
    conn.pragma_update(None, "foreign_keys", "ON")?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open an in-memory database for testing.
#[cfg(test)]
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;
    Ok(conn)
}

/// Snapshot of database health for `mnemo doctor`.
#[derive(Debug)]
pub struct HealthReport {
    pub schema_version: u32,
    pub memory_count: i64,
    pub keyword_count: i64,
    pub index_count: i64,
    pub content_root: Option<String>,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

impl HealthReport {
    /// The lexical index should carry exactly one entry per memory row.
    pub fn index_in_sync(&self) -> bool {
        self.memory_count == self.index_count
    }
}

/// Run diagnostics: row counts, index sync, and SQLite's integrity check.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let schema_version = migrations::get_schema_version(conn)?;
    let memory_count: i64 = conn.query_row("SELECT COUNT(*) FROM memories", [], |r| r.get(0))?;
    let keyword_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM memory_keywords", [], |r| r.get(0))?;
    let index_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM memories_fts", [], |r| r.get(0))?;
    let content_root = migrations::get_content_root(conn)?;

    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |r| r.get(0))?;
    let integrity_ok = integrity_details == "ok";

    Ok(HealthReport {
        schema_version,
        memory_count,
        keyword_count,
        index_count,
        content_root,
        integrity_ok,
        integrity_details,
    })
}
