//! SQL DDL for all mnemo tables.
//!
//! Defines the `memories`, `memory_keywords`, `memories_fts` (FTS5), and
//! `schema_meta` tables. All DDL uses `IF NOT EXISTS` for idempotent
//! initialization.

use rusqlite::Connection;

/// All schema DDL statements for mnemo's core tables.
///
/// `memories.id` is the SQLite rowid; the FTS5 table reuses it as its own
/// rowid so index entries are keyed by memory id.
const SCHEMA_SQL: &str = r#"
-- Memory metadata. content_path points into the content root on disk.
CREATE TABLE IF NOT EXISTS memories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content_path TEXT NOT NULL UNIQUE,
    summary TEXT NOT NULL CHECK(length(summary) > 0),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_memories_created_at ON memories(created_at DESC);

-- Normalized keyword associations, cascade-deleted with the owning memory.
CREATE TABLE IF NOT EXISTS memory_keywords (
    memory_id INTEGER NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
    keyword TEXT NOT NULL CHECK(length(keyword) > 0),
    PRIMARY KEY (memory_id, keyword)
);

CREATE INDEX IF NOT EXISTS idx_memory_keywords_keyword ON memory_keywords(keyword);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// FTS5 virtual table must be created in its own batch (fts5 syntax).
///
/// One row per live memory, rowid = memory id. `keywords` holds the
/// space-joined normalized keyword set so bm25() can weight it separately
/// from `summary`.
const FTS_TABLE_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
    summary,
    keywords
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(FTS_TABLE_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"memories".to_string()));
        assert!(tables.contains(&"memory_keywords".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));

        // Verify the FTS5 virtual table accepts a MATCH query
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM memories_fts WHERE memories_fts MATCH '\"anything\"'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn keyword_rows_cascade_with_memory() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO memories (content_path, summary, created_at) VALUES ('a.md', 's', 't')",
            [],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO memory_keywords (memory_id, keyword) VALUES (?1, 'rust')",
            [id],
        )
        .unwrap();

        conn.execute("DELETE FROM memories WHERE id = ?1", [id]).unwrap();

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM memory_keywords", [], |r| r.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
