//! Lexical index synchronization.
//!
//! `memories_fts` is a shadow FTS5 document per memory — summary in one
//! column, the space-joined keyword set in the other — keyed by the memory's
//! rowid. It is never mutated on its own: every function here runs inside the
//! entity transaction that changes the corresponding row, so the index can
//! not be observed out of step with committed metadata.
//!
//! Updates always delete the old document and insert a fresh snapshot; there
//! is no in-place editing of either column.

use rusqlite::{params, Connection};

/// Insert the index document for a new memory.
pub fn insert_entry(
    conn: &Connection,
    memory_id: i64,
    summary: &str,
    keywords: &[String],
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO memories_fts (rowid, summary, keywords) VALUES (?1, ?2, ?3)",
        params![memory_id, summary, keywords.join(" ")],
    )?;
    Ok(())
}

/// Remove the index document for a memory.
pub fn delete_entry(conn: &Connection, memory_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM memories_fts WHERE rowid = ?1",
        params![memory_id],
    )?;
    Ok(())
}

/// Replace the index document with a snapshot of the post-update state.
pub fn refresh_entry(
    conn: &Connection,
    memory_id: i64,
    summary: &str,
    keywords: &[String],
) -> rusqlite::Result<()> {
    delete_entry(conn, memory_id)?;
    insert_entry(conn, memory_id, summary, keywords)
}

/// Merge the FTS5 b-tree segments. Cheap on small indexes; always succeeds.
pub fn optimize(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO memories_fts (memories_fts) VALUES ('optimize')",
        [],
    )?;
    Ok(())
}

/// Repair sweep: drop every index document and rebuild from the entity
/// tables. Returns the number of rebuilt entries.
///
/// For use after a crash or manual database surgery leaves the index out of
/// step with `memories` (`mnemo doctor` detects this, `mnemo reindex` runs it).
pub fn rebuild(conn: &mut Connection) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM memories_fts", [])?;
    let rebuilt = tx.execute(
        "INSERT INTO memories_fts (rowid, summary, keywords)
         SELECT m.id, m.summary,
                COALESCE((SELECT group_concat(k.keyword, ' ')
                          FROM memory_keywords k
                          WHERE k.memory_id = m.id), '')
         FROM memories m",
        [],
    )?;

    tx.commit()?;
    tracing::info!(entries = rebuilt, "lexical index rebuilt");
    Ok(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn fts_row(conn: &Connection, id: i64) -> Option<(String, String)> {
        conn.query_row(
            "SELECT summary, keywords FROM memories_fts WHERE rowid = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .ok()
    }

    #[test]
    fn insert_and_refresh_snapshot() {
        let conn = db::open_memory_database().unwrap();

        insert_entry(&conn, 7, "first summary", &["a".into(), "b".into()]).unwrap();
        assert_eq!(
            fts_row(&conn, 7),
            Some(("first summary".into(), "a b".into()))
        );

        refresh_entry(&conn, 7, "second summary", &["c".into()]).unwrap();
        assert_eq!(fts_row(&conn, 7), Some(("second summary".into(), "c".into())));

        delete_entry(&conn, 7).unwrap();
        assert_eq!(fts_row(&conn, 7), None);
    }

    #[test]
    fn optimize_always_succeeds() {
        let conn = db::open_memory_database().unwrap();
        optimize(&conn).unwrap();
        insert_entry(&conn, 1, "something", &[]).unwrap();
        optimize(&conn).unwrap();
    }

    #[test]
    fn rebuild_restores_missing_entries() {
        let mut conn = db::open_memory_database().unwrap();

        conn.execute(
            "INSERT INTO memories (content_path, summary, created_at) VALUES ('a.md', 'alpha notes', 't')",
            [],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO memory_keywords (memory_id, keyword) VALUES (?1, 'alpha')",
            params![id],
        )
        .unwrap();

        // Index was never written — rebuild recovers it
        let rebuilt = rebuild(&mut conn).unwrap();
        assert_eq!(rebuilt, 1);
        assert_eq!(fts_row(&conn, id), Some(("alpha notes".into(), "alpha".into())));
    }
}
