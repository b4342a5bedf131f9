//! Write and read paths for memory records.
//!
//! [`MemoryStore`] is the explicit handle owning the SQLite connection and
//! the content store — every component receives it rather than reaching for
//! shared process state. Mutations follow one shape: validate first (no
//! partial effects on bad input), write the content file, then run a single
//! transaction covering the row, its keyword associations, and the lexical
//! index entry. If that transaction fails after the content write, the file
//! is left orphaned on disk; the database never references it.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::content::{ContentRead, ContentStore};
use crate::error::{MemoryError, Result};
use crate::memory::index;
use crate::memory::types::{
    normalize_keywords, Memory, MAX_KEYWORDS, MAX_SUMMARY_CHARS, MIN_SUMMARY_CHARS,
};

/// Result returned from insert and update operations.
#[derive(Debug, Serialize)]
pub struct StoredMemory {
    /// Integer id of the stored memory.
    pub id: i64,
    /// Final path of the content file.
    pub content_path: String,
}

/// Owns the database connection and the content root.
pub struct MemoryStore {
    conn: Connection,
    content: ContentStore,
}

impl MemoryStore {
    /// Open the store at the given database path and content root, creating
    /// both as needed. Records the content root so `doctor` can flag a
    /// later mismatch.
    pub fn open(
        db_path: impl AsRef<Path>,
        content_root: impl Into<PathBuf>,
    ) -> anyhow::Result<Self> {
        let conn = crate::db::open_database(db_path)?;
        let content = ContentStore::open(content_root)?;

        if crate::db::migrations::get_content_root(&conn)?.is_none() {
            crate::db::migrations::set_content_root(
                &conn,
                &content.root().to_string_lossy(),
            )?;
        }

        Ok(Self { conn, content })
    }

    /// Assemble a store from already-open parts.
    pub fn new(conn: Connection, content: ContentStore) -> Self {
        Self { conn, content }
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Store a new memory: content file first, then row + keywords + index
    /// entry in one transaction.
    pub fn insert(
        &mut self,
        content: &str,
        summary: &str,
        keywords: &[String],
    ) -> Result<StoredMemory> {
        if content.is_empty() {
            return Err(MemoryError::validation("content must not be empty"));
        }
        validate_summary(summary)?;
        let keywords = normalize_keywords(keywords);
        validate_keyword_count(&keywords)?;

        let now = chrono::Utc::now();
        let (path, bytes) = self.content.assign_and_write(summary, content, now)?;
        let content_path = path.to_string_lossy().into_owned();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO memories (content_path, summary, created_at) VALUES (?1, ?2, ?3)",
            params![content_path, summary, now.to_rfc3339()],
        )?;
        let id = tx.last_insert_rowid();
        insert_keyword_rows(&tx, id, &keywords)?;
        index::insert_entry(&tx, id, summary, &keywords)?;
        tx.commit()?;

        tracing::info!(id, path = %content_path, bytes, "memory stored");
        Ok(StoredMemory { id, content_path })
    }

    /// Update an existing memory. `content` overwrites the file at its
    /// existing path; `summary` and `keywords` replace metadata and refresh
    /// the modified marker. `keywords: Some(&[])` clears the set,
    /// `keywords: None` leaves it untouched.
    pub fn update(
        &mut self,
        id: i64,
        content: Option<&str>,
        summary: Option<&str>,
        keywords: Option<&[String]>,
    ) -> Result<StoredMemory> {
        if content.is_none() && summary.is_none() && keywords.is_none() {
            return Err(MemoryError::validation(
                "at least one of content, summary, keywords must be given",
            ));
        }
        if let Some(c) = content {
            if c.is_empty() {
                return Err(MemoryError::validation("content must not be empty"));
            }
        }
        if let Some(s) = summary {
            validate_summary(s)?;
        }
        let keywords = keywords.map(normalize_keywords);
        if let Some(ref kws) = keywords {
            validate_keyword_count(kws)?;
        }

        let existing = self
            .get_row(id)?
            .ok_or(MemoryError::NotFound(id))?;

        // Content is overwritten at the already-assigned path, before the
        // metadata transaction (same ordering as insert).
        if let Some(c) = content {
            self.content
                .overwrite(Path::new(&existing.content_path), c)?;
        }

        if summary.is_some() || keywords.is_some() {
            let new_summary = summary.unwrap_or(&existing.summary);
            let now = chrono::Utc::now().to_rfc3339();

            let tx = self.conn.transaction()?;
            let rows = tx.execute(
                "UPDATE memories SET summary = ?1, created_at = ?2 WHERE id = ?3",
                params![new_summary, now, id],
            )?;
            if rows != 1 {
                return Err(MemoryError::Inconsistent(format!(
                    "memory {id} passed the existence check but the update touched {rows} rows"
                )));
            }

            let new_keywords = match keywords {
                Some(kws) => {
                    tx.execute(
                        "DELETE FROM memory_keywords WHERE memory_id = ?1",
                        params![id],
                    )?;
                    insert_keyword_rows(&tx, id, &kws)?;
                    kws
                }
                None => load_keywords(&tx, id)?,
            };

            index::refresh_entry(&tx, id, new_summary, &new_keywords)?;
            tx.commit()?;
        }

        tracing::info!(id, "memory updated");
        Ok(StoredMemory {
            id,
            content_path: existing.content_path,
        })
    }

    /// Delete a memory row, its keyword associations (FK cascade), and its
    /// index entry. The content file is left on disk. Returns whether a row
    /// was removed.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let rows = tx.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Ok(false);
        }
        index::delete_entry(&tx, id)?;
        tx.commit()?;

        tracing::info!(id, "memory deleted");
        Ok(true)
    }

    /// Merge the lexical index segments. Always reports success.
    pub fn optimize(&self) -> Result<()> {
        index::optimize(&self.conn)?;
        Ok(())
    }

    /// Rebuild every lexical index entry from the entity tables.
    pub fn rebuild_index(&mut self) -> Result<usize> {
        Ok(index::rebuild(&mut self.conn)?)
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Fetch a memory with its keyword set, or `None`.
    pub fn get(&self, id: i64) -> Result<Option<Memory>> {
        let row = self.get_row(id)?;
        match row {
            Some(mut mem) => {
                mem.keywords = load_keywords(&self.conn, id)?;
                Ok(Some(mem))
            }
            None => Ok(None),
        }
    }

    /// Page of memories ordered most-recently-written first.
    pub fn list(&self, limit: usize, offset: usize) -> Result<Vec<Memory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, content_path, summary, created_at FROM memories
             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let mut memories = stmt
            .query_map(params![limit as i64, offset as i64], |row| {
                Ok(Memory {
                    id: row.get(0)?,
                    content_path: row.get(1)?,
                    summary: row.get(2)?,
                    keywords: Vec::new(),
                    created_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let ids: Vec<i64> = memories.iter().map(|m| m.id).collect();
        let mut keyword_sets = load_keyword_sets(&self.conn, &ids)?;
        for mem in &mut memories {
            if let Some(kws) = keyword_sets.remove(&mem.id) {
                mem.keywords = kws;
            }
        }

        Ok(memories)
    }

    /// Total live record count, for pagination metadata.
    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM memories", [], |r| r.get(0))?)
    }

    /// Ranked lexical search. See [`crate::memory::search`].
    pub fn search(
        &self,
        request: &crate::memory::search::SearchRequest,
    ) -> Result<crate::memory::search::SearchResponse> {
        crate::memory::search::search(&self.conn, request)
    }

    /// Capped read of a path taken from a memory row.
    pub fn read_content(&self, path: &str, limit: u64) -> Result<ContentRead> {
        self.content.read_capped(Path::new(path), limit)
    }

    /// Capped read of a caller-supplied path; rejects paths outside the
    /// content root.
    pub fn read_raw(&self, path: &str, limit: u64) -> Result<ContentRead> {
        let resolved = self.content.resolve_within_root(Path::new(path))?;
        self.content.read_capped(&resolved, limit)
    }

    fn get_row(&self, id: i64) -> Result<Option<Memory>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, content_path, summary, created_at FROM memories WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Memory {
                        id: row.get(0)?,
                        content_path: row.get(1)?,
                        summary: row.get(2)?,
                        keywords: Vec::new(),
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }
}

fn validate_summary(summary: &str) -> Result<()> {
    let chars = summary.chars().count();
    if !(MIN_SUMMARY_CHARS..=MAX_SUMMARY_CHARS).contains(&chars) {
        return Err(MemoryError::validation(format!(
            "summary must be {MIN_SUMMARY_CHARS}-{MAX_SUMMARY_CHARS} characters, got {chars}"
        )));
    }
    Ok(())
}

fn validate_keyword_count(keywords: &[String]) -> Result<()> {
    if keywords.len() > MAX_KEYWORDS {
        return Err(MemoryError::validation(format!(
            "at most {MAX_KEYWORDS} keywords allowed, got {}",
            keywords.len()
        )));
    }
    Ok(())
}

fn insert_keyword_rows(conn: &Connection, id: i64, keywords: &[String]) -> Result<()> {
    let mut stmt =
        conn.prepare("INSERT INTO memory_keywords (memory_id, keyword) VALUES (?1, ?2)")?;
    for kw in keywords {
        stmt.execute(params![id, kw])?;
    }
    Ok(())
}

/// Keyword set for one memory, sorted.
fn load_keywords(conn: &Connection, id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT keyword FROM memory_keywords WHERE memory_id = ?1 ORDER BY keyword",
    )?;
    let keywords = stmt
        .query_map(params![id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(keywords)
}

/// Batch-fetch keyword sets for a list of memory ids.
pub(crate) fn load_keyword_sets(
    conn: &Connection,
    ids: &[i64],
) -> Result<HashMap<i64, Vec<String>>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    // Build a parameterized IN clause
    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT memory_id, keyword FROM memory_keywords WHERE memory_id IN ({}) ORDER BY keyword",
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let sql_params: Vec<&dyn rusqlite::types::ToSql> =
        ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();

    let rows = stmt
        .query_map(sql_params.as_slice(), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut map: HashMap<i64, Vec<String>> = HashMap::new();
    for (id, keyword) in rows {
        map.entry(id).or_default().push(keyword);
    }
    Ok(map)
}
