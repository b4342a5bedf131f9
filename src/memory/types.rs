//! Core record types and keyword normalization.

use serde::{Deserialize, Serialize};

/// Upper bound on distinct keywords per memory.
pub const MAX_KEYWORDS: usize = 10;

/// Summary length bounds, in characters.
pub const MIN_SUMMARY_CHARS: usize = 1;
pub const MAX_SUMMARY_CHARS: usize = 1000;

/// A memory record, matching the `memories` table schema plus its
/// keyword associations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Integer primary key, assigned at creation, immutable.
    pub id: i64,
    /// Path of the content file under the content root.
    pub content_path: String,
    /// Short description, 1–1000 characters.
    pub summary: String,
    /// Normalized keyword set, sorted, at most [`MAX_KEYWORDS`] entries.
    pub keywords: Vec<String>,
    /// RFC 3339 timestamp; set at creation, refreshed on summary/keyword edits.
    pub created_at: String,
}

/// Normalize a raw keyword list: trim, lowercase, drop empties, and
/// deduplicate preserving first-seen order.
///
/// Idempotent — normalizing an already-normalized list returns it unchanged.
pub fn normalize_keywords(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for kw in raw {
        let norm = kw.trim().to_lowercase();
        if norm.is_empty() || out.contains(&norm) {
            continue;
        }
        out.push(norm);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalization_trims_lowercases_dedupes() {
        let raw = strs(&["Foo", " foo ", "BAR"]);
        assert_eq!(normalize_keywords(&raw), strs(&["foo", "bar"]));
    }

    #[test]
    fn normalization_drops_empty_tokens() {
        let raw = strs(&["", "   ", "ok"]);
        assert_eq!(normalize_keywords(&raw), strs(&["ok"]));
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = strs(&["Rust", "  SQLITE", "rust", "fts5 "]);
        let once = normalize_keywords(&raw);
        let twice = normalize_keywords(&once);
        assert_eq!(once, twice);
        assert_eq!(once, strs(&["rust", "sqlite", "fts5"]));
    }
}
