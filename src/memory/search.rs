//! Lexical search and ranking.
//!
//! Retrieval runs in two stages. Stage one asks FTS5 for candidates whose
//! summary/keyword document matches the sanitized query, scored with
//! per-column bm25 weights — lower is more relevant. Stage two counts how
//! many of the caller's boost keywords each candidate actually carries and
//! subtracts a per-match credit, so equally relevant memories with better
//! keyword overlap sort ahead. The candidate pool is twice the requested
//! limit to give the boost room to reorder.

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::Result;
use crate::memory::store::load_keyword_sets;
use crate::memory::types::normalize_keywords;

/// Stage-1 overfetch multiplier.
const CANDIDATE_FACTOR: usize = 2;

/// A ranked search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Natural-language query, matched against summaries and keywords.
    pub query: String,
    /// Keywords that bias ranking; they never filter the candidate set.
    pub boost_keywords: Vec<String>,
    /// Maximum hits returned.
    pub limit: usize,
    /// bm25 weight of the summary column.
    pub summary_weight: f64,
    /// bm25 weight of the aggregated-keyword column.
    pub keyword_weight: f64,
    /// Score credit per matched boost keyword.
    pub keyword_boost: f64,
}

/// A single ranked hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub content_path: String,
    pub summary: String,
    /// Weighted bm25 score; lower is more relevant.
    pub relevance: f64,
    /// Distinct boost keywords present on this memory.
    pub matched_keywords: usize,
    /// `relevance − keyword_boost × matched_keywords`, the sort key.
    pub final_score: f64,
}

/// Ranked hits plus the stage-1 candidate count.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub total_matched: usize,
}

/// Run a ranked search over the lexical index.
pub fn search(conn: &Connection, request: &SearchRequest) -> Result<SearchResponse> {
    let sanitized = sanitize_query(&request.query);
    let expr = match_expression(&sanitized);
    if expr.is_empty() {
        return Ok(SearchResponse {
            hits: Vec::new(),
            total_matched: 0,
        });
    }

    let candidate_limit = request.limit.saturating_mul(CANDIDATE_FACTOR);
    let mut stmt = conn.prepare(
        "SELECT m.id, m.content_path, m.summary,
                bm25(memories_fts, ?1, ?2) AS score
         FROM memories_fts
         JOIN memories m ON m.id = memories_fts.rowid
         WHERE memories_fts MATCH ?3
         ORDER BY score LIMIT ?4",
    )?;
    let mut hits: Vec<SearchHit> = stmt
        .query_map(
            params![
                request.summary_weight,
                request.keyword_weight,
                expr,
                candidate_limit as i64
            ],
            |row| {
                let relevance: f64 = row.get(3)?;
                Ok(SearchHit {
                    id: row.get(0)?,
                    content_path: row.get(1)?,
                    summary: row.get(2)?,
                    relevance,
                    matched_keywords: 0,
                    final_score: relevance,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total_matched = hits.len();

    // Boost pass: count distinct boost keywords present on each candidate.
    let boost = normalize_keywords(&request.boost_keywords);
    if !boost.is_empty() {
        let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
        let keyword_sets = load_keyword_sets(conn, &ids)?;

        for hit in &mut hits {
            let owned = keyword_sets.get(&hit.id);
            hit.matched_keywords = boost
                .iter()
                .filter(|b| owned.is_some_and(|kws| kws.contains(b)))
                .count();
            hit.final_score =
                hit.relevance - request.keyword_boost * hit.matched_keywords as f64;
        }
    }

    hits.sort_by(|a, b| {
        a.final_score
            .partial_cmp(&b.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(request.limit);

    tracing::debug!(
        query = %request.query,
        candidates = total_matched,
        returned = hits.len(),
        "search complete"
    );

    Ok(SearchResponse {
        hits,
        total_matched,
    })
}

/// Make a raw query safe to embed in a lexical match expression: double
/// embedded quotes, blank out grouping characters, collapse whitespace, trim.
///
/// The natural-language content is left intact — this is injection safety,
/// not semantic rewriting.
pub fn sanitize_query(raw: &str) -> String {
    let doubled = raw.replace('"', "\"\"");
    let stripped: String = doubled
        .chars()
        .map(|c| match c {
            '(' | ')' | '[' | ']' | '{' | '}' => ' ',
            _ => c,
        })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the FTS5 MATCH expression: each sanitized token wrapped in double
/// quotes (implicit AND), tokens with nothing searchable dropped.
fn match_expression(sanitized: &str) -> String {
    sanitized
        .split_whitespace()
        .filter(|w| w.chars().any(|c| c.is_alphanumeric()))
        .map(|w| format!("\"{w}\""))
        .collect::<Vec<_>>()
        .join(" ")
}
