use anyhow::Result;

use crate::config::MnemoConfig;
use crate::memory::search::SearchRequest;
use crate::memory::store::MemoryStore;

/// Run a one-off search from the terminal.
pub fn search(
    config: &MnemoConfig,
    query: &str,
    limit: Option<usize>,
    keywords: &[String],
) -> Result<()> {
    let store = MemoryStore::open(
        config.resolved_db_path(),
        config.resolved_content_root(),
    )?;

    let request = SearchRequest {
        query: query.to_string(),
        boost_keywords: keywords.to_vec(),
        limit: limit.unwrap_or(config.search.default_limit),
        summary_weight: config.search.summary_weight,
        keyword_weight: config.search.keyword_weight,
        keyword_boost: config.search.keyword_boost,
    };

    let response = store.search(&request)?;

    if response.hits.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!(
        "Found {} result(s) ({} candidate(s) considered)\n",
        response.hits.len(),
        response.total_matched
    );

    for (i, hit) in response.hits.iter().enumerate() {
        println!(
            "  {}. [{}] {} (score: {:.4}, keyword matches: {})",
            i + 1,
            hit.id,
            hit.summary,
            hit.final_score,
            hit.matched_keywords,
        );
        println!("     {}", hit.content_path);
        println!();
    }

    Ok(())
}
