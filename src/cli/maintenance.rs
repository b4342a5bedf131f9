//! CLI maintenance commands: `reindex` and `optimize`.

use anyhow::Result;

use crate::config::MnemoConfig;
use crate::memory::store::MemoryStore;

/// Rebuild every lexical index entry from the entity tables.
///
/// Use after a crash or manual database surgery; `mnemo doctor` reports when
/// the index has drifted out of sync.
pub fn reindex(config: &MnemoConfig) -> Result<()> {
    let mut store = MemoryStore::open(
        config.resolved_db_path(),
        config.resolved_content_root(),
    )?;

    let rebuilt = store.rebuild_index()?;
    println!(
        "Rebuilt {rebuilt} index entr{}.",
        if rebuilt == 1 { "y" } else { "ies" }
    );
    Ok(())
}

/// Merge the search index's internal segments.
pub fn optimize(config: &MnemoConfig) -> Result<()> {
    let store = MemoryStore::open(
        config.resolved_db_path(),
        config.resolved_content_root(),
    )?;

    store.optimize()?;
    println!("Search index optimized.");
    Ok(())
}
