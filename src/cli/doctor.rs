//! CLI `doctor` command — run database diagnostics and print a health report.

use anyhow::{Context, Result};

use crate::config::MnemoConfig;
use crate::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &MnemoConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let content_root = config.resolved_content_root();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `mnemo serve` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path)
        .map(|m| m.len())
        .unwrap_or(0);

    let conn = db::open_database(&db_path)
        .context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn)
        .context("failed to run health check")?;

    println!("mnemo Health Report");
    println!("===================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Content root:");
    println!("  Recorded:        {}", report.content_root.as_deref().unwrap_or("(not set)"));
    println!("  Configured:      {}", content_root.display());
    if let Some(ref recorded) = report.content_root {
        if recorded != &content_root.to_string_lossy() {
            println!("  WARNING: root mismatch! Stored memory paths may not resolve.");
        } else if !content_root.exists() {
            println!("  WARNING: content root directory is missing.");
        } else {
            println!("  Status:          OK (match)");
        }
    }
    println!();
    println!("Row counts:");
    println!("  Memories:        {}", report.memory_count);
    println!("  Keywords:        {}", report.keyword_count);
    println!("  Index entries:   {}", report.index_count);
    if report.index_in_sync() {
        println!("  Index sync:      OK");
    } else {
        println!("  Index sync:      OUT OF SYNC — run `mnemo reindex` to rebuild.");
    }
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
    }

    if !report.integrity_ok {
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.mnemo/memory.db");
        println!("  2. Then rebuild the search index: mnemo reindex");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
