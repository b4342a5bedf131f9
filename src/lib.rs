//! Persistent memory for AI agents — file-backed content with lexical recall via MCP.
//!
//! mnemo is an [MCP](https://modelcontextprotocol.io/) server that gives AI
//! agents a durable memory: each memory is a content file on disk plus a
//! summary and keyword set in SQLite, indexed with FTS5 for ranked recall.
//!
//! # Architecture
//!
//! - **Content**: plain `.md` files under `root/YYYY/MM/DD/`, one per memory,
//!   named from the summary with collision-safe exclusive creates
//! - **Metadata**: SQLite (WAL) rows with cascade-deleted keyword associations
//! - **Search**: FTS5 bm25 over summaries and keywords, re-ranked by
//!   boost-keyword overlap
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP/SSE
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`content`] — File-backed content store under a configured root
//! - [`db`] — SQLite database initialization, schema, migrations, and health checks
//! - [`error`] — Error taxonomy shared by all store operations
//! - [`memory`] — Core engine: store, lexical index, and ranked search

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod memory;
