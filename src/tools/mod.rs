pub mod forget_memory;
pub mod get_memory;
pub mod list_memories;
pub mod optimize_index;
pub mod read_content;
pub mod recall_memory;
pub mod store_memory;
pub mod update_memory;

use forget_memory::ForgetMemoryParams;
use get_memory::GetMemoryParams;
use list_memories::ListMemoriesParams;
use optimize_index::OptimizeIndexParams;
use read_content::ReadContentParams;
use recall_memory::RecallMemoryParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::sync::{Arc, Mutex};
use store_memory::StoreMemoryParams;
use update_memory::UpdateMemoryParams;

use crate::config::MnemoConfig;
use crate::content::ContentRead;
use crate::error::MemoryError;
use crate::memory::store::MemoryStore;
use crate::memory::types::MAX_KEYWORDS;

/// The mnemo MCP tool handler. Holds shared state (memory store, config) and
/// exposes all MCP tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct MnemoTools {
    tool_router: ToolRouter<Self>,
    store: Arc<Mutex<MemoryStore>>,
    config: Arc<MnemoConfig>,
}

/// Render blob content for a response. Missing files are `None`; oversized
/// or unreadable files degrade to a placeholder so metadata still flows.
fn hydrate_content(store: &MemoryStore, path: &str, cap: u64) -> Option<String> {
    match store.read_content(path, cap) {
        Ok(ContentRead::Full { text, .. }) => Some(text),
        Ok(ContentRead::Oversized { size }) => {
            Some(format!("[content exceeds read cap: {size} bytes]"))
        }
        Ok(ContentRead::Missing) => None,
        Err(e) => Some(format!("[content unreadable: {e}]")),
    }
}

fn validate_keyword_list(keywords: &Option<Vec<String>>) -> Result<(), String> {
    if let Some(kws) = keywords {
        if kws.len() > MAX_KEYWORDS {
            return Err(MemoryError::validation(format!(
                "at most {MAX_KEYWORDS} keywords allowed, got {}",
                kws.len()
            ))
            .to_string());
        }
    }
    Ok(())
}

fn validate_limit(limit: usize) -> Result<(), String> {
    if !(1..=100).contains(&limit) {
        return Err(MemoryError::validation(format!(
            "limit must be between 1 and 100, got {limit}"
        ))
        .to_string());
    }
    Ok(())
}

fn validate_id(id: i64) -> Result<(), String> {
    if id < 1 {
        return Err(
            MemoryError::validation(format!("id must be a positive integer, got {id}"))
                .to_string(),
        );
    }
    Ok(())
}

#[tool_router]
impl MnemoTools {
    pub fn new(store: Arc<Mutex<MemoryStore>>, config: Arc<MnemoConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            store,
            config,
        }
    }

    /// Run blocking store work on the blocking pool, with the store locked.
    async fn with_store<F>(&self, f: F) -> Result<serde_json::Value, String>
    where
        F: FnOnce(&mut MemoryStore) -> Result<serde_json::Value, String> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut store = store
                .lock()
                .map_err(|e| format!("store lock poisoned: {e}"))?;
            f(&mut store)
        })
        .await
        .map_err(|e| format!("store task failed: {e}"))?
    }

    /// Store a new memory.
    #[tool(description = "Store a new memory: durable content plus a short summary and optional keywords for later recall.")]
    async fn store_memory(
        &self,
        Parameters(params): Parameters<StoreMemoryParams>,
    ) -> Result<String, String> {
        validate_keyword_list(&params.keywords)?;

        tracing::info!(
            content_len = params.content.len(),
            summary_len = params.summary.len(),
            "store_memory called"
        );

        let result = self
            .with_store(move |store| {
                let stored = store
                    .insert(
                        &params.content,
                        &params.summary,
                        params.keywords.as_deref().unwrap_or(&[]),
                    )
                    .map_err(|e| e.to_string())?;
                Ok(serde_json::json!({
                    "id": stored.id,
                    "path": stored.content_path,
                }))
            })
            .await?;

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Update an existing memory's content, summary, and/or keywords.
    #[tool(description = "Update a memory. Provide at least one of content, summary, keywords. An empty keyword list clears all keywords; omitting it keeps them.")]
    async fn update_memory(
        &self,
        Parameters(params): Parameters<UpdateMemoryParams>,
    ) -> Result<String, String> {
        validate_id(params.id)?;
        validate_keyword_list(&params.keywords)?;
        if params.content.is_none() && params.summary.is_none() && params.keywords.is_none() {
            return Err(MemoryError::validation(
                "at least one of content, summary, keywords must be given",
            )
            .to_string());
        }

        tracing::info!(id = params.id, "update_memory called");

        let result = self
            .with_store(move |store| {
                let stored = store
                    .update(
                        params.id,
                        params.content.as_deref(),
                        params.summary.as_deref(),
                        params.keywords.as_deref(),
                    )
                    .map_err(|e| e.to_string())?;
                Ok(serde_json::json!({
                    "id": stored.id,
                    "path": stored.content_path,
                }))
            })
            .await?;

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Search memories with ranked lexical retrieval.
    #[tool(description = "Search memories by natural language query. Returns ranked results; optional keywords bias the ranking toward memories that carry them.")]
    async fn recall_memory(
        &self,
        Parameters(params): Parameters<RecallMemoryParams>,
    ) -> Result<String, String> {
        if params.query.trim().is_empty() {
            return Err(MemoryError::validation("query must not be empty").to_string());
        }
        validate_keyword_list(&params.keywords)?;
        let limit = params.limit.unwrap_or(self.config.search.default_limit);
        validate_limit(limit)?;
        let keyword_boost = params
            .keyword_boost
            .unwrap_or(self.config.search.keyword_boost);
        if keyword_boost < 0.0 {
            return Err(MemoryError::validation(format!(
                "keyword_boost must be >= 0, got {keyword_boost}"
            ))
            .to_string());
        }

        let request = crate::memory::search::SearchRequest {
            query: params.query,
            boost_keywords: params.keywords.unwrap_or_default(),
            limit,
            summary_weight: params
                .summary_weight
                .unwrap_or(self.config.search.summary_weight),
            keyword_weight: params
                .keyword_weight
                .unwrap_or(self.config.search.keyword_weight),
            keyword_boost,
        };

        tracing::info!(query = %request.query, limit, "recall_memory called");

        let cap = self.config.storage.max_read_bytes;
        let result = self
            .with_store(move |store| {
                let response = store.search(&request).map_err(|e| e.to_string())?;
                let results: Vec<serde_json::Value> = response
                    .hits
                    .iter()
                    .map(|hit| {
                        serde_json::json!({
                            "id": hit.id,
                            "path": hit.content_path,
                            "summary": hit.summary,
                            "content": hydrate_content(store, &hit.content_path, cap),
                            "relevance": hit.relevance,
                            "matched_keywords": hit.matched_keywords,
                            "final_score": hit.final_score,
                        })
                    })
                    .collect();
                Ok(serde_json::json!({
                    "results": results,
                    "total": response.total_matched,
                }))
            })
            .await?;

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Fetch a single memory with its content.
    #[tool(description = "Fetch a memory by ID. Returns the record and its content (capped for very large files).")]
    async fn get_memory(
        &self,
        Parameters(params): Parameters<GetMemoryParams>,
    ) -> Result<String, String> {
        validate_id(params.id)?;
        tracing::info!(id = params.id, "get_memory called");

        let cap = self.config.storage.max_read_bytes;
        let result = self
            .with_store(move |store| {
                let mem = store
                    .get(params.id)
                    .map_err(|e| e.to_string())?
                    .ok_or_else(|| MemoryError::NotFound(params.id).to_string())?;
                Ok(serde_json::json!({
                    "id": mem.id,
                    "path": mem.content_path,
                    "summary": mem.summary,
                    "keywords": mem.keywords,
                    "created_at": mem.created_at,
                    "content": hydrate_content(store, &mem.content_path, cap),
                }))
            })
            .await?;

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Delete a memory.
    #[tool(description = "Delete a memory by ID. Removes the record, its keywords, and its index entry; the content file stays on disk.")]
    async fn forget_memory(
        &self,
        Parameters(params): Parameters<ForgetMemoryParams>,
    ) -> Result<String, String> {
        validate_id(params.id)?;
        tracing::info!(id = params.id, "forget_memory called");

        let result = self
            .with_store(move |store| {
                let removed = store.delete(params.id).map_err(|e| e.to_string())?;
                if !removed {
                    return Err(MemoryError::NotFound(params.id).to_string());
                }
                Ok(serde_json::json!({
                    "id": params.id,
                    "deleted": true,
                }))
            })
            .await?;

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    /// List memories, most recent first.
    #[tool(description = "List memories ordered most recent first, with pagination.")]
    async fn list_memories(
        &self,
        Parameters(params): Parameters<ListMemoriesParams>,
    ) -> Result<String, String> {
        let limit = params
            .limit
            .unwrap_or(self.config.search.default_list_limit);
        validate_limit(limit)?;
        let offset = params.offset.unwrap_or(0);

        tracing::info!(limit, offset, "list_memories called");

        let result = self
            .with_store(move |store| {
                let memories = store.list(limit, offset).map_err(|e| e.to_string())?;
                let total = store.count().map_err(|e| e.to_string())?;
                let has_more = (offset as i64 + memories.len() as i64) < total;
                let entries: Vec<serde_json::Value> = memories
                    .iter()
                    .map(|mem| {
                        serde_json::json!({
                            "id": mem.id,
                            "path": mem.content_path,
                            "summary": mem.summary,
                            "keywords": mem.keywords,
                            "created_at": mem.created_at,
                        })
                    })
                    .collect();
                Ok(serde_json::json!({
                    "memories": entries,
                    "total": total,
                    "limit": limit,
                    "offset": offset,
                    "has_more": has_more,
                }))
            })
            .await?;

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Merge lexical index segments.
    #[tool(description = "Optimize the search index. Safe to run at any time.")]
    async fn optimize_index(
        &self,
        Parameters(_params): Parameters<OptimizeIndexParams>,
    ) -> Result<String, String> {
        tracing::info!("optimize_index called");

        let result = self
            .with_store(|store| {
                store.optimize().map_err(|e| e.to_string())?;
                Ok(serde_json::json!({ "status": "ok" }))
            })
            .await?;

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Read a content file directly by path.
    #[tool(description = "Read a stored content file by absolute path. The path must be under the configured content root; very large files are reported by size only.")]
    async fn read_content(
        &self,
        Parameters(params): Parameters<ReadContentParams>,
    ) -> Result<String, String> {
        tracing::info!(path = %params.path, "read_content called");

        let cap = self.config.storage.max_read_bytes;
        let result = self
            .with_store(move |store| {
                let read = store
                    .read_raw(&params.path, cap)
                    .map_err(|e| e.to_string())?;
                Ok(match read {
                    ContentRead::Missing => serde_json::json!({
                        "path": params.path,
                        "exists": false,
                    }),
                    ContentRead::Oversized { size } => serde_json::json!({
                        "path": params.path,
                        "exists": true,
                        "size": size,
                        "content": format!("[content exceeds read cap: {size} bytes]"),
                    }),
                    ContentRead::Full { size, text } => serde_json::json!({
                        "path": params.path,
                        "exists": true,
                        "size": size,
                        "content": text,
                    }),
                })
            })
            .await?;

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for MnemoTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "mnemo is a persistent memory server. Use store_memory to save memories, \
                 recall_memory to search, and get_memory to fetch one with its content."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
