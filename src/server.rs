//! MCP server initialization for stdio and SSE transports.
//!
//! Provides [`serve_stdio`] and [`serve_sse`] entry points that wire up the
//! memory store and MCP tool handler into a running server.

use crate::config::MnemoConfig;
use crate::db;
use crate::memory::store::MemoryStore;
use crate::tools::MnemoTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Shared setup: open the store and check the recorded content root.
/// Returns (store, config) wrapped in Arc for sharing.
fn setup_shared_state(
    config: MnemoConfig,
) -> Result<(Arc<Mutex<MemoryStore>>, Arc<MnemoConfig>)> {
    let db_path = config.resolved_db_path();
    let content_root = config.resolved_content_root();
    let store = MemoryStore::open(&db_path, &content_root)?;
    tracing::info!(db = %db_path.display(), content = %content_root.display(), "store ready");

    // Warn if the database was last used with a different content root —
    // existing content_path values would not resolve under the new one.
    if let Ok(Some(recorded)) = db::migrations::get_content_root(store.connection()) {
        let configured = store.content().root().to_string_lossy();
        if recorded != configured {
            tracing::warn!(
                recorded = %recorded,
                configured = %configured,
                "content root changed — stored memory paths may not resolve"
            );
        }
    }

    Ok((Arc::new(Mutex::new(store)), Arc::new(config)))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: MnemoConfig) -> Result<()> {
    tracing::info!("starting mnemo MCP server on stdio");

    let (store, config) = setup_shared_state(config)?;

    let tools = MnemoTools::new(store, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running — waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP (SSE) transport.
pub async fn serve_sse(config: MnemoConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting mnemo MCP server on SSE/HTTP");

    let (store, config) = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(MnemoTools::new(store.clone(), config.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down SSE server");
        })
        .await?;

    Ok(())
}
