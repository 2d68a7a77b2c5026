use rmcp::{ServiceExt, transport::stdio};
use searchindex_mcp::{Config, IndexServer, logging, state::spawn_preload};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::discover().await?;
    logging::init(config.logging.format);

    tracing::info!(
        "Starting searchindex-mcp ({} configured indexes)",
        config.index.paths.len()
    );

    let server = IndexServer::new(config);
    spawn_preload(server.index_state().clone());

    // Serve over stdio; logs go to stderr
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}
