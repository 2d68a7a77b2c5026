//! Index discovery handler.

use crate::config::expand_tilde;
use crate::discovery::discover_indexes_async;
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// Paths listed before the rest are abbreviated.
const MAX_LISTED: usize = 50;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DiscoverIndexesRequest {
    /// Directory to search recursively, e.g. a project checkout or docs/_build
    pub root: String,
}

/// List every searchindex.js under a directory.
pub async fn handle_discover_indexes(
    state: &Arc<IndexState>,
    request: DiscoverIndexesRequest,
) -> Result<String, String> {
    let root = PathBuf::from(expand_tilde(request.root.trim()).as_ref());
    let found = discover_indexes_async(root.clone())
        .await
        .map_err(|e| format!("Failed to search {}: {:#}", root.display(), e))?;

    if found.is_empty() {
        return Ok(format!(
            "No searchindex.js found under {}. Build the documentation first \
             (for Sphinx: `make html`).",
            root.display()
        ));
    }

    let mut output = String::new();
    writeln!(output, "Search indexes under {} ({}):\n", root.display(), found.len())
        .map_err(|e| e.to_string())?;
    for path in found.iter().take(MAX_LISTED) {
        let cached = match tokio::fs::canonicalize(path).await {
            Ok(canonical) => state.is_cached(&canonical).await,
            Err(_) => false,
        };
        let marker = if cached { " (loaded)" } else { "" };
        writeln!(output, "• {}{}", path.display(), marker).map_err(|e| e.to_string())?;
    }
    if found.len() > MAX_LISTED {
        writeln!(output, "... and {} more", found.len() - MAX_LISTED).map_err(|e| e.to_string())?;
    }

    Ok(output)
}
