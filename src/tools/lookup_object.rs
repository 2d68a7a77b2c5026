//! Object (API symbol) lookup handler.

use crate::search::{Query, SearchHit, Searcher, Tokenizer};
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupObjectRequest {
    /// Object name or part of it, e.g. 'load' or 'triton.language.load'
    pub name: String,
    /// searchindex.js file or the directory containing it (default: first configured index)
    #[serde(default)]
    pub index: Option<String>,
    /// Maximum number of results to return (default: 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Find documented objects by name. Exact full-name matches come first.
pub async fn handle_lookup_object(
    state: &Arc<IndexState>,
    request: LookupObjectRequest,
) -> Result<String, String> {
    let loaded = state.get_index(request.index.as_deref()).await?;
    let config = &state.config().search;
    let options = config.options(request.limit);

    let tokenizer = Tokenizer::new(config.language);
    let query = Query::parse(&request.name, &tokenizer);
    let mut hits = Searcher::new(&loaded.index, options).objects(&query);

    let name = request.name.trim();
    hits.sort_by_key(|hit| hit.title != name);
    hits.truncate(options.limit);

    if hits.is_empty() {
        return Ok(format!(
            "No objects matching '{}'. The index has {} objects; try a shorter name \
             or use search for prose.",
            name,
            loaded.index.object_count()
        ));
    }

    format_objects(&hits, name).map_err(|e| e.to_string())
}

fn format_objects(hits: &[SearchHit], name: &str) -> Result<String, std::fmt::Error> {
    let mut output = String::new();
    writeln!(output, "Objects matching '{}' ({}):\n", name, hits.len())?;
    for hit in hits {
        writeln!(output, "• {}", hit.title)?;
        if let Some(description) = &hit.description {
            writeln!(output, "  {}", description)?;
        }
        writeln!(output, "  `{}` ({})", hit.target(), hit.filename)?;
    }
    Ok(output)
}
