//! Full-text search handler.

use crate::search::{Query, SearchHit, Searcher, Tokenizer, suggest_terms};
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Number of "did you mean" terms offered per unmatched word.
const SUGGESTIONS_PER_WORD: usize = 3;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search words. All must appear on a page; prefix a word with '-' to exclude pages containing it
    pub query: String,
    /// searchindex.js file or the directory containing it (default: first configured index)
    #[serde(default)]
    pub index: Option<String>,
    /// Maximum number of results to return (default: 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Run a query against an index and render the hits.
pub async fn handle_search(state: &Arc<IndexState>, request: SearchRequest) -> Result<String, String> {
    let loaded = state.get_index(request.index.as_deref()).await?;
    let config = &state.config().search;

    let tokenizer = Tokenizer::new(config.language);
    let query = Query::parse(&request.query, &tokenizer);
    if query.is_empty() {
        return Ok(format!(
            "Query '{}' has no searchable words. Common words and words shorter \
             than 3 characters are not indexed.",
            request.query
        ));
    }

    let searcher = Searcher::new(&loaded.index, config.options(request.limit));
    let hits = searcher.search(&query);

    let rendered = if hits.is_empty() {
        format_no_results(&loaded.index, &query)
    } else {
        format_hits(&hits, &request.query)
    };
    rendered.map_err(|e| e.to_string())
}

fn format_hits(hits: &[SearchHit], query: &str) -> Result<String, fmt::Error> {
    let mut output = String::new();
    writeln!(output, "Search results for '{}' ({}):\n", query, hits.len())?;

    for (idx, hit) in hits.iter().enumerate() {
        writeln!(output, "{}. {} [{}]", idx + 1, hit.title, hit.kind)?;
        writeln!(output, "   `{}` ({})", hit.target(), hit.filename)?;
        if let Some(description) = &hit.description {
            writeln!(output, "   {}", description)?;
        }
    }

    Ok(output)
}

fn format_no_results(index: &crate::index::SearchIndex, query: &Query) -> Result<String, fmt::Error> {
    let mut output = String::new();
    writeln!(output, "No results found for '{}'.", query.text())?;

    let mut suggestions = vec![];
    for token in query.required() {
        if !index.term(&token.stem).is_empty() || !index.title_term(&token.stem).is_empty() {
            continue;
        }
        for suggestion in suggest_terms(index, &token.stem, SUGGESTIONS_PER_WORD) {
            if !suggestions.contains(&suggestion.term) {
                suggestions.push(suggestion.term);
            }
        }
    }

    if !suggestions.is_empty() {
        writeln!(output, "\nIndexed terms close to your query:")?;
        for term in &suggestions {
            writeln!(output, "• {}", term)?;
        }
    }

    output.push_str("\nSearch tips:\n");
    output.push_str("• Every word must appear on the page; try fewer words\n");
    output.push_str("• Words are stemmed: 'loading' matches 'loads'\n");
    output.push_str("• Use lookup_object for API names like 'module.function'\n");

    Ok(output)
}
