//! Single-document handler.

use crate::index::{DocId, Document, SearchIndex};
use crate::state::IndexState;
use rapidfuzz::distance::jaro_winkler;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::{self, Write as _};
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDocumentRequest {
    /// Document name (e.g. 'getting-started/installation') or numeric document index
    pub document: String,
    /// searchindex.js file or the directory containing it (default: first configured index)
    #[serde(default)]
    pub index: Option<String>,
}

/// Show one document: its path, title, sections, and the objects it defines.
pub async fn handle_get_document(
    state: &Arc<IndexState>,
    request: GetDocumentRequest,
) -> Result<String, String> {
    let loaded = state.get_index(request.index.as_deref()).await?;
    let index = &loaded.index;

    let key = request.document.trim();
    let document = index.document_by_name(key).or_else(|| {
        key.parse::<u32>()
            .ok()
            .and_then(|id| index.document(DocId(id)))
    });

    let rendered = match document {
        Some(document) => format_document(index, document),
        None => format_not_found(index, key),
    };
    rendered.map_err(|e| e.to_string())
}

fn format_document(index: &SearchIndex, document: Document<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    writeln!(output, "{}\n", document.title)?;
    writeln!(output, "Document: {} (#{})", document.docname, document.id)?;
    writeln!(output, "Source:   {}", document.filename)?;

    let sections: Vec<_> = index
        .all_titles()
        .iter()
        .flat_map(|(title, refs)| refs.iter().map(move |r| (title, r)))
        .filter(|(_, r)| r.doc == document.id && r.anchor.is_some())
        .collect();
    if !sections.is_empty() {
        writeln!(output, "\nSections ({}):", sections.len())?;
        for (title, r) in sections {
            writeln!(output, "  • {} (#{})", title, r.anchor.as_deref().unwrap_or_default())?;
        }
    }

    let objects: Vec<_> = index.objects_for_document(document.id).collect();
    if !objects.is_empty() {
        writeln!(output, "\nObjects ({}):", objects.len())?;
        for (namespace, entry) in objects {
            match index.object_type(entry.objtype) {
                Some(objtype) => writeln!(
                    output,
                    "  • {} [{}] #{}",
                    entry.full_name(namespace),
                    objtype.label,
                    entry.resolve_anchor(namespace, objtype)
                )?,
                None => writeln!(output, "  • {}", entry.full_name(namespace))?,
            }
        }
    }

    let entries: Vec<_> = index
        .index_entries()
        .iter()
        .filter(|(_, refs)| refs.iter().any(|r| r.doc == document.id))
        .map(|(entry, _)| entry)
        .collect();
    if !entries.is_empty() {
        writeln!(output, "\nIndex entries ({}):", entries.len())?;
        for entry in entries {
            writeln!(output, "  • {}", entry)?;
        }
    }

    Ok(output)
}

fn format_not_found(index: &SearchIndex, key: &str) -> Result<String, fmt::Error> {
    let mut output = format!("Document '{}' not found.", key);

    let mut candidates: Vec<(f64, &str)> = index
        .documents()
        .map(|d| (jaro_winkler::similarity(key.chars(), d.docname.chars()), d.docname))
        .filter(|(score, _)| *score > 0.8)
        .collect();
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    if !candidates.is_empty() {
        output.push_str(" Did you mean one of these?\n\n");
        for (_, docname) in candidates.into_iter().take(5) {
            writeln!(output, "• {}", docname)?;
        }
    }
    Ok(output)
}
