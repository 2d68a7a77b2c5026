//! Index overview handler.

use crate::index::{EnvVersion, SearchIndex};
use crate::state::{IndexState, LoadedIndex};
use rmcp::schemars;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Documents listed before the rest are abbreviated.
const DOCUMENT_PREVIEW: usize = 20;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InspectIndexRequest {
    /// searchindex.js file or the directory containing it (default: first configured index)
    #[serde(default)]
    pub index: Option<String>,
}

/// Summarize an index: sizes, generator versions, object types and documents.
pub async fn handle_inspect_index(
    state: &Arc<IndexState>,
    request: InspectIndexRequest,
) -> Result<String, String> {
    let loaded = state.get_index(request.index.as_deref()).await?;
    format_overview(&loaded).map_err(|e| e.to_string())
}

fn format_overview(loaded: &LoadedIndex) -> Result<String, fmt::Error> {
    let index = &loaded.index;
    let mut output = String::new();

    writeln!(output, "Search index: {}\n", loaded.path.display())?;
    writeln!(output, "Documents:     {}", index.document_count())?;
    writeln!(output, "Terms:         {}", index.term_count())?;
    writeln!(output, "Title terms:   {}", index.title_term_count())?;
    writeln!(output, "Objects:       {}", index.object_count())?;
    writeln!(output, "Section titles: {}", index.all_titles().len())?;
    writeln!(output, "Index entries: {}", index.index_entries().len())?;

    match index.env_version() {
        EnvVersion::Legacy(version) => writeln!(output, "\nEnvironment version: {}", version)?,
        EnvVersion::Modules(modules) if !modules.is_empty() => {
            writeln!(output, "\nEnvironment versions:")?;
            for (module, version) in modules {
                writeln!(output, "  • {} v{}", module, version)?;
            }
        }
        EnvVersion::Modules(_) => {}
    }

    write_object_types(&mut output, index)?;

    writeln!(output, "\nDocuments ({}):", index.document_count())?;
    for document in index.documents().take(DOCUMENT_PREVIEW) {
        writeln!(
            output,
            "  {}. {} ({})",
            document.id, document.docname, document.title
        )?;
    }
    if index.document_count() > DOCUMENT_PREVIEW {
        writeln!(
            output,
            "  ... and {} more documents",
            index.document_count() - DOCUMENT_PREVIEW
        )?;
    }

    Ok(output)
}

fn write_object_types(output: &mut String, index: &SearchIndex) -> fmt::Result {
    let mut per_type: BTreeMap<u32, usize> = BTreeMap::new();
    for (_, entry) in index.objects() {
        *per_type.entry(entry.objtype).or_default() += 1;
    }

    if index.object_types().next().is_none() {
        return Ok(());
    }

    writeln!(output, "\nObject types:")?;
    for (code, objtype) in index.object_types() {
        writeln!(
            output,
            "  {:>3}  {:<24} {} ({} objects)",
            code,
            objtype.role,
            objtype.label,
            per_type.get(&code).copied().unwrap_or(0)
        )?;
    }
    Ok(())
}
