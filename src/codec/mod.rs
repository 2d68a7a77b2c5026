//! Reading and writing `searchindex.js` files.
//!
//! The file is a single `Search.setIndex(<object literal>)` call. The literal
//! is JSON for current generators; older ones left identifier keys unquoted,
//! which is handled by a fallback pass before giving up.

mod envelope;
mod legacy;
mod wire;

use crate::error::{LoadError, Result};
use crate::index::SearchIndex;
use anyhow::Context;
use std::path::Path;
use wire::RawIndex;

/// Parses the text of a `searchindex.js` file into a validated index.
pub fn parse(text: &str) -> Result<SearchIndex, LoadError> {
    let body = envelope::strip(text)?;

    let raw: RawIndex = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(strict) => {
            let quoted = legacy::quote_bare_keys(body);
            match serde_json::from_str(&quoted) {
                Ok(raw) => {
                    tracing::debug!("Parsed search index using unquoted-key fallback");
                    raw
                }
                // Report the strict error: it points at the original text.
                Err(_) => return Err(LoadError::Syntax(strict)),
            }
        }
    };

    let data = raw.into_data()?;
    Ok(SearchIndex::try_from_data(data)?)
}

/// Like [`parse`], for raw file bytes.
pub fn parse_bytes(bytes: &[u8]) -> Result<SearchIndex, LoadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LoadError::Envelope(format!("file is not valid UTF-8: {}", e)))?;
    parse(text)
}

/// Serializes an index back to `searchindex.js` text.
///
/// Keys are written in sorted order without whitespace, so equal indexes
/// produce identical files.
pub fn dump(index: &SearchIndex) -> serde_json::Result<String> {
    let body = serde_json::to_string(&RawIndex::from_index(index))?;
    Ok(envelope::wrap(&body))
}

/// Reads and parses an index file synchronously.
pub fn read(path: &Path) -> Result<SearchIndex, LoadError> {
    let bytes = read_bytes(path)?;
    parse_bytes(&bytes)
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Reads and parses an index file on the blocking pool.
pub async fn load(path: &Path) -> Result<SearchIndex> {
    let owned = path.to_path_buf();
    let index = tokio::task::spawn_blocking(move || read(&owned))
        .await
        .context("Index loading task panicked")??;
    Ok(index)
}

/// Writes an index to `path`, replacing any existing file atomically.
pub async fn write(path: &Path, index: &SearchIndex) -> Result<()> {
    let text = dump(index).context("Failed to serialize search index")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let tmp = path.with_extension("js.tmp");
    tokio::fs::write(&tmp, text)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move index into place at {}", path.display()))?;

    tracing::debug!("Wrote search index to {}", path.display());
    Ok(())
}
