//! Finding `searchindex.js` files under a directory tree.

use crate::error::Result;
use anyhow::Context;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// File name documentation generators give the index.
pub const INDEX_FILE_NAME: &str = "searchindex.js";

/// Every index file under `root`, sorted by path.
///
/// Build output directories (`_build/`, `target/`) are usually gitignored, so
/// ignore files are not consulted. Hidden directories are searched too.
pub fn discover_indexes(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut found: Vec<PathBuf> = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter(|entry| entry.file_name() == INDEX_FILE_NAME)
        .map(ignore::DirEntry::into_path)
        .collect();

    found.sort();
    Ok(found)
}

/// [`discover_indexes`] on the blocking pool.
pub async fn discover_indexes_async(root: PathBuf) -> Result<Vec<PathBuf>> {
    tokio::task::spawn_blocking(move || discover_indexes(&root))
        .await
        .context("Discovery task panicked")?
}

/// Accepts either an index file or a directory containing one.
pub fn index_file_for(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(INDEX_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}
