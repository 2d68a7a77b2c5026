//! Error handling types and utilities.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for searchindex-mcp operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods at the application seams (config, snapshots, server).
pub type Result<T, E = anyhow::Error> = anyhow::Result<T, E>;

/// Error returned when loading a search index fails.
///
/// Every variant means "search unavailable" for the index in question; callers
/// surface the message instead of serving partial results.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Index file not found at the expected path.
    #[error("Search index not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// Reading the index file failed.
    #[error("Failed to read search index at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is neither a `Search.setIndex(...)` call nor a bare object literal.
    #[error("Not a search index: {0}")]
    Envelope(String),

    /// The object literal is not valid JSON (even after legacy key quoting).
    #[error("Malformed search index: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The literal parsed but violates a structural invariant.
    #[error("Inconsistent search index: {0}")]
    Structure(#[from] ValidationError),
}

/// Structural invariant violated by a search index.
///
/// Validation is fail-fast: the first violation found is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "positional arrays disagree: {docnames} docnames, {filenames} filenames, {titles} titles"
    )]
    LengthMismatch {
        docnames: usize,
        filenames: usize,
        titles: usize,
    },

    #[error("docname '{docname}' appears more than once")]
    DuplicateDocname { docname: String },

    #[error("{section} entry '{key}' references document {doc}, but only {len} documents exist")]
    DanglingDocument {
        section: &'static str,
        key: String,
        doc: u32,
        len: usize,
    },

    #[error("{section} entry '{key}' has an empty document list")]
    EmptyPostings { section: &'static str, key: String },

    #[error("object '{name}' uses unknown object type {code}")]
    UnknownObjectType { name: String, code: u32 },

    #[error("object type {code} is listed in only one of objtypes/objnames")]
    ObjectTypeMismatch { code: u32 },

    #[error("{section} key '{key}' is not an integer object type code")]
    BadTypeCode { section: &'static str, key: String },

    #[error("{section} entry '{key}' is malformed: {reason}")]
    MalformedEntry {
        section: &'static str,
        key: String,
        reason: String,
    },
}
