//! Query side of the search index.
//!
//! Tokenizes free text the same way the index was built, looks words up in
//! the term tables, intersects the document sets, and maps the surviving
//! document indices back to titles and paths.

pub(crate) mod query;
pub(crate) mod searcher;
pub(crate) mod suggest;
pub(crate) mod tokenize;

pub use query::Query;
pub use searcher::{DEFAULT_LIMIT, HitKind, SearchHit, SearchOptions, Searcher};
pub use suggest::{Suggestion, suggest_terms};
pub use tokenize::{Language, Token, Tokenizer};
