//! Load, validate, query and regenerate documentation search indexes
//! (`searchindex.js`), and serve them to AI assistants over MCP.

pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod index;
pub mod logging;
pub mod search;
pub mod server;
pub mod snapshot;
pub mod state;
pub mod tools;

pub use config::Config;
pub use error::{LoadError, Result, ValidationError};
pub use index::{DocId, IndexBuilder, SearchIndex};
pub use search::{Query, SearchHit, SearchOptions, Searcher, Tokenizer};
pub use server::IndexServer;
pub use state::IndexState;
