//! MCP tool handlers.
//!
//! Each tool has a request type (its JSON schema is the tool's input schema)
//! and a `handle_*` function returning the rendered text, or an error message
//! shown to the client as is.

pub mod discover;
pub mod get_document;
pub mod inspect_index;
pub mod lookup_object;
pub mod search;

pub use discover::*;
pub use get_document::*;
pub use inspect_index::*;
pub use lookup_object::*;
pub use search::*;
