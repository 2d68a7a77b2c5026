//! The search index data model.
//!
//! A search index is a set of positionally aligned document tables (`docnames`,
//! `filenames`, `titles`) plus term, title, object and index-entry tables that
//! refer into them by [`DocId`]. It is produced once and read many times.

mod builder;
mod model;
mod objects;
mod postings;
mod validate;

pub use builder::IndexBuilder;
pub use model::{Document, EnvVersion, IndexEntryRef, SearchIndex, TitleRef};
pub use objects::{ObjectEntry, ObjectLayout, ObjectType, Priority};
pub use postings::{DocId, Postings};

pub(crate) use model::{IndexData, TermMap};
