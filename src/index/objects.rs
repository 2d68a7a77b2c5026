//! Cross-reference objects: documented symbols with a type code and anchor.

use super::postings::DocId;
use serde::{Deserialize, Serialize};

/// Decoded object-kind information for one type code.
///
/// Combines the `objtypes` role (`"py:function"`) with the `objnames` triple
/// (`["py", "function", "Python function"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    pub role: String,
    pub domain: String,
    pub name: String,
    pub label: String,
}

/// Search priority of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i8);

impl Priority {
    pub const IMPORTANT: Self = Self(0);
    pub const DEFAULT: Self = Self(1);
    pub const UNIMPORTANT: Self = Self(2);
    /// Never shown in search results.
    pub const HIDDEN: Self = Self(-1);

    pub const fn is_hidden(self) -> bool {
        self.0 < 0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One documented symbol inside a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
    pub doc: DocId,
    pub objtype: u32,
    pub priority: Priority,
    /// Raw anchor code: `""` for the full name, `"-"` for `<type>-<full name>`.
    pub anchor: String,
}

impl ObjectEntry {
    /// Dotted name including the namespace, e.g. `triton.language.load`.
    pub fn full_name(&self, namespace: &str) -> String {
        if namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", namespace, self.name)
        }
    }

    /// Resolves the anchor code into the fragment used in page links.
    pub fn resolve_anchor(&self, namespace: &str, objtype: &ObjectType) -> String {
        match self.anchor.as_str() {
            "" => self.full_name(namespace),
            "-" => format!("{}-{}", objtype.name, self.full_name(namespace)),
            anchor => anchor.to_string(),
        }
    }
}

/// Wire layout used for the `objects` section.
///
/// Older generators nest a name-keyed map per namespace; newer ones write a
/// list of five-element arrays with the name last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectLayout {
    #[default]
    Flat,
    Nested,
}
