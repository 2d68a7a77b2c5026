//! The immutable in-memory search index.

use super::objects::{ObjectEntry, ObjectLayout, ObjectType};
use super::postings::{DocId, Postings};
use super::validate::validate;
use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Term → documents table with O(1) average lookup.
pub(crate) type TermMap = HashMap<String, Postings, ahash::RandomState>;

/// Tool-environment versions recorded by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvVersion {
    /// A single integer, as written by old generators.
    Legacy(u32),
    /// Per-extension versions, e.g. `{"sphinx": 61, "sphinx.domains.python": 4}`.
    Modules(BTreeMap<String, u32>),
}

impl Default for EnvVersion {
    fn default() -> Self {
        Self::Modules(BTreeMap::new())
    }
}

/// A section title occurrence from `alltitles`. `anchor` is `None` for the page title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRef {
    pub doc: DocId,
    pub anchor: Option<String>,
}

/// An index-entry occurrence from `indexentries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntryRef {
    pub doc: DocId,
    pub anchor: String,
    pub main: bool,
}

/// Raw tables of an index, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IndexData {
    pub(crate) docnames: Vec<String>,
    pub(crate) filenames: Vec<String>,
    pub(crate) titles: Vec<String>,
    pub(crate) terms: TermMap,
    pub(crate) titleterms: TermMap,
    pub(crate) objects: BTreeMap<String, Vec<ObjectEntry>>,
    pub(crate) object_layout: ObjectLayout,
    pub(crate) objtypes: BTreeMap<u32, ObjectType>,
    pub(crate) envversion: EnvVersion,
    pub(crate) alltitles: BTreeMap<String, Vec<TitleRef>>,
    pub(crate) indexentries: BTreeMap<String, Vec<IndexEntryRef>>,
}

/// One document as seen through the parallel arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document<'a> {
    pub id: DocId,
    pub docname: &'a str,
    pub filename: &'a str,
    pub title: &'a str,
}

/// A validated, read-only search index.
///
/// Construction always goes through validation, so every document index
/// reachable from this type is in bounds.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    data: IndexData,
    by_docname: HashMap<String, DocId, ahash::RandomState>,
}

impl SearchIndex {
    /// Validates raw tables and builds the lookup structures.
    pub(crate) fn try_from_data(data: IndexData) -> Result<Self, ValidationError> {
        validate(&data)?;
        let by_docname = data
            .docnames
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), DocId(i as u32)))
            .collect();
        Ok(Self { data, by_docname })
    }

    pub(crate) const fn data(&self) -> &IndexData {
        &self.data
    }

    /// Re-checks every structural invariant. Always `Ok` for a constructed index.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&self.data)
    }

    /// O(1) lookup of a document's name, source path, and title.
    pub fn document(&self, id: DocId) -> Option<Document<'_>> {
        let i = id.index();
        Some(Document {
            id,
            docname: self.data.docnames.get(i)?,
            filename: self.data.filenames.get(i)?,
            title: self.data.titles.get(i)?,
        })
    }

    pub fn document_by_name(&self, docname: &str) -> Option<Document<'_>> {
        self.by_docname
            .get(docname)
            .and_then(|&id| self.document(id))
    }

    /// All documents in index order.
    pub fn documents(&self) -> impl Iterator<Item = Document<'_>> {
        (0..self.data.docnames.len()).filter_map(|i| self.document(DocId(i as u32)))
    }

    /// Documents containing `term` in their body text. Empty when absent.
    pub fn term(&self, term: &str) -> &[DocId] {
        self.data
            .terms
            .get(term)
            .map(Postings::as_slice)
            .unwrap_or_default()
    }

    /// Documents containing `term` in their title. Empty when absent.
    pub fn title_term(&self, term: &str) -> &[DocId] {
        self.data
            .titleterms
            .get(term)
            .map(Postings::as_slice)
            .unwrap_or_default()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &Postings)> {
        self.data.terms.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn title_terms(&self) -> impl Iterator<Item = (&str, &Postings)> {
        self.data.titleterms.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every object with its namespace, namespaces in sorted order.
    pub fn objects(&self) -> impl Iterator<Item = (&str, &ObjectEntry)> {
        self.data
            .objects
            .iter()
            .flat_map(|(ns, entries)| entries.iter().map(move |e| (ns.as_str(), e)))
    }

    pub fn objects_in(&self, namespace: &str) -> &[ObjectEntry] {
        self.data
            .objects
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn object(&self, namespace: &str, name: &str) -> Option<&ObjectEntry> {
        self.objects_in(namespace).iter().find(|e| e.name == name)
    }

    /// Objects defined on one page.
    pub fn objects_for_document(&self, doc: DocId) -> impl Iterator<Item = (&str, &ObjectEntry)> {
        self.objects().filter(move |(_, e)| e.doc == doc)
    }

    pub fn object_type(&self, code: u32) -> Option<&ObjectType> {
        self.data.objtypes.get(&code)
    }

    pub fn object_types(&self) -> impl Iterator<Item = (u32, &ObjectType)> {
        self.data.objtypes.iter().map(|(&code, t)| (code, t))
    }

    pub const fn object_layout(&self) -> ObjectLayout {
        self.data.object_layout
    }

    pub const fn env_version(&self) -> &EnvVersion {
        &self.data.envversion
    }

    pub const fn all_titles(&self) -> &BTreeMap<String, Vec<TitleRef>> {
        &self.data.alltitles
    }

    pub const fn index_entries(&self) -> &BTreeMap<String, Vec<IndexEntryRef>> {
        &self.data.indexentries
    }

    pub fn document_count(&self) -> usize {
        self.data.docnames.len()
    }

    pub fn term_count(&self) -> usize {
        self.data.terms.len()
    }

    pub fn title_term_count(&self) -> usize {
        self.data.titleterms.len()
    }

    pub fn object_count(&self) -> usize {
        self.data.objects.values().map(Vec::len).sum()
    }
}

impl PartialEq for SearchIndex {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for SearchIndex {}

impl Serialize for SearchIndex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.data.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SearchIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = IndexData::deserialize(deserializer)?;
        Self::try_from_data(data).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use assert2::{check, let_assert};

    fn two_docs() -> SearchIndex {
        let mut builder = IndexBuilder::new();
        let a = builder.add_document("a", "a.rst", "Page A");
        builder.add_document("b", "b.rst", "Page B");
        builder.add_term("foo", a);
        builder.build().unwrap()
    }

    #[test]
    fn test_document_lookup() {
        let index = two_docs();
        let_assert!(Some(doc) = index.document(DocId(1)));
        check!(doc.docname == "b");
        check!(doc.filename == "b.rst");
        check!(doc.title == "Page B");
        check!(index.document(DocId(2)).is_none());
        check!(index.document_by_name("a").map(|d| d.id) == Some(DocId(0)));
        check!(index.document_by_name("zzz").is_none());
    }

    #[test]
    fn test_term_lookup() {
        let index = two_docs();
        check!(index.term("foo") == [DocId(0)]);
        check!(index.term("bar").is_empty());
        check!(index.title_term("foo").is_empty());
        check!(index.validate().is_ok());
    }

    #[test]
    fn test_invalid_data_rejected() {
        let data = IndexData {
            docnames: vec!["a".to_string()],
            filenames: vec![],
            titles: vec!["A".to_string()],
            ..IndexData::default()
        };
        let_assert!(Err(ValidationError::LengthMismatch { filenames, .. }) = SearchIndex::try_from_data(data));
        check!(filenames == 0);
    }

    #[test]
    fn test_deserialize_validates() {
        let good = serde_json::to_string(&two_docs()).unwrap();
        let_assert!(Ok(index) = serde_json::from_str::<SearchIndex>(&good));
        check!(index.document_by_name("b").map(|d| d.id) == Some(DocId(1)));

        let dangling = good.replace(r#""titles":["Page A","Page B"]"#, r#""titles":[]"#);
        check!(dangling != good);
        let_assert!(Err(e) = serde_json::from_str::<SearchIndex>(&dangling));
        check!(e.to_string().contains("positional arrays disagree"), "{}", e);
    }
}
