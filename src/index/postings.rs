//! Document identifiers and posting lists.

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Position of a document in the parallel `docnames`/`filenames`/`titles` arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(pub u32);

impl DocId {
    /// The position as a slice index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of documents a term appears in. Always sorted and deduplicated.
///
/// Generators write a single document as a bare integer and several as an
/// array. Both shapes are accepted in human-readable formats and the same
/// choice is made when writing; binary formats always use a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Postings(Vec<DocId>);

impl Postings {
    /// Builds a posting list, sorting and removing duplicates.
    pub fn new(docs: impl IntoIterator<Item = DocId>) -> Self {
        let mut docs: Vec<DocId> = docs.into_iter().collect();
        docs.sort_unstable();
        docs.dedup();
        Self(docs)
    }

    pub fn single(doc: DocId) -> Self {
        Self(vec![doc])
    }

    pub fn as_slice(&self) -> &[DocId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, doc: DocId) -> bool {
        self.0.binary_search(&doc).is_ok()
    }

    /// Inserts a document, keeping the list sorted. Returns false if it was already present.
    pub fn insert(&mut self, doc: DocId) -> bool {
        match self.0.binary_search(&doc) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, doc);
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ {
        self.0.iter().copied()
    }

    /// Largest document referenced, used for bounds validation.
    pub fn max(&self) -> Option<DocId> {
        self.0.last().copied()
    }
}

impl FromIterator<DocId> for Postings {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Serialize for Postings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.as_slice() {
            [only] if serializer.is_human_readable() => serializer.serialize_u32(only.0),
            docs => serializer.collect_seq(docs),
        }
    }
}

impl<'de> Deserialize<'de> for Postings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(PostingsVisitor)
        } else {
            Vec::<DocId>::deserialize(deserializer).map(Self::new)
        }
    }
}

struct PostingsVisitor;

impl<'de> Visitor<'de> for PostingsVisitor {
    type Value = Postings;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a document index or a list of document indices")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Postings, E> {
        let doc = u32::try_from(v).map_err(|_| E::custom(format!("document index {v} out of range")))?;
        Ok(Postings::single(DocId(doc)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Postings, E> {
        let v = u64::try_from(v).map_err(|_| E::custom(format!("negative document index {v}")))?;
        self.visit_u64(v)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Postings, A::Error> {
        let mut docs = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(doc) = seq.next_element::<DocId>()? {
            docs.push(doc);
        }
        Ok(Postings::new(docs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[rstest]
    #[case("3", &[3])]
    #[case("[4,1,1,2]", &[1, 2, 4])]
    #[case("[]", &[])]
    fn test_accepts_scalar_and_sequence(#[case] json: &str, #[case] expected: &[u32]) {
        let postings: Postings = serde_json::from_str(json).unwrap();
        let docs: Vec<u32> = postings.iter().map(|d| d.0).collect();
        check!(docs == expected);
    }

    #[test]
    fn test_single_document_written_as_scalar() {
        check!(serde_json::to_string(&Postings::single(DocId(5))).unwrap() == "5");
        check!(serde_json::to_string(&Postings::new([DocId(2), DocId(0)])).unwrap() == "[0,2]");
    }

    #[test]
    fn test_rejects_negative_index() {
        let_assert!(Err(err) = serde_json::from_str::<Postings>("-1"));
        check!(err.to_string().contains("negative document index"));
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut postings = Postings::new([DocId(1), DocId(5)]);
        check!(postings.insert(DocId(3)));
        check!(!postings.insert(DocId(5)));
        check!(postings.as_slice() == [DocId(1), DocId(3), DocId(5)]);
        check!(postings.contains(DocId(3)));
        check!(postings.max() == Some(DocId(5)));
    }

    #[test]
    fn test_binary_format_always_sequence() {
        let postings = Postings::single(DocId(9));
        let bytes = postcard::to_stdvec(&postings).unwrap();
        let decoded: Postings = postcard::from_bytes(&bytes).unwrap();
        check!(decoded == postings);
    }
}
