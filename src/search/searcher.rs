//! Query evaluation against a loaded index.
//!
//! Matching is containment only: a document either matches or it does not.
//! Hits come out grouped by kind (objects, section titles, index entries,
//! full text) and, within a kind, in index order.

use super::query::Query;
use super::tokenize::Token;
use crate::index::{DocId, SearchIndex};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Default number of hits returned by a search.
pub const DEFAULT_LIMIT: usize = 10;

/// Knobs for query evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: usize,
    /// Also match indexed terms that merely contain a query word (3+ characters).
    pub partial_terms: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            partial_terms: true,
        }
    }
}

/// What produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitKind {
    Object,
    Title,
    IndexEntry,
    Text,
}

impl fmt::Display for HitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Object => "object",
            Self::Title => "title",
            Self::IndexEntry => "index entry",
            Self::Text => "text",
        })
    }
}

/// One search result, resolved back to document name, path and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub kind: HitKind,
    pub doc: DocId,
    pub docname: String,
    pub filename: String,
    pub title: String,
    /// Fragment within the page, without the leading `#`.
    pub anchor: Option<String>,
    pub description: Option<String>,
}

impl SearchHit {
    fn new(index: &SearchIndex, kind: HitKind, doc: DocId) -> Option<Self> {
        let document = index.document(doc)?;
        Some(Self {
            kind,
            doc,
            docname: document.docname.to_string(),
            filename: document.filename.to_string(),
            title: document.title.to_string(),
            anchor: None,
            description: None,
        })
    }

    /// `docname#anchor` style link target.
    pub fn target(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!("{}#{}", self.docname, anchor),
            None => self.docname.clone(),
        }
    }
}

/// Evaluates queries against one index.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    index: &'a SearchIndex,
    options: SearchOptions,
}

impl<'a> Searcher<'a> {
    pub const fn new(index: &'a SearchIndex, options: SearchOptions) -> Self {
        Self { index, options }
    }

    /// Documents whose text or title contains `token`.
    ///
    /// Both the stem and the raw lowercase word are looked up, so indexes
    /// produced with a slightly different stemmer still match.
    pub fn documents_for(&self, token: &Token) -> BTreeSet<DocId> {
        let mut docs = BTreeSet::new();
        for key in [token.stem.as_str(), token.raw.as_str()] {
            docs.extend(self.index.term(key));
            docs.extend(self.index.title_term(key));
        }

        let stem = token.stem.as_str();
        if self.options.partial_terms && stem.chars().count() >= 3 {
            for (term, postings) in self.index.terms().chain(self.index.title_terms()) {
                if term != stem && term.contains(stem) {
                    docs.extend(postings.iter());
                }
            }
        }

        docs
    }

    /// Documents matching every required word and no excluded word, in index order.
    pub fn full_text(&self, query: &Query) -> Vec<DocId> {
        let mut required = query.required().iter();
        let Some(first) = required.next() else {
            return vec![];
        };

        let mut docs = self.documents_for(first);
        for token in required {
            if docs.is_empty() {
                break;
            }
            let other = self.documents_for(token);
            docs.retain(|doc| other.contains(doc));
        }

        for token in query.excluded() {
            for key in [token.stem.as_str(), token.raw.as_str()] {
                for doc in self.index.term(key).iter().chain(self.index.title_term(key)) {
                    docs.remove(doc);
                }
            }
        }

        docs.into_iter().collect()
    }

    /// Objects whose dotted name contains one object term while every other
    /// term appears in the name, kind label or page title. Hidden objects are skipped.
    pub fn objects(&self, query: &Query) -> Vec<SearchHit> {
        let terms = query.object_terms();
        if terms.is_empty() {
            return vec![];
        }

        let mut hits = vec![];
        for (namespace, entry) in self.index.objects() {
            if entry.priority.is_hidden() {
                continue;
            }
            let Some(objtype) = self.index.object_type(entry.objtype) else {
                continue;
            };
            let Some(document) = self.index.document(entry.doc) else {
                continue;
            };

            let full_name = entry.full_name(namespace);
            let full_lower = full_name.to_lowercase();
            let Some(matched) = terms.iter().position(|t| full_lower.contains(t.as_str())) else {
                continue;
            };

            let haystack = format!(
                "{} {} {}",
                full_lower,
                objtype.label.to_lowercase(),
                document.title.to_lowercase()
            );
            let others_present = terms
                .iter()
                .enumerate()
                .all(|(i, t)| i == matched || haystack.contains(t.as_str()));
            if !others_present {
                continue;
            }

            if let Some(mut hit) = SearchHit::new(self.index, HitKind::Object, entry.doc) {
                hit.anchor = Some(entry.resolve_anchor(namespace, objtype));
                hit.description = Some(format!("{}, in {}", objtype.label, document.title));
                hit.title = full_name;
                hits.push(hit);
            }
        }
        hits
    }

    /// Section titles containing the whole query, when the query covers at
    /// least half of the title.
    pub fn titles(&self, query: &Query) -> Vec<SearchHit> {
        let needle = query.text().to_lowercase();
        if needle.is_empty() {
            return vec![];
        }

        let mut hits = vec![];
        for (title, refs) in self.index.all_titles() {
            if !covers(title, &needle) {
                continue;
            }
            for r in refs {
                if let Some(mut hit) = SearchHit::new(self.index, HitKind::Title, r.doc) {
                    if hit.title != *title {
                        hit.title = format!("{} > {}", hit.title, title);
                    }
                    hit.anchor.clone_from(&r.anchor);
                    hits.push(hit);
                }
            }
        }
        hits
    }

    /// Index entries containing the whole query, same coverage rule as titles.
    pub fn index_entries(&self, query: &Query) -> Vec<SearchHit> {
        let needle = query.text().to_lowercase();
        if needle.is_empty() {
            return vec![];
        }

        let mut hits = vec![];
        for (entry, refs) in self.index.index_entries() {
            if !covers(entry, &needle) {
                continue;
            }
            for r in refs {
                if let Some(mut hit) = SearchHit::new(self.index, HitKind::IndexEntry, r.doc) {
                    hit.anchor = (!r.anchor.is_empty()).then(|| r.anchor.clone());
                    hit.description = Some(entry.clone());
                    hits.push(hit);
                }
            }
        }
        hits
    }

    /// Runs every lookup and returns up to `limit` hits, deduplicated by link target.
    pub fn search(&self, query: &Query) -> Vec<SearchHit> {
        if query.is_empty() {
            return vec![];
        }

        let text_hits = self
            .full_text(query)
            .into_iter()
            .filter_map(|doc| SearchHit::new(self.index, HitKind::Text, doc));

        let mut seen = HashSet::new();
        self.objects(query)
            .into_iter()
            .chain(self.titles(query))
            .chain(self.index_entries(query))
            .chain(text_hits)
            .filter(|hit| seen.insert((hit.docname.clone(), hit.anchor.clone())))
            .take(self.options.limit)
            .collect()
    }
}

/// Whether `needle` occurs in `text` and is at least half its length.
fn covers(text: &str, needle: &str) -> bool {
    let lower = text.trim().to_lowercase();
    lower.contains(needle) && needle.chars().count() * 2 >= lower.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBuilder, Priority};
    use crate::search::tokenize::{Language, Tokenizer};
    use assert2::{check, let_assert};

    fn sample() -> SearchIndex {
        let mut builder = IndexBuilder::new();
        let index = builder.add_document("index", "index.rst", "Welcome");
        let lang = builder.add_document("language", "language.rst", "triton.language");
        let tut = builder.add_document("tutorial", "tutorial.rst", "Vector Addition");

        builder.index_text(index, "Triton is a language and compiler for parallel programming");
        builder.index_text(lang, "Load a tensor of data from memory pointers");
        builder.index_text(tut, "Write a vector addition kernel that loads blocks");
        builder.index_title(tut, "Vector Addition", None);
        builder.index_title(tut, "Compute Kernel", Some("compute-kernel"));
        builder.add_index_entry("load() (in module triton.language)", lang, "triton.language.load", false);

        let function = builder.register_object_type("py", "function", "Python function");
        builder.add_object("triton.language", "load", lang, function, Priority::DEFAULT, "");
        builder.add_object("triton.language", "store", lang, function, Priority::DEFAULT, "");
        builder.add_object("triton.language", "_internal", lang, function, Priority::HIDDEN, "");
        builder.build().unwrap()
    }

    fn query(text: &str) -> Query {
        Query::parse(text, &Tokenizer::new(Language::English))
    }

    fn exact(index: &SearchIndex) -> Searcher<'_> {
        Searcher::new(
            index,
            SearchOptions {
                limit: 50,
                partial_terms: false,
            },
        )
    }

    #[test]
    fn test_full_text_intersection() {
        let index = sample();
        let searcher = exact(&index);
        check!(searcher.full_text(&query("vector kernel")) == [DocId(2)]);
        check!(searcher.full_text(&query("tensor kernel")).is_empty());
        check!(searcher.full_text(&query("load")) == [DocId(1), DocId(2)]);
    }

    #[test]
    fn test_excluded_words() {
        let index = sample();
        let searcher = exact(&index);
        check!(searcher.full_text(&query("load -vector")) == [DocId(1)]);
    }

    #[test]
    fn test_unknown_term_is_empty_not_error() {
        let index = sample();
        let searcher = exact(&index);
        check!(searcher.full_text(&query("quaternion")).is_empty());
        check!(searcher.search(&query("quaternion")).is_empty());
    }

    #[test]
    fn test_partial_terms() {
        let index = sample();
        let partial = Searcher::new(&index, SearchOptions::default());
        // "program" is contained in the indexed stem of "programming"
        check!(exact(&index).full_text(&query("gram")).is_empty());
        check!(partial.full_text(&query("gram")) == [DocId(0)]);
    }

    #[test]
    fn test_partial_terms_need_three_letter_stem() {
        let index = sample();
        let partial = Searcher::new(&index, SearchOptions::default());
        // "parallel" and "addition" would contain a two-letter fragment
        let short = Token {
            raw: "ara".to_string(),
            stem: "ar".to_string(),
        };
        check!(partial.documents_for(&short).is_empty());
        let long = Token {
            raw: "arall".to_string(),
            stem: "arall".to_string(),
        };
        check!(partial.documents_for(&long) == BTreeSet::from([DocId(0)]));
    }

    #[test]
    fn test_object_hits() {
        let index = sample();
        let hits = exact(&index).objects(&query("load"));
        check!(hits.len() == 1);
        let_assert!(Some(hit) = hits.first());
        check!(hit.title == "triton.language.load");
        check!(hit.anchor.as_deref() == Some("triton.language.load"));
        check!(hit.description.as_deref() == Some("Python function, in triton.language"));
        check!(hit.target() == "language#triton.language.load");
    }

    #[test]
    fn test_object_other_terms_must_appear() {
        let index = sample();
        let searcher = exact(&index);
        check!(searcher.objects(&query("store function")).len() == 1);
        check!(searcher.objects(&query("store class")).is_empty());
    }

    #[test]
    fn test_hidden_objects_skipped() {
        let index = sample();
        check!(exact(&index).objects(&query("internal")).is_empty());
    }

    #[test]
    fn test_title_hits() {
        let index = sample();
        let hits = exact(&index).titles(&query("compute kernel"));
        check!(hits.len() == 1);
        check!(hits[0].title == "Vector Addition > Compute Kernel");
        check!(hits[0].anchor.as_deref() == Some("compute-kernel"));
        // Too short a share of the title.
        check!(exact(&index).titles(&query("com")).is_empty());
    }

    #[test]
    fn test_index_entry_hits() {
        let index = sample();
        let hits = exact(&index).index_entries(&query("load() (in module triton"));
        check!(hits.len() == 1);
        check!(hits[0].anchor.as_deref() == Some("triton.language.load"));
    }

    #[test]
    fn test_search_orders_kinds_and_dedups() {
        let index = sample();
        let hits = exact(&index).search(&query("load"));
        let kinds: Vec<_> = hits.iter().map(|h| h.kind).collect();
        check!(kinds == [HitKind::Object, HitKind::Text, HitKind::Text]);

        let limited = Searcher::new(&index, SearchOptions { limit: 1, partial_terms: false })
            .search(&query("load"));
        check!(limited.len() == 1);
    }

    #[test]
    fn test_minimal_example() {
        let mut builder = IndexBuilder::new();
        let a = builder.add_document("a", "a.rst", "A");
        builder.add_document("b", "b.rst", "B");
        builder.add_term("foo", a);
        let index = builder.build().unwrap();
        let searcher = exact(&index);

        let hits = searcher.search(&query("foo"));
        check!(hits.len() == 1);
        check!(hits[0].docname == "a");
        check!(searcher.search(&query("bar")).is_empty());
    }
}
