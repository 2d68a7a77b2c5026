//! Write-once construction of a search index.

use super::model::{EnvVersion, IndexData, IndexEntryRef, SearchIndex, TitleRef};
use super::objects::{ObjectEntry, ObjectLayout, ObjectType, Priority};
use super::postings::DocId;
use crate::error::ValidationError;
use crate::search::tokenize::{Language, Tokenizer};

/// Builder for accumulating documents, terms and objects before validation.
///
/// Text passed to [`index_text`](Self::index_text) and
/// [`index_title`](Self::index_title) goes through the same [`Tokenizer`]
/// queries use, so a word found on a page is found by a search for it.
pub struct IndexBuilder {
    data: IndexData,
    tokenizer: Tokenizer,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::with_language(Language::default())
    }

    pub fn with_language(language: Language) -> Self {
        Self {
            data: IndexData::default(),
            tokenizer: Tokenizer::new(language),
        }
    }

    /// Appends a document and returns its index.
    pub fn add_document(
        &mut self,
        docname: impl Into<String>,
        filename: impl Into<String>,
        title: impl Into<String>,
    ) -> DocId {
        let id = DocId(self.data.docnames.len() as u32);
        self.data.docnames.push(docname.into());
        self.data.filenames.push(filename.into());
        self.data.titles.push(title.into());
        id
    }

    /// Records a pre-normalized term for a document.
    pub fn add_term(&mut self, term: impl Into<String>, doc: DocId) {
        self.data.terms.entry(term.into()).or_default().insert(doc);
    }

    pub fn add_title_term(&mut self, term: impl Into<String>, doc: DocId) {
        self.data.titleterms.entry(term.into()).or_default().insert(doc);
    }

    /// Tokenizes body text and records each stemmed word.
    pub fn index_text(&mut self, doc: DocId, text: &str) {
        for token in self.tokenizer.tokenize(text) {
            self.add_term(token.stem, doc);
        }
    }

    /// Records a page or section title: its words go to `titleterms`, the
    /// title itself to `alltitles`.
    pub fn index_title(&mut self, doc: DocId, title: &str, anchor: Option<&str>) {
        for token in self.tokenizer.tokenize(title) {
            self.add_title_term(token.stem, doc);
        }
        self.add_section_title(title, doc, anchor);
    }

    pub fn add_section_title(&mut self, title: impl Into<String>, doc: DocId, anchor: Option<&str>) {
        self.data
            .alltitles
            .entry(title.into())
            .or_default()
            .push(TitleRef {
                doc,
                anchor: anchor.map(str::to_string),
            });
    }

    pub fn add_index_entry(&mut self, entry: impl Into<String>, doc: DocId, anchor: &str, main: bool) {
        self.data
            .indexentries
            .entry(entry.into())
            .or_default()
            .push(IndexEntryRef {
                doc,
                anchor: anchor.to_string(),
                main,
            });
    }

    /// Registers an object type and returns its code. Re-registering a role returns the existing code.
    pub fn register_object_type(&mut self, domain: &str, name: &str, label: &str) -> u32 {
        let role = format!("{}:{}", domain, name);
        if let Some((&code, _)) = self.data.objtypes.iter().find(|(_, t)| t.role == role) {
            return code;
        }
        let code = self.data.objtypes.len() as u32;
        self.data.objtypes.insert(
            code,
            ObjectType {
                role,
                domain: domain.to_string(),
                name: name.to_string(),
                label: label.to_string(),
            },
        );
        code
    }

    pub fn add_object(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        doc: DocId,
        objtype: u32,
        priority: Priority,
        anchor: impl Into<String>,
    ) {
        self.data
            .objects
            .entry(namespace.into())
            .or_default()
            .push(ObjectEntry {
                name: name.into(),
                doc,
                objtype,
                priority,
                anchor: anchor.into(),
            });
    }

    pub fn set_env_version(&mut self, envversion: EnvVersion) {
        self.data.envversion = envversion;
    }

    pub fn set_object_layout(&mut self, layout: ObjectLayout) {
        self.data.object_layout = layout;
    }

    /// Validates and freezes the index.
    pub fn build(mut self) -> Result<SearchIndex, ValidationError> {
        for entries in self.data.objects.values_mut() {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }
        let index = SearchIndex::try_from_data(self.data)?;
        tracing::debug!(
            "Built search index: {} documents, {} terms, {} objects",
            index.document_count(),
            index.term_count(),
            index.object_count()
        );
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    #[test]
    fn test_index_text_stems_and_drops_stop_words() {
        let mut builder = IndexBuilder::new();
        let doc = builder.add_document("install", "install.rst", "Installation");
        builder.index_text(doc, "Installing the compiler from source");
        let index = builder.build().unwrap();

        check!(index.term("instal") == [doc]);
        check!(index.term("compil") == [doc]);
        check!(index.term("sourc") == [doc]);
        check!(index.term("the").is_empty());
    }

    #[test]
    fn test_index_title_feeds_titleterms_and_alltitles() {
        let mut builder = IndexBuilder::new();
        let doc = builder.add_document("index", "index.rst", "Welcome");
        builder.index_title(doc, "Getting Started", Some("getting-started"));
        let index = builder.build().unwrap();

        check!(index.title_term("start") == [doc]);
        let_assert!(Some(refs) = index.all_titles().get("Getting Started"));
        check!(refs[0].anchor.as_deref() == Some("getting-started"));
    }

    #[test]
    fn test_register_object_type_is_idempotent() {
        let mut builder = IndexBuilder::new();
        let f = builder.register_object_type("py", "function", "Python function");
        let c = builder.register_object_type("py", "class", "Python class");
        check!(f == 0);
        check!(c == 1);
        check!(builder.register_object_type("py", "function", "Python function") == f);
    }

    #[test]
    fn test_build_rejects_unknown_object_type() {
        let mut builder = IndexBuilder::new();
        let doc = builder.add_document("a", "a.rst", "A");
        builder.add_object("pkg", "thing", doc, 7, Priority::DEFAULT, "");
        let_assert!(Err(ValidationError::UnknownObjectType { code: 7, .. }) = builder.build());
    }

    #[test]
    fn test_terms_are_deduplicated() {
        let mut builder = IndexBuilder::new();
        let doc = builder.add_document("a", "a.rst", "A");
        builder.index_text(doc, "kernel kernel kernels");
        let index = builder.build().unwrap();
        check!(index.term("kernel") == [doc]);
    }

    #[test]
    fn test_nested_layout_rejects_shared_names() {
        let build = |layout| {
            let mut builder = IndexBuilder::new();
            let a = builder.add_document("a", "a.rst", "A");
            let b = builder.add_document("b", "b.rst", "B");
            let function = builder.register_object_type("py", "function", "Python function");
            let method = builder.register_object_type("py", "method", "Python method");
            builder.add_object("pkg", "run", a, function, Priority::DEFAULT, "");
            builder.add_object("pkg", "run", b, method, Priority::DEFAULT, "");
            builder.set_object_layout(layout);
            builder.build()
        };

        let_assert!(Ok(flat) = build(ObjectLayout::Flat));
        check!(flat.object_count() == 2);
        let_assert!(Ok(dumped) = crate::codec::dump(&flat));
        let_assert!(Ok(reloaded) = crate::codec::parse(&dumped));
        check!(reloaded == flat);
        let_assert!(Err(ValidationError::MalformedEntry { key, .. }) = build(ObjectLayout::Nested));
        check!(key == "pkg.run");
    }
}
