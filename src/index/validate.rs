//! Structural validation run on every index before it is served.

use super::model::{IndexData, TermMap};
use super::objects::ObjectLayout;
use super::postings::DocId;
use crate::error::ValidationError;
use std::collections::HashSet;

/// Checks every structural invariant, reporting the first violation.
///
/// - `docnames`, `filenames`, `titles` have equal length and docnames are unique
/// - no posting list is empty
/// - every referenced document index is in bounds
/// - every object type code is decodable, and `objtypes`/`objnames` agree
/// - object names are unique per namespace when the layout is nested
pub(crate) fn validate(data: &IndexData) -> Result<(), ValidationError> {
    let len = data.docnames.len();
    if data.filenames.len() != len || data.titles.len() != len {
        return Err(ValidationError::LengthMismatch {
            docnames: len,
            filenames: data.filenames.len(),
            titles: data.titles.len(),
        });
    }

    let mut seen = HashSet::with_capacity(len);
    for docname in &data.docnames {
        if !seen.insert(docname.as_str()) {
            return Err(ValidationError::DuplicateDocname {
                docname: docname.clone(),
            });
        }
    }

    check_terms("terms", &data.terms, len)?;
    check_terms("titleterms", &data.titleterms, len)?;

    for (namespace, entries) in &data.objects {
        for entry in entries {
            check_doc("objects", || entry.full_name(namespace), entry.doc, len)?;
            if !data.objtypes.contains_key(&entry.objtype) {
                return Err(ValidationError::UnknownObjectType {
                    name: entry.full_name(namespace),
                    code: entry.objtype,
                });
            }
        }
        if data.object_layout == ObjectLayout::Nested {
            let mut names = HashSet::with_capacity(entries.len());
            if let Some(dup) = entries.iter().find(|e| !names.insert(e.name.as_str())) {
                return Err(ValidationError::MalformedEntry {
                    section: "objects",
                    key: dup.full_name(namespace),
                    reason: "nested layout holds one entry per name".to_string(),
                });
            }
        }
    }

    for (title, refs) in &data.alltitles {
        if refs.is_empty() {
            return Err(ValidationError::EmptyPostings {
                section: "alltitles",
                key: title.clone(),
            });
        }
        for r in refs {
            check_doc("alltitles", || title.clone(), r.doc, len)?;
        }
    }

    for (entry, refs) in &data.indexentries {
        if refs.is_empty() {
            return Err(ValidationError::EmptyPostings {
                section: "indexentries",
                key: entry.clone(),
            });
        }
        for r in refs {
            check_doc("indexentries", || entry.clone(), r.doc, len)?;
        }
    }

    Ok(())
}

fn check_terms(section: &'static str, terms: &TermMap, len: usize) -> Result<(), ValidationError> {
    for (term, postings) in terms {
        // Postings are sorted, so the maximum is the only candidate for overflow.
        let Some(max) = postings.max() else {
            return Err(ValidationError::EmptyPostings {
                section,
                key: term.clone(),
            });
        };
        check_doc(section, || term.clone(), max, len)?;
    }
    Ok(())
}

fn check_doc(
    section: &'static str,
    key: impl FnOnce() -> String,
    doc: DocId,
    len: usize,
) -> Result<(), ValidationError> {
    if doc.index() < len {
        Ok(())
    } else {
        Err(ValidationError::DanglingDocument {
            section,
            key: key(),
            doc: doc.0,
            len,
        })
    }
}
