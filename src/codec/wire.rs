//! Serde shapes of the index object literal and conversion to the data model.

use crate::error::ValidationError;
use crate::index::{
    DocId, EnvVersion, IndexData, IndexEntryRef, ObjectEntry, ObjectLayout, ObjectType, Postings,
    Priority, SearchIndex, TermMap, TitleRef,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The object literal exactly as written, keys in sorted order.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RawIndex {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    alltitles: BTreeMap<String, Vec<(u32, Option<String>)>>,
    docnames: Vec<String>,
    #[serde(default)]
    envversion: RawEnvVersion,
    filenames: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    indexentries: BTreeMap<String, Vec<Vec<Value>>>,
    #[serde(default)]
    objects: BTreeMap<String, RawNamespace>,
    #[serde(default)]
    objnames: BTreeMap<String, (String, String, String)>,
    #[serde(default)]
    objtypes: BTreeMap<String, String>,
    terms: BTreeMap<String, Postings>,
    titles: Vec<String>,
    #[serde(default)]
    titleterms: BTreeMap<String, Postings>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawEnvVersion {
    Legacy(u32),
    Modules(BTreeMap<String, u32>),
}

impl Default for RawEnvVersion {
    fn default() -> Self {
        Self::Modules(BTreeMap::new())
    }
}

/// `(doc, objtype, priority, anchor)` keyed by name, or `(doc, objtype, priority, anchor, name)` in a list.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawNamespace {
    Nested(BTreeMap<String, (u32, u32, i8, String)>),
    Flat(Vec<(u32, u32, i8, String, String)>),
}

impl RawIndex {
    /// Converts to the data model. Structural invariants are checked later by validation;
    /// this only rejects shapes the model cannot represent.
    pub(crate) fn into_data(self) -> Result<IndexData, ValidationError> {
        let objtypes = merge_object_types(self.objtypes, self.objnames)?;
        let (objects, object_layout) = convert_objects(self.objects)?;

        let alltitles = self
            .alltitles
            .into_iter()
            .map(|(title, refs)| {
                let refs = refs
                    .into_iter()
                    .map(|(doc, anchor)| TitleRef {
                        doc: DocId(doc),
                        anchor,
                    })
                    .collect();
                (title, refs)
            })
            .collect();

        let indexentries = self
            .indexentries
            .into_iter()
            .map(|(entry, refs)| {
                let refs = refs
                    .iter()
                    .map(|r| parse_index_entry(&entry, r))
                    .collect::<Result<_, _>>()?;
                Ok((entry, refs))
            })
            .collect::<Result<_, ValidationError>>()?;

        Ok(IndexData {
            docnames: self.docnames,
            filenames: self.filenames,
            titles: self.titles,
            terms: into_term_map(self.terms),
            titleterms: into_term_map(self.titleterms),
            objects,
            object_layout,
            objtypes,
            envversion: match self.envversion {
                RawEnvVersion::Legacy(v) => EnvVersion::Legacy(v),
                RawEnvVersion::Modules(m) => EnvVersion::Modules(m),
            },
            alltitles,
            indexentries,
        })
    }

    pub(crate) fn from_index(index: &SearchIndex) -> Self {
        let data = index.data();

        let mut objtypes = BTreeMap::new();
        let mut objnames = BTreeMap::new();
        for (code, t) in &data.objtypes {
            objtypes.insert(code.to_string(), t.role.clone());
            objnames.insert(
                code.to_string(),
                (t.domain.clone(), t.name.clone(), t.label.clone()),
            );
        }

        let objects = data
            .objects
            .iter()
            .map(|(namespace, entries)| {
                let raw = match data.object_layout {
                    ObjectLayout::Nested => RawNamespace::Nested(
                        entries
                            .iter()
                            .map(|e| (e.name.clone(), (e.doc.0, e.objtype, e.priority.0, e.anchor.clone())))
                            .collect(),
                    ),
                    ObjectLayout::Flat => RawNamespace::Flat(
                        entries
                            .iter()
                            .map(|e| (e.doc.0, e.objtype, e.priority.0, e.anchor.clone(), e.name.clone()))
                            .collect(),
                    ),
                };
                (namespace.clone(), raw)
            })
            .collect();

        Self {
            alltitles: data
                .alltitles
                .iter()
                .map(|(title, refs)| {
                    let refs = refs.iter().map(|r| (r.doc.0, r.anchor.clone())).collect();
                    (title.clone(), refs)
                })
                .collect(),
            docnames: data.docnames.clone(),
            envversion: match &data.envversion {
                EnvVersion::Legacy(v) => RawEnvVersion::Legacy(*v),
                EnvVersion::Modules(m) => RawEnvVersion::Modules(m.clone()),
            },
            filenames: data.filenames.clone(),
            indexentries: data
                .indexentries
                .iter()
                .map(|(entry, refs)| {
                    let refs = refs
                        .iter()
                        .map(|r| vec![Value::from(r.doc.0), Value::from(r.anchor.clone()), Value::from(r.main)])
                        .collect();
                    (entry.clone(), refs)
                })
                .collect(),
            objects,
            objnames,
            objtypes,
            terms: sorted_terms(&data.terms),
            titles: data.titles.clone(),
            titleterms: sorted_terms(&data.titleterms),
        }
    }
}

fn into_term_map(terms: BTreeMap<String, Postings>) -> TermMap {
    terms.into_iter().collect()
}

fn sorted_terms(terms: &TermMap) -> BTreeMap<String, Postings> {
    terms.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn parse_code(section: &'static str, key: &str) -> Result<u32, ValidationError> {
    key.parse().map_err(|_| ValidationError::BadTypeCode {
        section,
        key: key.to_string(),
    })
}

fn merge_object_types(
    objtypes: BTreeMap<String, String>,
    objnames: BTreeMap<String, (String, String, String)>,
) -> Result<BTreeMap<u32, ObjectType>, ValidationError> {
    let mut roles = BTreeMap::new();
    for (key, role) in objtypes {
        roles.insert(parse_code("objtypes", &key)?, role);
    }

    let mut merged = BTreeMap::new();
    for (key, (domain, name, label)) in objnames {
        let code = parse_code("objnames", &key)?;
        let role = roles
            .remove(&code)
            .ok_or(ValidationError::ObjectTypeMismatch { code })?;
        merged.insert(
            code,
            ObjectType {
                role,
                domain,
                name,
                label,
            },
        );
    }

    if let Some(&code) = roles.keys().next() {
        return Err(ValidationError::ObjectTypeMismatch { code });
    }
    Ok(merged)
}

fn convert_objects(
    objects: BTreeMap<String, RawNamespace>,
) -> Result<(BTreeMap<String, Vec<ObjectEntry>>, ObjectLayout), ValidationError> {
    let mut layout = None;
    let mut converted = BTreeMap::new();

    for (namespace, raw) in objects {
        let (entries, this_layout): (Vec<ObjectEntry>, _) = match raw {
            RawNamespace::Nested(map) => (
                map.into_iter()
                    .map(|(name, (doc, objtype, priority, anchor))| ObjectEntry {
                        name,
                        doc: DocId(doc),
                        objtype,
                        priority: Priority(priority),
                        anchor,
                    })
                    .collect(),
                ObjectLayout::Nested,
            ),
            RawNamespace::Flat(list) => (
                list.into_iter()
                    .map(|(doc, objtype, priority, anchor, name)| ObjectEntry {
                        name,
                        doc: DocId(doc),
                        objtype,
                        priority: Priority(priority),
                        anchor,
                    })
                    .collect(),
                ObjectLayout::Flat,
            ),
        };

        // An empty namespace is ambiguous (`{}` vs `[]`) and does not vote.
        if !entries.is_empty() {
            match layout {
                None => layout = Some(this_layout),
                Some(seen) if seen != this_layout => {
                    return Err(ValidationError::MalformedEntry {
                        section: "objects",
                        key: namespace,
                        reason: "namespaces mix nested and flat layouts".to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        converted.insert(namespace, entries);
    }

    Ok((converted, layout.unwrap_or_default()))
}

/// `[doc, anchor, main]` where `main` may be a bool, 0/1, or absent.
fn parse_index_entry(entry: &str, raw: &[Value]) -> Result<IndexEntryRef, ValidationError> {
    let malformed = |reason: &str| ValidationError::MalformedEntry {
        section: "indexentries",
        key: entry.to_string(),
        reason: reason.to_string(),
    };

    let doc = raw
        .first()
        .and_then(Value::as_u64)
        .and_then(|d| u32::try_from(d).ok())
        .ok_or_else(|| malformed("first element must be a document index"))?;
    let anchor = match raw.get(1) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(_) => return Err(malformed("second element must be an anchor string")),
    };
    let main = match raw.get(2) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_u64().is_some_and(|n| n != 0),
        Some(Value::Null) | None => false,
        Some(_) => return Err(malformed("third element must be a bool")),
    };

    Ok(IndexEntryRef {
        doc: DocId(doc),
        anchor,
        main,
    })
}
