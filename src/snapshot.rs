//! Binary snapshots of parsed indexes.
//!
//! Parsing a large `searchindex.js` is dominated by JSON decoding. A snapshot
//! stores the validated index in postcard form next to a fingerprint of the
//! source bytes; a later load with the same bytes skips parsing entirely.

use crate::codec;
use crate::error::LoadError;
use crate::index::SearchIndex;
use postcard::{from_bytes, to_io};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// Bumped whenever the in-memory layout of [`SearchIndex`] changes.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    fingerprint: u64,
    index: SearchIndex,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    fingerprint: u64,
    index: &'a SearchIndex,
}

/// Snapshot file for `source` inside `dir`, named by a hash of the source path.
pub fn snapshot_path(dir: &Path, source: &Path) -> PathBuf {
    let key = xxh3_64(source.as_os_str().as_encoded_bytes());
    dir.join(format!("{:016x}.snapshot", key))
}

/// Loads the index at `source`, going through a snapshot in `snapshot_dir` when given.
///
/// Snapshot problems never fail the load: a stale or unreadable snapshot is
/// replaced, and a snapshot that cannot be written is skipped with a warning.
pub fn load_or_parse(source: &Path, snapshot_dir: Option<&Path>) -> Result<SearchIndex, LoadError> {
    let bytes = codec::read_bytes(source)?;
    let Some(dir) = snapshot_dir else {
        return codec::parse_bytes(&bytes);
    };

    let fingerprint = xxh3_64(&bytes);
    let path = snapshot_path(dir, source);

    if let Some(index) = read_snapshot(&path, fingerprint) {
        tracing::debug!("Using snapshot {} for {}", path.display(), source.display());
        return Ok(index);
    }

    let index = codec::parse_bytes(&bytes)?;
    write_snapshot(&path, fingerprint, &index);
    Ok(index)
}

fn read_snapshot(path: &Path, fingerprint: u64) -> Option<SearchIndex> {
    let bytes = std::fs::read(path).ok()?;

    match from_bytes::<Snapshot>(&bytes) {
        Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION && snapshot.fingerprint == fingerprint => {
            Some(snapshot.index)
        }
        Ok(_) => {
            tracing::debug!("Snapshot {} is stale, discarding", path.display());
            let _ = std::fs::remove_file(path);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read snapshot {}: {}", path.display(), e);
            let _ = std::fs::remove_file(path);
            None
        }
    }
}

fn write_snapshot(path: &Path, fingerprint: u64, index: &SearchIndex) {
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::warn!("Failed to create snapshot directory {}: {}", parent.display(), e);
        return;
    }

    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        fingerprint,
        index,
    };
    let tmp = path.with_extension("snapshot.tmp");
    let result = std::fs::File::create(&tmp)
        .map_err(|e| e.to_string())
        .and_then(|mut file| to_io(&snapshot, &mut file).map(drop).map_err(|e| e.to_string()))
        .and_then(|()| std::fs::rename(&tmp, path).map_err(|e| e.to_string()));

    match result {
        Ok(()) => tracing::debug!("Wrote snapshot {}", path.display()),
        Err(e) => {
            tracing::warn!("Failed to write snapshot {}: {}", path.display(), e);
            let _ = std::fs::remove_file(&tmp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DocId, IndexData, Postings};
    use assert2::{check, let_assert};
    use tempfile::TempDir;

    const SOURCE: &str = r#"Search.setIndex({"docnames":["a"],"filenames":["a.rst"],"titles":["A"],"terms":{"foo":0},"titleterms":{},"objects":{},"objnames":{},"objtypes":{}})"#;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("searchindex.js");
        std::fs::write(&source, SOURCE).unwrap();
        let snapshots = dir.path().join("snapshots");
        (dir, source, snapshots)
    }

    #[test]
    fn test_snapshot_written_and_reused() {
        let (_dir, source, snapshots) = setup();

        let_assert!(Ok(first) = load_or_parse(&source, Some(&snapshots)));
        let path = snapshot_path(&snapshots, &source);
        check!(path.exists());

        let_assert!(Ok(second) = load_or_parse(&source, Some(&snapshots)));
        check!(first == second);
        check!(second.term("foo") == [DocId(0)]);
    }

    #[test]
    fn test_stale_snapshot_replaced() {
        let (_dir, source, snapshots) = setup();
        load_or_parse(&source, Some(&snapshots)).unwrap();

        std::fs::write(&source, SOURCE.replace("\"foo\"", "\"bar\"")).unwrap();
        let_assert!(Ok(index) = load_or_parse(&source, Some(&snapshots)));
        check!(index.term("foo").is_empty());
        check!(index.term("bar") == [DocId(0)]);
    }

    #[test]
    fn test_corrupt_snapshot_ignored() {
        let (_dir, source, snapshots) = setup();
        std::fs::create_dir_all(&snapshots).unwrap();
        std::fs::write(snapshot_path(&snapshots, &source), b"not a snapshot").unwrap();

        let_assert!(Ok(index) = load_or_parse(&source, Some(&snapshots)));
        check!(index.document_count() == 1);
    }

    #[test]
    fn test_inconsistent_snapshot_rejected() {
        #[derive(Serialize)]
        struct Forged {
            version: u32,
            fingerprint: u64,
            index: IndexData,
        }

        let (_dir, source, snapshots) = setup();
        let mut index = IndexData {
            docnames: vec!["a".to_string()],
            ..IndexData::default()
        };
        index
            .terms
            .insert("foo".to_string(), Postings::single(DocId(9)));
        let forged = Forged {
            version: SNAPSHOT_VERSION,
            fingerprint: xxh3_64(SOURCE.as_bytes()),
            index,
        };
        let path = snapshot_path(&snapshots, &source);
        std::fs::create_dir_all(&snapshots).unwrap();
        std::fs::write(&path, postcard::to_stdvec(&forged).unwrap()).unwrap();

        check!(read_snapshot(&path, forged.fingerprint).is_none());
        let_assert!(Ok(loaded) = load_or_parse(&source, Some(&snapshots)));
        check!(loaded.term("foo") == [DocId(0)]);
        check!(loaded.validate().is_ok());
    }

    #[test]
    fn test_without_snapshot_dir() {
        let (_dir, source, snapshots) = setup();
        let_assert!(Ok(_) = load_or_parse(&source, None));
        check!(!snapshots.exists());
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("searchindex.js");
        let_assert!(Err(LoadError::NotFound { .. }) = load_or_parse(&missing, None));
    }
}
