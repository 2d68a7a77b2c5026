//! Shared state for loaded search indexes.
//!
//! Indexes are parsed on first use and kept in an LRU keyed by canonical path.
//! Tool handlers calling concurrently for the same file await one shared load.

use crate::config::{Config, expand_tilde};
use crate::discovery::index_file_for;
use crate::index::SearchIndex;
use crate::snapshot;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tokio::sync::{Mutex, RwLock};

/// Type alias for shared index loading futures.
type SharedLoadFuture = Shared<BoxFuture<'static, Result<Arc<LoadedIndex>, String>>>;

/// A parsed index together with where and when it was read.
#[derive(Debug)]
pub struct LoadedIndex {
    pub path: PathBuf,
    /// Modification time of the source file at load.
    pub modified: Option<SystemTime>,
    pub index: SearchIndex,
}

/// A load in progress for one version of a file.
struct PendingLoad {
    modified: Option<SystemTime>,
    future: SharedLoadFuture,
}

/// Cache of parsed indexes plus the server configuration.
pub struct IndexState {
    cache: Arc<RwLock<LruCache<PathBuf, Arc<LoadedIndex>>>>,
    in_flight: Arc<Mutex<HashMap<PathBuf, PendingLoad>>>,
    config: Arc<Config>,
}

impl std::fmt::Debug for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexState")
            .field("cache_size", &self.cache.try_read().map(|c| c.len()).ok())
            .field("in_flight_count", &self.in_flight.try_lock().map(|m| m.len()).ok())
            .field("default_index", &self.config.default_index())
            .finish()
    }
}

impl IndexState {
    pub fn new(config: Config) -> Self {
        let capacity = NonZeroUsize::new(config.index.cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Turns a tool argument into an index file path.
    ///
    /// Accepts a file or a directory holding `searchindex.js`; `~` is expanded.
    /// Without an argument the first configured index is used.
    pub fn resolve_path(&self, requested: Option<&str>) -> Result<PathBuf, String> {
        let path = match requested.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => PathBuf::from(expand_tilde(p).as_ref()),
            None => self.config.default_index().ok_or_else(|| {
                "No index given and none configured. Pass `index` (a searchindex.js file \
                 or its directory), or set index.paths in the config file."
                    .to_string()
            })?,
        };
        Ok(index_file_for(&path))
    }

    /// Get an index, loading it if it is not cached or its file changed.
    pub async fn get_index(&self, requested: Option<&str>) -> Result<Arc<LoadedIndex>, String> {
        let path = self.resolve_path(requested)?;
        let path = tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| format!("Search index not found at {}: {}", path.display(), e))?;
        let modified = modified_time(&path).await;

        // 1. Check cache, dropping entries whose file changed on disk
        {
            let mut cache = self.cache.write().await;
            if let Some(loaded) = cache.get(&path) {
                if loaded.modified == modified {
                    tracing::debug!("Cache hit for {}", path.display());
                    return Ok(loaded.clone());
                }
                tracing::info!("{} changed on disk, reloading", path.display());
                cache.pop(&path);
            }
        }

        // 2. Join an in-flight load of the same file version
        let maybe_future = {
            let in_flight = self.in_flight.lock().await;
            in_flight
                .get(&path)
                .filter(|pending| pending.modified == modified)
                .map(|pending| pending.future.clone())
        };

        if let Some(future) = maybe_future {
            tracing::debug!("Awaiting in-flight load for {}", path.display());
            return future.await;
        }

        // 3. Start a new load
        self.load(path, modified).await
    }

    /// Loads `path` and records the result.
    ///
    /// Caching and in-flight cleanup happen inside the shared future, so they
    /// still run when the caller that started the load is cancelled.
    async fn load(
        &self,
        path: PathBuf,
        modified: Option<SystemTime>,
    ) -> Result<Arc<LoadedIndex>, String> {
        let snapshot_dir = self.config.index.snapshot_dir();
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);
        let key = path.clone();

        let load_future: BoxFuture<'static, Result<Arc<LoadedIndex>, String>> =
            Box::pin(async move {
                let start = Instant::now();
                let source = key.clone();
                let result = tokio::task::spawn_blocking(move || {
                    snapshot::load_or_parse(&source, snapshot_dir.as_deref()).map(|index| {
                        LoadedIndex {
                            path: source,
                            modified,
                            index,
                        }
                    })
                })
                .await
                .map_err(|e| format!("Index loading task failed: {}", e))
                .and_then(|loaded| loaded.map_err(|e| e.to_string()))
                .map(Arc::new);

                {
                    let mut in_flight = in_flight.lock().await;
                    if in_flight.get(&key).is_some_and(|p| p.modified == modified) {
                        in_flight.remove(&key);
                    }
                }

                match &result {
                    Ok(loaded) => {
                        tracing::info!(
                            "Loaded {} ({} documents, {} terms, {} objects) in {:?}",
                            loaded.path.display(),
                            loaded.index.document_count(),
                            loaded.index.term_count(),
                            loaded.index.object_count(),
                            start.elapsed()
                        );
                        cache.write().await.put(key, Arc::clone(loaded));
                    }
                    Err(e) => tracing::warn!("Search unavailable for {}: {}", key.display(), e),
                }
                result
            });

        let shared_future = load_future.shared();

        {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.insert(
                path,
                PendingLoad {
                    modified,
                    future: shared_future.clone(),
                },
            );
        }

        shared_future.await
    }

    /// Check if an index is cached (by canonical path).
    pub async fn is_cached(&self, path: &Path) -> bool {
        self.cache.read().await.contains(path)
    }

    /// Drop every cached index.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        self.in_flight.lock().await.clear();
    }
}

async fn modified_time(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .and_then(|m| m.modified().ok())
}

/// Loads every configured index in the background so the first query is fast.
pub fn spawn_preload(state: Arc<IndexState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let paths = state.config().index.paths.clone();
        for path in paths {
            match state.get_index(Some(&path)).await {
                Ok(loaded) => tracing::debug!("Preloaded {}", loaded.path.display()),
                Err(e) => tracing::warn!("Failed to preload {}: {}", path, e),
            }
            tokio::task::yield_now().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DocId;
    use assert2::{check, let_assert};
    use tempfile::TempDir;

    const INDEX: &str = r#"Search.setIndex({"docnames":["a","b"],"filenames":["a.rst","b.rst"],"titles":["A","B"],"terms":{"foo":0},"titleterms":{},"objects":{},"objnames":{},"objtypes":{}})"#;

    fn state_for(dir: &TempDir) -> IndexState {
        let mut config = Config::default();
        config.index.paths = vec![dir.path().display().to_string()];
        config.index.snapshots = false;
        IndexState::new(config)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_load_and_cache() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("searchindex.js"), INDEX).unwrap();
        let state = state_for(&dir);

        let_assert!(Ok(first) = state.get_index(None).await);
        check!(first.index.document_count() == 2);
        check!(state.is_cached(&first.path).await);

        let_assert!(Ok(second) = state.get_index(None).await);
        check!(Arc::ptr_eq(&first, &second));

        state.clear_cache().await;
        check!(!state.is_cached(&first.path).await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_loads_share_result() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("searchindex.js"), INDEX).unwrap();
        let state = Arc::new(state_for(&dir));

        let (a, b) = tokio::join!(state.get_index(None), state.get_index(None));
        let_assert!(Ok(a) = a);
        let_assert!(Ok(b) = b);
        check!(a.index == b.index);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancelled_load_does_not_pin_index() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("searchindex.js");
        std::fs::write(&file, INDEX).unwrap();
        let state = state_for(&dir);
        let path = file.canonicalize().unwrap();

        // Poll a load once, then drop it as a cancelled request would.
        let modified = modified_time(&path).await;
        drop(state.load(path.clone(), modified).now_or_never());

        std::fs::write(&file, INDEX.replace(r#""foo":0"#, r#""newterm":1"#)).unwrap();
        let handle = std::fs::File::options().write(true).open(&file).unwrap();
        handle
            .set_modified(SystemTime::now() + std::time::Duration::from_secs(60))
            .unwrap();

        let_assert!(Ok(first) = state.get_index(None).await);
        check!(first.index.term("newterm") == [DocId(1)]);
        check!(first.index.term("foo").is_empty());
        check!(state.is_cached(&path).await);

        let_assert!(Ok(second) = state.get_index(None).await);
        check!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let state = state_for(&dir);
        let_assert!(Err(e) = state.get_index(None).await);
        check!(e.contains("not found"));

        std::fs::write(dir.path().join("searchindex.js"), r#"Search.setIndex({"docnames":[)"#).unwrap();
        let_assert!(Err(e) = state.get_index(None).await);
        check!(e.contains("Malformed search index"));
    }

    #[test]
    fn test_resolve_path() {
        let state = IndexState::new(Config::default());
        let_assert!(Err(e) = state.resolve_path(None));
        check!(e.contains("none configured"));
        let_assert!(Ok(path) = state.resolve_path(Some("/srv/docs/custom.js")));
        check!(path == PathBuf::from("/srv/docs/custom.js"));
    }
}
