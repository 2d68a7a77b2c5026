//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Every test gets its own temporary directory holding a small generated
//! documentation site, and its own `IndexState` with an empty in-memory LRU
//! cache. Snapshots are disabled unless a test opts in, so no test sees
//! another test's cache files.

use rstest::fixture;
use searchindex_mcp::{Config, IndexState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Index of a three-page site: flat objects, section titles, index entries.
///
/// Page 0 `index`: "Triton is a language and compiler for writing kernels"
/// Page 1 `install`: "Installation: pip install triton, then compile"
/// Page 2 `language`: "Load a tensor from memory inside a kernel"
#[allow(dead_code)]
pub const SAMPLE_INDEX: &str = r#"Search.setIndex({"alltitles":{"Installation":[[1,null]],"Loading data":[[2,"loading-data"]],"Welcome":[[0,null]]},"docnames":["index","install","language"],"envversion":{"sphinx":61,"sphinx.domains.python":4},"filenames":["index.rst","install.rst","language.rst"],"indexentries":{"load() (in module triton.language)":[[2,"triton.language.load",false]]},"objects":{"triton.language":[[2,0,1,"","load"],[2,0,1,"","store"],[2,1,-1,"-","internal"]]},"objnames":{"0":["py","function","Python function"],"1":["py","class","Python class"]},"objtypes":{"0":"py:function","1":"py:class"},"terms":{"compil":[0,1],"instal":1,"kernel":[0,2],"load":2,"memori":2,"pip":1,"tensor":2,"triton":[0,1,2]},"titles":["Welcome","Installation","triton.language"],"titleterms":{"instal":1,"languag":2,"triton":2,"welcom":0}})"#;

/// Index in the older unquoted-key format, with nested objects and a legacy env version.
#[allow(dead_code)]
pub const LEGACY_INDEX: &str = r#"Search.setIndex({docnames:["index","usage"],envversion:42,filenames:["index.txt","usage.txt"],objects:{"":{compile:[1,0,1,""]}},objnames:{"0":["py","function","Python function"]},objtypes:{"0":"py:function"},terms:{compil:[0,1],usag:1},titles:["Overview","Usage"],titleterms:{usag:1}})"#;

/// A temporary workspace directory for test isolation.
///
/// Provides basic filesystem operations within a temp directory that is
/// automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content within this workspace.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
        full_path
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A generated site in a temp directory plus server state pointing at it.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct SampleSite {
    pub workspace: TempWorkspace,
    pub state: Arc<IndexState>,
}

#[allow(dead_code)]
impl SampleSite {
    /// Site whose `_build/html/searchindex.js` holds `index_text`.
    pub fn with_index(index_text: &str) -> Self {
        Self::with_config(index_text, |_| {})
    }

    /// Like [`with_index`](Self::with_index), with a chance to adjust the config.
    pub fn with_config(index_text: &str, adjust: impl FnOnce(&mut Config)) -> Self {
        let workspace = TempWorkspace::new();
        workspace.create_file("_build/html/searchindex.js", index_text);

        let mut config = Config::default();
        config.index.paths = vec![workspace.path().join("_build/html").display().to_string()];
        config.index.snapshots = false;
        adjust(&mut config);

        Self {
            workspace,
            state: Arc::new(IndexState::new(config)),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.workspace.path().join("_build/html/searchindex.js")
    }
}

/// The three-page sample site, isolated per test.
#[fixture]
pub fn sample_site() -> SampleSite {
    SampleSite::with_index(SAMPLE_INDEX)
}
