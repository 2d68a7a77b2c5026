//! Server configuration.
//!
//! Layered: built-in defaults, then a TOML file, then environment variables.
//! The file is `$SEARCHINDEX_MCP_CONFIG` when set, otherwise
//! `<config dir>/searchindex-mcp/config.toml` if it exists.

use crate::error::Result;
use crate::search::{DEFAULT_LIMIT, Language, SearchOptions};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SEARCHINDEX_MCP_CONFIG";
/// Environment variable naming one extra index path.
pub const INDEX_ENV: &str = "SEARCHINDEX_MCP_INDEX";

const APP_DIR: &str = "searchindex-mcp";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Which indexes to serve and how to cache them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// `searchindex.js` files or directories containing one. The first is the default index.
    pub paths: Vec<String>,
    /// Maximum number of parsed indexes held in memory.
    pub cache_size: usize,
    /// Write binary snapshots of parsed indexes.
    pub snapshots: bool,
    /// Where snapshots go. Defaults to the user cache directory.
    pub snapshot_dir: Option<String>,
}

fn default_cache_size() -> usize {
    16
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            cache_size: default_cache_size(),
            snapshots: true,
            snapshot_dir: None,
        }
    }
}

impl IndexConfig {
    /// Resolved snapshot directory, or `None` when snapshots are off.
    pub fn snapshot_dir(&self) -> Option<PathBuf> {
        if !self.snapshots {
            return None;
        }
        match &self.snapshot_dir {
            Some(dir) => Some(PathBuf::from(expand_tilde(dir).as_ref())),
            None => dirs::cache_dir().map(|d| d.join(APP_DIR).join("snapshots")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default maximum number of hits per query.
    pub limit: usize,
    /// Stemming language used for queries.
    pub language: Language,
    /// Also match indexed terms that merely contain a query word.
    pub partial_terms: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            language: Language::default(),
            partial_terms: true,
        }
    }
}

impl SearchConfig {
    pub fn options(&self, limit: Option<usize>) -> SearchOptions {
        SearchOptions {
            limit: limit.filter(|&l| l > 0).unwrap_or(self.limit),
            partial_terms: self.partial_terms,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl Config {
    /// Parses TOML text. Missing sections and keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML config file.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Loads the config from the environment-selected or default file, then
    /// applies environment overrides.
    pub async fn discover() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)).await?,
            None => match default_config_path() {
                Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => {
                    Self::load(&path).await?
                }
                _ => Self::default(),
            },
        };

        if let Ok(index) = std::env::var(INDEX_ENV)
            && !index.is_empty()
        {
            config.index.paths.push(index);
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.search.limit == 0 {
            anyhow::bail!("search.limit must be greater than 0");
        }
        if self.index.cache_size == 0 {
            anyhow::bail!("index.cache_size must be greater than 0");
        }
        Ok(())
    }

    /// The first configured index path, tilde-expanded.
    pub fn default_index(&self) -> Option<PathBuf> {
        self.index
            .paths
            .first()
            .map(|p| PathBuf::from(expand_tilde(p).as_ref()))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
