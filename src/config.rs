//! Application configuration.
//!
//! Values are resolved with priority: environment variables > config file >
//! defaults. The config file is TOML, either given explicitly or looked up as
//! `config.toml` in the per-user data directory:
//!
//! - `~/Library/Application Support/fre/config.toml` (macOS)
//! - `%LOCALAPPDATA%/fre/config.toml` (Windows)
//! - `~/.local/share/fre/config.toml` (Linux)
//!
//! ```toml
//! worker_threads = 8
//! queue_capacity = 4096
//! deadline_secs = 600
//! max_content_bytes = 10485760
//! follow_links = false
//! ```

use crate::index::types::IndexConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const APP_NAME: &str = "fre";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_QUEUE_CAPACITY: usize = 1024;
const DEFAULT_DEADLINE_SECS: u64 = 60 * 60;
const DEFAULT_MAX_CONTENT_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Worker threads for indexing. 0 means one per available CPU.
    #[serde(default)]
    pub worker_threads: usize,

    /// Tasks that may wait in the queue before submission blocks
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Overall time limit for one indexing run
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Files above this size are left out of the content index
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: u64,

    #[serde(default)]
    pub follow_links: bool,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_deadline_secs() -> u64 {
    DEFAULT_DEADLINE_SECS
}

fn default_max_content_bytes() -> u64 {
    DEFAULT_MAX_CONTENT_BYTES
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            queue_capacity: default_queue_capacity(),
            deadline_secs: default_deadline_secs(),
            max_content_bytes: default_max_content_bytes(),
            follow_links: false,
        }
    }
}

impl AppConfig {
    /// Load config with priority: environment variables > config file > defaults.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if a file is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `FRE_*` overrides. Unparseable values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        override_from(&lookup, "FRE_WORKER_THREADS", &mut self.worker_threads);
        override_from(&lookup, "FRE_QUEUE_CAPACITY", &mut self.queue_capacity);
        override_from(&lookup, "FRE_DEADLINE_SECS", &mut self.deadline_secs);
        override_from(&lookup, "FRE_MAX_CONTENT_BYTES", &mut self.max_content_bytes);
        override_from(&lookup, "FRE_FOLLOW_LINKS", &mut self.follow_links);
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// Indexer settings derived from this config. Progress display is off.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            worker_threads: self.worker_threads,
            queue_capacity: self.queue_capacity,
            deadline: self.deadline(),
            max_content_bytes: self.max_content_bytes,
            follow_links: self.follow_links,
            show_progress: false,
        }
    }
}

fn override_from<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) {
    let Some(val) = lookup(key) else {
        return;
    };
    match val.trim().parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => tracing::warn!(key, value = %val, "Ignoring invalid environment override"),
    }
}

/// Per-user application data directory
pub fn app_data_dir() -> Option<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        dirs::data_dir()
    };
    base.map(|b| b.join(APP_NAME))
}

/// Where `config.toml` is looked up when no path is given
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(CONFIG_FILE))
}
