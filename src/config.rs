use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::source::{AssemblyLimits, WIKIPEDIA_RANDOM_SUMMARY};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub rows: usize,
    pub cols: usize,
    pub min_words: usize,
    pub summary_url: String,
    pub transliterate: bool,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub max_fetches: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            min_words: 100,
            summary_url: WIKIPEDIA_RANDOM_SUMMARY.to_string(),
            transliterate: true,
            request_timeout_secs: 10,
            poll_interval_ms: 100,
            max_fetches: 20,
        }
    }
}

impl Config {
    pub fn assembly_limits(&self) -> AssemblyLimits {
        AssemblyLimits {
            min_words: self.min_words,
            cols: self.cols,
            max_fetches: self.max_fetches,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "wikitype") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("wikitype_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => warn!(path = %self.path.display(), error = %e, "ignoring unreadable config"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
