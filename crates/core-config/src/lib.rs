//! Configuration loading and parsing.
//!
//! Parses `retrace.toml` (or an override path provided by the host)
//! extracting the `[history]` table: `max_depth` bounds the undo stack
//! (default 200, FIFO eviction beyond it) and `coalesce_whitespace`
//! controls whether a whitespace run following a line break merges into
//! the surrounding typing run (default true, matching auto-indent
//! expectations).
//!
//! Unknown fields are ignored (TOML deserialization tolerance) so hosts
//! can keep engine settings inside a larger config file. A missing or
//! unparsable file falls back to defaults; hosts embedding the engine
//! should never fail to start over history tuning.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Default undo stack bound when no config is present.
pub const DEFAULT_MAX_DEPTH: usize = 200;

#[derive(Debug, Deserialize, Clone)]
pub struct HistorySection {
    #[serde(default = "HistorySection::default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "HistorySection::default_coalesce_whitespace")]
    pub coalesce_whitespace: bool,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            max_depth: Self::default_max_depth(),
            coalesce_whitespace: Self::default_coalesce_whitespace(),
        }
    }
}

impl HistorySection {
    const fn default_max_depth() -> usize {
        DEFAULT_MAX_DEPTH
    }
    const fn default_coalesce_whitespace() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub history: HistorySection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

impl Config {
    /// History settings as a plain value the engine crate can consume
    /// without depending on the file representation.
    pub fn history(&self) -> HistorySection {
        self.file.history.clone()
    }
}

/// Best-effort config path following platform conventions (XDG / AppData
/// Roaming): prefer a local `retrace.toml` before the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("retrace.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("retrace").join("retrace.toml");
    }
    // Final fallback relative filename.
    PathBuf::from("retrace.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(
                    target: "config",
                    path = %path.display(),
                    max_depth = file.history.max_depth,
                    coalesce_whitespace = file.history.coalesce_whitespace,
                    "config_loaded"
                );
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}
