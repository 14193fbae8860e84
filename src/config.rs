//! Configuration file loading for nlock
//!
//! Handles JSON (default) and TOML (`.toml` extension) config files of the form
//! `{ "patterns": [...], "options": ["log", "kill"] }`.

use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{OPTION_KILL, OPTION_LOG, OPTION_MOUNT};
use crate::models::{LockConfig, LockError, MarkScope};

/// On-disk shape of an nlock config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockConfigFile {
    /// Glob patterns of files to lock
    #[serde(default, alias = "Patterns")]
    pub patterns: Option<Vec<String>>,
    /// Option tokens; unknown tokens are ignored
    #[serde(default, alias = "Options")]
    pub options: Option<Vec<String>>,
    /// Event loop wait before re-checking for shutdown
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

impl LockConfigFile {
    /// Parse config text, picking the format from the file extension
    pub fn parse(path: &Path, text: &str) -> Result<Self, LockError> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            toml::from_str(text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(text).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| LockError::ConfigParse {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Turn the file contents into a validated run configuration
    pub fn into_lock_config(self) -> Result<LockConfig, LockError> {
        let mut config = LockConfig::new(self.patterns.unwrap_or_default());

        for option in self.options.unwrap_or_default() {
            match option.as_str() {
                OPTION_LOG => config.should_log = true,
                OPTION_KILL => config.should_kill = true,
                OPTION_MOUNT => config.mark_scope = MarkScope::Mount,
                other => debug!("ignoring unknown option '{}'", other),
            }
        }

        if let Some(millis) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }
}

impl LockConfig {
    /// Load and validate a config file
    pub fn load_from_file(path: &Path) -> Result<Self, LockError> {
        let text = std::fs::read_to_string(path).map_err(|source| LockError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        LockConfigFile::parse(path, &text)?.into_lock_config()
    }
}
