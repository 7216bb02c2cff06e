//! Configuration source for Strata
//!
//! Stack configuration (deployment parameters like `sqlPassword` or
//! `codeLocation`) comes from two places, environment winning over file:
//!
//! 1. `STRATA_CONFIG_<KEY>` environment variables (key uppercased)
//! 2. A discovered stack file, searched in order:
//!    - `STRATA_CONFIG_PATH` (direct path)
//!    - `./strata.json`
//!    - `./.strata/strata.json`
//!    - `~/.config/strata/strata.json`
//!
//! The result is an explicit [`Config`] value handed to the topology,
//! never process-global state.

pub mod error;

pub use error::*;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const STACK_FILE: &str = "strata.json";
const ENV_PREFIX: &str = "STRATA_CONFIG_";

/// Resolved stack configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<String, String>,
    source: Option<PathBuf>,
}

impl Config {
    /// Load from the discovered stack file plus environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match find_stack_file() {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("No stack file found, environment only");
                Self::default()
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Read a stack file directly (no environment overlay)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let parsed: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidStackFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let object = parsed
            .as_object()
            .ok_or_else(|| ConfigError::InvalidStackFile {
                path: path.to_path_buf(),
                message: "expected a JSON object of key/value pairs".to_string(),
            })?;

        let mut values = HashMap::new();
        for (key, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            values.insert(key.clone(), text);
        }

        debug!(path = %path.display(), keys = values.len(), "Loaded stack file");
        Ok(Self {
            values,
            source: Some(path.to_path_buf()),
        })
    }

    /// Build from explicit pairs (tests, embedding)
    pub fn from_values<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            source: None,
        }
    }

    /// Overlay `STRATA_CONFIG_<KEY>` environment variables
    fn apply_env(&mut self) {
        for (name, value) in std::env::vars() {
            if name == "STRATA_CONFIG_PATH" {
                continue;
            }
            if let Some(key) = name.strip_prefix(ENV_PREFIX) {
                // Env names are uppercase; match declared keys
                // case-insensitively, else take the env spelling.
                let key = self
                    .values
                    .keys()
                    .find(|k| k.to_uppercase() == key)
                    .cloned()
                    .unwrap_or_else(|| key.to_string());
                self.values.insert(key, value);
            }
        }
    }

    /// Fetch a required key, failing with [`ConfigError::MissingKey`]
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::missing(key))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .or_else(|| {
                // Env overlay may have registered the uppercase spelling.
                self.values.get(&key.to_uppercase())
            })
            .map(String::as_str)
    }

    /// Path of the stack file this config came from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Locate the stack file, if any
///
/// Search order: `STRATA_CONFIG_PATH`, current directory, `./.strata/`,
/// `~/.config/strata/`.
pub fn find_stack_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("STRATA_CONFIG_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let current_dir = std::env::current_dir().ok()?;
    let local = current_dir.join(STACK_FILE);
    if local.exists() {
        return Some(local);
    }

    let hidden = current_dir.join(".strata").join(STACK_FILE);
    if hidden.exists() {
        return Some(hidden);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("strata").join(STACK_FILE);
        if global.exists() {
            return Some(global);
        }
    }

    None
}
