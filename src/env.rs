//! Environment snapshot consulted at descriptor construction

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, Result};

/// Environment file read from the config directory
pub const DOTENV_FILE: &str = ".env";

/// Variables the descriptor reads.
pub const KEYS: [&str; 5] = ["NODE_ENV", "PORT", "HOST", "POWERED", "PACKDESC_PROFILE"];

/// Immutable copy of the environment taken before a build run.
///
/// Reading through a snapshot keeps construction pure: the same config
/// and snapshot always yield the same descriptor.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the relevant variables from the current process
    pub fn from_process() -> Self {
        let vars = KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self { vars }
    }

    /// Capture the process environment, then fill gaps from `root/.env`
    pub fn from_process_with_dotenv(root: &Path) -> Result<Self> {
        Self::from_process().with_dotenv(root)
    }

    /// Add variables from `root/.env` if that file exists
    ///
    /// Variables already present in the snapshot are never overridden.
    pub fn with_dotenv(mut self, root: &Path) -> Result<Self> {
        let path = root.join(DOTENV_FILE);
        if !path.is_file() {
            return Ok(self);
        }

        let to_error = |source: dotenvy::Error| ConfigError::DotEnv {
            path: path.clone(),
            source,
        };

        for item in dotenvy::from_path_iter(&path).map_err(to_error)? {
            let (key, value) = item.map_err(to_error)?;
            if KEYS.contains(&key.as_str()) && !self.vars.contains_key(&key) {
                debug!("Using {} from {}", key, path.display());
                self.vars.insert(key, value);
            }
        }

        Ok(self)
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable, treating empty values as unset
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}
