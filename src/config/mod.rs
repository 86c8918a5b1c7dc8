//! Configuration handling
//!
//! Parses `packdesc.toml` files into the raw, unvalidated schema. Validation
//! happens when a [`BuildDescriptor`](crate::descriptor::BuildDescriptor) is
//! built from it.

mod schema;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::Mode;
use crate::error::{ConfigError, Result};

pub use schema::*;

/// Default config file name
pub const CONFIG_FILE: &str = "packdesc.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Build mode; `NODE_ENV` takes precedence when set
    #[serde(default)]
    pub mode: Option<Mode>,

    /// Directory the entry point is resolved against
    #[serde(default = "default_context")]
    pub context: String,

    /// Module graph root
    #[serde(default)]
    pub entry: Option<String>,

    /// Output configuration
    #[serde(default)]
    pub output: OutputSection,

    /// Development server settings
    #[serde(default)]
    pub dev_server: DevServerSection,

    /// Named dev server variants
    #[serde(default)]
    pub profiles: BTreeMap<String, DevServerOverrides>,

    /// Transform rules, first match wins
    #[serde(default)]
    pub rules: Vec<RuleSection>,

    /// Minimizer plugins
    #[serde(default)]
    pub optimization: Vec<PluginSection>,

    /// HTML page to emit
    #[serde(default)]
    pub html: Option<HtmlSection>,

    /// Root directory (computed from config file location)
    #[serde(skip)]
    pub root: PathBuf,
}

fn default_context() -> String {
    "src".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let canonical_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?
                .join(path)
        };

        let content = fs::read_to_string(&canonical_path).map_err(|source| ConfigError::Io {
            path: canonical_path.clone(),
            source,
        })?;

        // Set root directory to the directory containing the config file
        let root = canonical_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        debug!("Parsing {}", canonical_path.display());
        Self::parse(&content, root)
    }

    /// Parse configuration text; `root` anchors relative paths
    pub fn parse(content: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.root = root.into();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = Config::parse(r#"entry = "./js/app.js""#, ".").unwrap();

        assert_eq!(config.context, "src");
        assert_eq!(config.mode, None);
        assert_eq!(config.output.dir, "dist");
        assert_eq!(config.dev_server.port, 3333);
        assert!(config.rules.is_empty());
        assert!(config.html.is_none());
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let err = Config::parse(r#"mode = "staging""#, ".").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let misspelled_field = "entry = \"main.js\"\n[output]\nfilname = \"x.[hash].js\"\n";
        let err = Config::parse(misspelled_field, ".").unwrap_err();
        assert!(err.to_string().contains("filname"));

        let misspelled_section = "entry = \"main.js\"\n[devserver]\nport = 4000\n";
        assert!(matches!(Config::parse(misspelled_section, "."), Err(ConfigError::Parse(_))));

        let rule_typo = "entry = \"main.js\"\n[[rules]]\ntest = 'x'\nuses = [\"a\"]\n";
        assert!(Config::parse(rule_typo, ".").is_err());

        let overlay_typo = "entry = \"main.js\"\n[dev_server.overlay]\nerrorz = true\n";
        assert!(Config::parse(overlay_typo, ".").is_err());
    }

    #[test]
    fn test_asset_filename_kept_with_dotted_ext() {
        let config = Config::parse(r#"entry = "main.js""#, ".").unwrap();
        assert_eq!(config.output.asset_filename, "assets/[path][name].[contenthash][ext]");
        assert_eq!(config.output.filename, "app.bundle.[contenthash].[ext]");
    }

    #[test]
    fn test_load_sets_root_to_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, r#"entry = "main.js""#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.entry.as_deref(), Some("main.js"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here/packdesc.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
