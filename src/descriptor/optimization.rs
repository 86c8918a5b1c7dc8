//! Minimizer plugin declarations

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PluginSection;
use crate::error::{ConfigError, Result};

/// Asset type a minimizer targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Css,
    Image,
    Js,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Css => "css",
            Self::Image => "image",
            Self::Js => "js",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationPlugin {
    pub target: AssetKind,
    pub name: String,
    pub options: toml::Table,
}

/// Validate plugin declarations; `(target, name)` pairs must be unique
pub fn collect_plugins(sections: &[PluginSection]) -> Result<Vec<OptimizationPlugin>> {
    let mut seen = HashSet::new();
    let mut plugins = Vec::with_capacity(sections.len());

    for (index, section) in sections.iter().enumerate() {
        let name = section.name.trim();
        if name.is_empty() {
            return Err(ConfigError::invalid(
                format!("optimization[{index}].name"),
                "plugin name must not be empty",
            ));
        }
        if !seen.insert((section.target, name.to_string())) {
            return Err(ConfigError::DuplicatePlugin {
                target: section.target.to_string(),
                name: name.to_string(),
            });
        }
        plugins.push(OptimizationPlugin {
            target: section.target,
            name: name.to_string(),
            options: section.options.clone(),
        });
    }

    Ok(plugins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(target: AssetKind, name: &str) -> PluginSection {
        PluginSection {
            target,
            name: name.to_string(),
            options: toml::Table::new(),
        }
    }

    #[test]
    fn test_same_name_different_targets_is_allowed() {
        let plugins = collect_plugins(&[
            section(AssetKind::Css, "minimizer"),
            section(AssetKind::Js, "minimizer"),
        ])
        .unwrap();
        assert_eq!(plugins.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = collect_plugins(&[
            section(AssetKind::Image, "optipng"),
            section(AssetKind::Image, " optipng "),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicatePlugin { ref target, ref name } if target == "image" && name == "optipng"
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(collect_plugins(&[section(AssetKind::Css, "  ")]).is_err());
    }
}
