//! Error types for descriptor construction

use std::path::PathBuf;

use thiserror::Error;

/// Raised when a descriptor cannot be built from its inputs.
///
/// Construction either succeeds completely or fails with one of these;
/// there is never a partially-valid descriptor.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("invalid pattern `{pattern}` in rule {rule}: {reason}")]
    InvalidPattern {
        rule: usize,
        pattern: String,
        reason: String,
    },

    #[error(
        "output filename template `{0}` has no [hash], [contenthash] or [chunkhash] token, \
         which production builds require for cache busting"
    )]
    MissingUniquenessToken(String),

    #[error("optimization plugin `{name}` is declared twice for {target} assets")]
    DuplicatePlugin { target: String, name: String },

    #[error("unknown dev server profile `{0}`")]
    UnknownProfile(String),

    #[error("environment variable {name}={value:?} is invalid: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load environment file {path}")]
    DotEnv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
