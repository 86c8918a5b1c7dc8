//! Output filename templates
//!
//! Templates use bracketed placeholders: `[name]`, `[ext]`, `[path]`,
//! `[id]`, `[query]` and the uniqueness tokens `[hash]`, `[contenthash]`
//! and `[chunkhash]`. Uniqueness tokens accept a length, as in
//! `[contenthash:8]`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Result};
use crate::utils::DEFAULT_HASH_LEN;

static ANY_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([a-z]+)(?::(\d+))?\]").unwrap());

static UNIQUE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?:hash|contenthash|chunkhash)(?::(\d+))?\]").unwrap());

/// Uniqueness token plus the separator in front of it
static UNIQUE_TOKEN_WITH_SEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.\-_]?\[(?:hash|contenthash|chunkhash)(?::\d+)?\]").unwrap());

const KNOWN_TOKENS: [&str; 8] = [
    "name",
    "ext",
    "path",
    "id",
    "query",
    "hash",
    "contenthash",
    "chunkhash",
];

/// A validated filename template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    raw: String,
}

impl FilenameTemplate {
    /// Validate `raw`; `field` names the config key in errors
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(ConfigError::invalid(field, "template must not be empty"));
        }

        for caps in ANY_TOKEN.captures_iter(raw) {
            let token = &caps[1];
            if !KNOWN_TOKENS.contains(&token) {
                return Err(ConfigError::invalid(
                    field,
                    format!("unknown placeholder [{token}]"),
                ));
            }
            if caps.get(2).is_some() && !is_unique_token(token) {
                return Err(ConfigError::invalid(
                    field,
                    format!("placeholder [{token}] does not take a length"),
                ));
            }
            if let Some(len) = caps.get(2) {
                let len: usize = len.as_str().parse().unwrap_or(0);
                if len == 0 || len > 64 {
                    return Err(ConfigError::invalid(
                        field,
                        format!("hash length in {} must be between 1 and 64", &caps[0]),
                    ));
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the template yields distinct names for distinct content
    pub fn has_uniqueness_token(&self) -> bool {
        contains_uniqueness_token(&self.raw)
    }

    /// Substitute the extension, keeping every other placeholder
    ///
    /// `[ext]` is replaced when present. Otherwise a literal trailing
    /// extension is swapped out, or `.ext` is appended if there is none.
    pub fn with_extension(&self, extension: &str) -> String {
        let ext = extension.trim_start_matches('.');

        if self.raw.contains("[ext]") {
            return self.raw.replace("[ext]", ext);
        }

        let (dir, file) = match self.raw.rfind('/') {
            Some(idx) => self.raw.split_at(idx + 1),
            None => ("", self.raw.as_str()),
        };

        match file.rfind('.') {
            Some(dot) if dot > 0 && !file[dot + 1..].contains(['[', ']']) => {
                format!("{dir}{}.{ext}", &file[..dot])
            }
            _ => format!("{dir}{file}.{ext}"),
        }
    }

    /// Substitute the extension and drop any uniqueness tokens
    pub fn without_uniqueness(&self, extension: &str) -> String {
        let stripped = UNIQUE_TOKEN_WITH_SEP
            .replace_all(&self.with_extension(extension), "")
            .into_owned();

        // `[contenthash].js` would otherwise become a dotfile
        let (dir, file) = match stripped.rfind('/') {
            Some(idx) => stripped.split_at(idx + 1),
            None => ("", stripped.as_str()),
        };
        if file.is_empty() || file.starts_with('.') {
            format!("{dir}[name]{file}")
        } else {
            stripped
        }
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for FilenameTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

fn is_unique_token(token: &str) -> bool {
    matches!(token, "hash" | "contenthash" | "chunkhash")
}

/// Whether a resolved filename still carries a uniqueness token
pub fn contains_uniqueness_token(filename: &str) -> bool {
    UNIQUE_TOKEN.is_match(filename)
}

/// Fill `[name]` and every uniqueness token from a full hex digest
pub fn fill_placeholders(filename: &str, name: &str, digest: &str) -> String {
    let hashed = UNIQUE_TOKEN.replace_all(filename, |caps: &Captures<'_>| {
        let len = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .unwrap_or(DEFAULT_HASH_LEN)
            .min(digest.len());
        digest[..len].to_string()
    });
    hashed.replace("[name]", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(raw: &str) -> FilenameTemplate {
        FilenameTemplate::parse("output.filename", raw).unwrap()
    }

    #[test]
    fn test_ext_placeholder() {
        assert_eq!(
            template("app.bundle.[contenthash].[ext]").with_extension("css"),
            "app.bundle.[contenthash].css"
        );
        assert_eq!(template("[name].[ext]").with_extension(".js"), "[name].js");
    }

    #[test]
    fn test_literal_extension_is_swapped() {
        let t = template("./assets/app.bundle.[hash].js");
        assert_eq!(t.with_extension("js"), "./assets/app.bundle.[hash].js");
        assert_eq!(t.with_extension("css"), "./assets/app.bundle.[hash].css");
    }

    #[test]
    fn test_missing_extension_is_appended() {
        assert_eq!(template("bundle.[hash]").with_extension("js"), "bundle.[hash].js");
        assert_eq!(template("bundle").with_extension("js"), "bundle.js");
    }

    #[test]
    fn test_without_uniqueness() {
        assert_eq!(
            template("app.bundle.[contenthash:8].[ext]").without_uniqueness("js"),
            "app.bundle.js"
        );
        assert_eq!(template("[hash].js").without_uniqueness("js"), "[name].js");
        assert_eq!(template("js/[name]-[chunkhash].js").without_uniqueness("js"), "js/[name].js");
    }

    #[test]
    fn test_rejects_unknown_placeholder() {
        let err = FilenameTemplate::parse("output.filename", "[nmae].js").unwrap_err();
        assert!(err.to_string().contains("[nmae]"));
    }

    #[test]
    fn test_rejects_bad_hash_length() {
        assert!(FilenameTemplate::parse("f", "[hash:0].js").is_err());
        assert!(FilenameTemplate::parse("f", "[hash:65].js").is_err());
        assert!(FilenameTemplate::parse("f", "[name:4].js").is_err());
        assert!(FilenameTemplate::parse("f", "  ").is_err());
    }

    #[test]
    fn test_fill_placeholders() {
        let digest = "0123456789abcdef0123456789abcdef";
        assert_eq!(
            fill_placeholders("[name].[contenthash:4].js", "main", digest),
            "main.0123.js"
        );
        assert_eq!(
            fill_placeholders("app.[hash].js", "main", digest),
            "app.0123456789abcdef.js"
        );
    }
}
