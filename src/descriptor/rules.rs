//! Transform rules
//!
//! Maps file patterns to ordered handler chains. Lookup returns the first
//! rule, in declaration order, whose pattern matches.

use std::fmt;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};

use crate::config::{HandlerEntry, RuleSection};
use crate::error::{ConfigError, Result};
use crate::utils::path_to_slash;

/// How a rule selects files
#[derive(Debug, Clone)]
pub enum FilePattern {
    /// Regular expression tested against the whole path
    Regex(Regex),
    /// Glob tested against the file name, or the whole path if it has a `/`
    Glob { source: String, matcher: GlobMatcher },
}

impl FilePattern {
    pub fn is_match(&self, path: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(path),
            Self::Glob { source, matcher } => {
                if source.contains('/') {
                    matcher.is_match(path)
                } else {
                    let file_name = path.rsplit('/').next().unwrap_or(path);
                    matcher.is_match(file_name)
                }
            }
        }
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::Glob { source, .. } => write!(f, "glob:{source}"),
        }
    }
}

impl Serialize for FilePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single named transform step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Handler {
    pub loader: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<toml::Table>,
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.loader)
    }
}

/// Ordered, non-empty sequence of handlers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HandlerChain(Vec<Handler>);

impl HandlerChain {
    /// Handlers in declared order
    pub fn handlers(&self) -> &[Handler] {
        &self.0
    }

    /// Handlers last-to-first, the order bundlers conventionally run loaders
    pub fn execution_order(&self) -> impl Iterator<Item = &Handler> {
        self.0.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Loader names joined with ` -> `
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .map(|h| h.loader.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// A compiled transform rule
#[derive(Debug, Clone, Serialize)]
pub struct TransformRule {
    pub pattern: FilePattern,

    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_regex")]
    pub exclude: Option<Regex>,

    #[serde(rename = "use")]
    pub handlers: HandlerChain,
}

fn serialize_regex<S: Serializer>(
    re: &Option<Regex>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match re {
        Some(re) => serializer.serialize_some(re.as_str()),
        None => serializer.serialize_none(),
    }
}

impl TransformRule {
    /// Compile rule number `index` from its config section
    pub fn compile(index: usize, section: &RuleSection) -> Result<Self> {
        let case_insensitive = !section.case_sensitive;

        let pattern = match (&section.test, &section.glob) {
            (Some(test), None) => FilePattern::Regex(build_regex(index, test, case_insensitive)?),
            (None, Some(glob)) => {
                let matcher = GlobBuilder::new(glob)
                    .case_insensitive(case_insensitive)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidPattern {
                        rule: index,
                        pattern: glob.clone(),
                        reason: e.to_string(),
                    })?
                    .compile_matcher();
                FilePattern::Glob {
                    source: glob.clone(),
                    matcher,
                }
            }
            (Some(_), Some(_)) => {
                return Err(ConfigError::invalid(
                    format!("rules[{index}]"),
                    "set either `test` or `glob`, not both",
                ))
            }
            (None, None) => {
                return Err(ConfigError::invalid(
                    format!("rules[{index}]"),
                    "one of `test` or `glob` is required",
                ))
            }
        };

        let exclude = section
            .exclude
            .as_deref()
            .map(|ex| build_regex(index, ex, case_insensitive))
            .transpose()?;

        let handlers = section
            .handlers
            .iter()
            .map(|entry| match entry {
                HandlerEntry::Name(loader) => Handler {
                    loader: loader.clone(),
                    options: None,
                },
                HandlerEntry::Detailed { loader, options } => Handler {
                    loader: loader.clone(),
                    options: options.clone(),
                },
            })
            .collect::<Vec<_>>();

        if handlers.is_empty() {
            return Err(ConfigError::invalid(
                format!("rules[{index}].use"),
                "handler chain must not be empty",
            ));
        }
        if let Some(blank) = handlers.iter().position(|h| h.loader.trim().is_empty()) {
            return Err(ConfigError::invalid(
                format!("rules[{index}].use[{blank}]"),
                "loader name must not be empty",
            ));
        }

        Ok(Self {
            pattern,
            exclude,
            handlers: HandlerChain(handlers),
        })
    }

    /// Whether this rule applies to a slash-separated path
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path) && !self.exclude.as_ref().is_some_and(|ex| ex.is_match(path))
    }
}

fn build_regex(index: usize, source: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| ConfigError::InvalidPattern {
            rule: index,
            pattern: source.to_string(),
            reason: e.to_string(),
        })
}

/// Ordered rule list
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<TransformRule>);

impl RuleSet {
    pub fn compile(sections: &[RuleSection]) -> Result<Self> {
        sections
            .iter()
            .enumerate()
            .map(|(i, section)| TransformRule::compile(i, section))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// First rule whose pattern matches `path`
    pub fn find(&self, path: &Path) -> Option<&TransformRule> {
        let path = path_to_slash(path);
        self.0.iter().find(|rule| rule.matches(&path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regex_rule(test: &str, loaders: &[&str]) -> RuleSection {
        RuleSection {
            test: Some(test.to_string()),
            glob: None,
            exclude: None,
            case_sensitive: false,
            handlers: loaders
                .iter()
                .map(|l| HandlerEntry::Name(l.to_string()))
                .collect(),
        }
    }

    fn glob_rule(glob: &str, loaders: &[&str]) -> RuleSection {
        RuleSection {
            test: None,
            glob: Some(glob.to_string()),
            ..regex_rule("", loaders)
        }
    }

    #[test]
    fn test_first_match_wins() {
        let rules = RuleSet::compile(&[
            regex_rule(r"\.s?css$", &["style-loader", "css-loader"]),
            regex_rule(r"\.scss$", &["sass-loader"]),
        ])
        .unwrap();

        let hit = rules.find(Path::new("styles/site.scss")).unwrap();
        assert_eq!(hit.handlers.describe(), "style-loader -> css-loader");
    }

    #[test]
    fn test_glob_on_file_name() {
        let rules = RuleSet::compile(&[
            glob_rule("*.css", &["css-loader"]),
            glob_rule("*.scss", &["sass-loader"]),
        ])
        .unwrap();

        let css = rules.find(Path::new("deep/dir/x.css")).unwrap();
        assert_eq!(css.handlers.describe(), "css-loader");
        let scss = rules.find(Path::new("x.scss")).unwrap();
        assert_eq!(scss.handlers.describe(), "sass-loader");
        assert!(rules.find(Path::new("x.js")).is_none());
    }

    #[test]
    fn test_glob_with_separator_uses_whole_path() {
        let rules = RuleSet::compile(&[glob_rule("vendor/**/*.js", &["raw-loader"])]).unwrap();
        assert!(rules.find(Path::new("vendor/a/b.js")).is_some());
        assert!(rules.find(Path::new("src/b.js")).is_none());
    }

    #[test]
    fn test_exclude_suppresses_match() {
        let mut section = regex_rule(r"\.js$", &["babel-loader"]);
        section.exclude = Some("node_modules".to_string());
        let rules = RuleSet::compile(&[section]).unwrap();

        assert!(rules.find(Path::new("js/app.js")).is_some());
        assert!(rules.find(Path::new("node_modules/lib/index.js")).is_none());
    }

    #[test]
    fn test_case_sensitivity() {
        let rules = RuleSet::compile(&[regex_rule(r"\.html$", &["html-loader"])]).unwrap();
        assert!(rules.find(Path::new("INDEX.HTML")).is_some());

        let mut strict = regex_rule(r"\.html$", &["html-loader"]);
        strict.case_sensitive = true;
        let rules = RuleSet::compile(&[strict]).unwrap();
        assert!(rules.find(Path::new("INDEX.HTML")).is_none());
    }

    #[test]
    fn test_execution_order_is_reversed() {
        let rules =
            RuleSet::compile(&[regex_rule(r"\.scss$", &["extract", "css-loader", "sass-loader"])])
                .unwrap();
        let chain = &rules.find(Path::new("a.scss")).unwrap().handlers;
        let order: Vec<_> = chain.execution_order().map(|h| h.loader.as_str()).collect();
        assert_eq!(order, ["sass-loader", "css-loader", "extract"]);
        assert_eq!(chain.handlers()[0].loader, "extract");
    }

    #[test]
    fn test_invalid_rules() {
        let err = RuleSet::compile(&[regex_rule(r"\.(css$", &["css-loader"])]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { rule: 0, .. }));

        let err = RuleSet::compile(&[regex_rule(r"\.css$", &[])]).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));

        let mut both = regex_rule(r"\.css$", &["css-loader"]);
        both.glob = Some("*.css".to_string());
        assert!(RuleSet::compile(&[both]).is_err());

        let mut neither = regex_rule(r"\.css$", &["css-loader"]);
        neither.test = None;
        assert!(RuleSet::compile(&[neither]).is_err());
    }
}
