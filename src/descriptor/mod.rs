//! The build descriptor
//!
//! A [`BuildDescriptor`] is built once from a [`Config`] and an
//! [`EnvSnapshot`], validated as a whole, and never mutated afterwards.
//! The bundling engine reads it through accessors and the two lookups
//! [`BuildDescriptor::resolve_output_filename`] and
//! [`BuildDescriptor::match_transform`].

mod dev_server;
mod filename;
mod optimization;
mod rules;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::env::EnvSnapshot;
use crate::error::{ConfigError, Result};
use crate::utils::{clean_path, content_digest};

pub use dev_server::{DevServerConfig, PROFILE_ENV};
pub use filename::{contains_uniqueness_token, FilenameTemplate};
pub use optimization::{AssetKind, OptimizationPlugin};
pub use rules::{FilePattern, Handler, HandlerChain, RuleSet, TransformRule};

/// Build mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    /// Interpret `NODE_ENV`: only `development` selects development
    pub fn from_node_env(value: &str) -> Self {
        if value == "development" {
            Self::Development
        } else {
            Self::Production
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

/// Where and how bundles are written
#[derive(Debug, Clone, Serialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub filename_template: FilenameTemplate,
    pub dev_filename_template: FilenameTemplate,
    pub clean_before_build: bool,
    /// Engine-facing template whose `[ext]` carries its own leading dot
    pub asset_filename_template: FilenameTemplate,
    pub subdirectories: BTreeMap<String, String>,
}

/// HTML page the engine emits alongside the bundles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HtmlPage {
    pub template: PathBuf,
    pub filename: String,
    pub minify: bool,
}

/// Validated, immutable build configuration
#[derive(Debug, Clone, Serialize)]
pub struct BuildDescriptor {
    mode: Mode,
    root: PathBuf,
    context: PathBuf,
    entry_point: PathBuf,
    output: OutputConfig,
    dev_server: DevServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<String>,
    transform_rules: RuleSet,
    optimization_plugins: Vec<OptimizationPlugin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_page: Option<HtmlPage>,
}

impl BuildDescriptor {
    /// Load `path` and build a descriptor from it
    pub fn load(path: impl AsRef<Path>, env: &EnvSnapshot, profile: Option<&str>) -> Result<Self> {
        let config = Config::load(path)?;
        Self::from_config(&config, env, profile)
    }

    /// Validate `config` against `env` and build the descriptor
    ///
    /// `profile` selects a dev server profile; when `None`, the
    /// `PACKDESC_PROFILE` environment variable is consulted.
    pub fn from_config(config: &Config, env: &EnvSnapshot, profile: Option<&str>) -> Result<Self> {
        let mode = match env.get("NODE_ENV") {
            Some(node_env) => Mode::from_node_env(node_env),
            None => config.mode.unwrap_or_default(),
        };

        let entry = config
            .entry
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(ConfigError::MissingField("entry"))?;
        let entry_point = PathBuf::from(clean_path(entry));
        if entry_point.as_os_str().is_empty() {
            return Err(ConfigError::invalid("entry", "entry point resolves to an empty path"));
        }

        let output = Self::build_output(config, mode)?;
        let (dev_server, profile) = DevServerConfig::resolve(config, env, profile)?;
        let transform_rules = RuleSet::compile(&config.rules)?;
        let optimization_plugins = optimization::collect_plugins(&config.optimization)?;

        let html_page = match &config.html {
            Some(html) => {
                if html.template.trim().is_empty() {
                    return Err(ConfigError::MissingField("html.template"));
                }
                Some(HtmlPage {
                    template: config.root.join(&html.template),
                    filename: html.filename.clone(),
                    minify: html.minify,
                })
            }
            None => None,
        };

        debug!(
            "Descriptor has {} transform rule(s) and {} optimization plugin(s)",
            transform_rules.len(),
            optimization_plugins.len()
        );
        info!("Built {} descriptor for entry {}", mode, entry_point.display());

        Ok(Self {
            mode,
            root: config.root.clone(),
            context: PathBuf::from(&config.context),
            entry_point,
            output,
            dev_server,
            profile,
            transform_rules,
            optimization_plugins,
            html_page,
        })
    }

    fn build_output(config: &Config, mode: Mode) -> Result<OutputConfig> {
        let section = &config.output;

        if section.dir.trim().is_empty() {
            return Err(ConfigError::invalid("output.dir", "directory must not be empty"));
        }

        let filename_template = FilenameTemplate::parse("output.filename", &section.filename)?;
        if mode.is_production() && !filename_template.has_uniqueness_token() {
            return Err(ConfigError::MissingUniquenessToken(section.filename.clone()));
        }

        let subdirectories = section
            .subdirs
            .iter()
            .map(|(ext, dir)| {
                validate_subdir(ext, dir)?;
                Ok((
                    ext.trim_start_matches('.').to_string(),
                    dir.trim_end_matches('/').to_string(),
                ))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(OutputConfig {
            directory: config.root.join(&section.dir),
            filename_template,
            dev_filename_template: FilenameTemplate::parse(
                "output.dev_filename",
                &section.dev_filename,
            )?,
            clean_before_build: section.clean,
            asset_filename_template: FilenameTemplate::parse(
                "output.asset_filename",
                &section.asset_filename,
            )?,
            subdirectories,
        })
    }

    /// Output filename for bundles with the given extension
    ///
    /// In production the uniqueness token is kept for the engine to fill
    /// at emission time. In development the result never carries one.
    pub fn resolve_output_filename(&self, extension: &str) -> String {
        let filename = match self.mode {
            Mode::Production => self.output.filename_template.with_extension(extension),
            Mode::Development => self.output.dev_filename_template.without_uniqueness(extension),
        };

        match self
            .output
            .subdirectories
            .get(extension.trim_start_matches('.'))
        {
            Some(dir) if !dir.is_empty() => {
                format!("{}/{}", dir, filename.trim_start_matches("./"))
            }
            _ => filename,
        }
    }

    /// Final filename for an emitted bundle: `[name]` and hash tokens filled
    pub fn render_output_filename(&self, extension: &str, name: &str, content: &[u8]) -> String {
        filename::fill_placeholders(
            &self.resolve_output_filename(extension),
            name,
            &content_digest(content),
        )
    }

    /// Handler chain of the first rule matching `file_path`
    ///
    /// `None` means no rule applies; what happens then is up to the engine.
    pub fn match_transform(&self, file_path: impl AsRef<Path>) -> Option<&HandlerChain> {
        self.transform_rules
            .find(file_path.as_ref())
            .map(|rule| &rule.handlers)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Directory containing the config file
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute context directory
    pub fn context_dir(&self) -> PathBuf {
        self.root.join(&self.context)
    }

    /// Entry point relative to the context directory
    pub fn entry_point(&self) -> &Path {
        &self.entry_point
    }

    /// Entry point joined onto the context directory
    pub fn entry_path(&self) -> PathBuf {
        self.context_dir().join(&self.entry_point)
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    pub fn dev_server(&self) -> &DevServerConfig {
        &self.dev_server
    }

    pub fn dev_server_url(&self) -> String {
        self.dev_server.url()
    }

    /// Dev server profile that was applied, if any
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn transform_rules(&self) -> &RuleSet {
        &self.transform_rules
    }

    pub fn optimization_plugins(&self) -> &[OptimizationPlugin] {
        &self.optimization_plugins
    }

    /// Plugins minimizing the given asset type, in declared order
    pub fn plugins_for(&self, target: AssetKind) -> impl Iterator<Item = &OptimizationPlugin> {
        self.optimization_plugins
            .iter()
            .filter(move |p| p.target == target)
    }

    pub fn html_page(&self) -> Option<&HtmlPage> {
        self.html_page.as_ref()
    }

    /// Emit source maps (development only)
    pub fn source_maps(&self) -> bool {
        !self.mode.is_production()
    }

    /// Minify output (production only)
    pub fn minimize(&self) -> bool {
        self.mode.is_production()
    }
}

/// Subdirectories stay inside the output directory and carry no placeholders
fn validate_subdir(ext: &str, dir: &str) -> Result<()> {
    let field = || format!("output.subdirs.{ext}");

    if dir.contains('[') || dir.contains(']') {
        return Err(ConfigError::invalid(
            field(),
            format!("`{dir}` must not contain placeholders"),
        ));
    }
    let path = Path::new(dir);
    if path.is_absolute() || dir.starts_with('/') || dir.starts_with('\\') {
        return Err(ConfigError::invalid(
            field(),
            format!("`{dir}` must be relative to the output directory"),
        ));
    }
    if dir.split(['/', '\\']).any(|part| part == "..") {
        return Err(ConfigError::invalid(
            field(),
            format!("`{dir}` must not leave the output directory"),
        ));
    }
    Ok(())
}
