//! Configuration schema definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::AssetKind;

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Output directory
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Filename template for production builds
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Filename template for development builds
    #[serde(default = "default_dev_filename")]
    pub dev_filename: String,

    /// Empty the output directory before emitting
    #[serde(default = "default_true")]
    pub clean: bool,

    /// Template for assets emitted as standalone files (images, fonts)
    ///
    /// Passed to the engine verbatim. Unlike `filename`, its `[ext]`
    /// includes the leading dot, so the default reads `[contenthash][ext]`.
    #[serde(default = "default_asset_filename")]
    pub asset_filename: String,

    /// Per-extension subdirectory inside the output directory
    #[serde(default)]
    pub subdirs: BTreeMap<String, String>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            filename: default_filename(),
            dev_filename: default_dev_filename(),
            clean: true,
            asset_filename: default_asset_filename(),
            subdirs: BTreeMap::new(),
        }
    }
}

fn default_output_dir() -> String {
    "dist".to_string()
}

fn default_filename() -> String {
    "app.bundle.[contenthash].[ext]".to_string()
}

fn default_dev_filename() -> String {
    "[name].[ext]".to_string()
}

fn default_asset_filename() -> String {
    "assets/[path][name].[contenthash][ext]".to_string()
}

fn default_true() -> bool {
    true
}

/// Development server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevServerSection {
    /// Port to run dev server on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Reload the page when watched files change
    #[serde(default = "default_true")]
    pub live_reload: bool,

    /// Enable hot module replacement
    #[serde(default = "default_true")]
    pub hot: bool,

    /// Directories served as-is, in lookup order
    #[serde(default = "default_static_dirs")]
    pub static_dirs: Vec<String>,

    /// Extra globs that trigger a reload
    #[serde(default)]
    pub watch: Vec<String>,

    /// Serve index.html for unknown routes
    #[serde(default)]
    pub history_fallback: bool,

    /// Gzip responses
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Open browser automatically
    #[serde(default)]
    pub open: bool,

    /// Extra response headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Browser overlay settings
    #[serde(default)]
    pub overlay: OverlaySection,

    /// Show compilation progress in the browser
    #[serde(default = "default_true")]
    pub progress: bool,

    /// Write emitted files to disk instead of serving from memory
    #[serde(default)]
    pub write_to_disk: bool,

    /// Poll instead of relying on native file events
    #[serde(default)]
    pub use_polling: bool,
}

impl Default for DevServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            live_reload: true,
            hot: true,
            static_dirs: default_static_dirs(),
            watch: Vec::new(),
            history_fallback: false,
            compress: true,
            open: false,
            headers: BTreeMap::new(),
            overlay: OverlaySection::default(),
            progress: true,
            write_to_disk: false,
            use_polling: false,
        }
    }
}

fn default_port() -> u16 {
    3333
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_static_dirs() -> Vec<String> {
    vec!["public".to_string()]
}

/// Which compiler diagnostics the browser overlay shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlaySection {
    #[serde(default = "default_true")]
    pub errors: bool,

    #[serde(default)]
    pub warnings: bool,
}

impl Default for OverlaySection {
    fn default() -> Self {
        Self {
            errors: true,
            warnings: false,
        }
    }
}

/// Partial dev server settings layered over `[dev_server]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevServerOverrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub live_reload: Option<bool>,
    pub hot: Option<bool>,
    pub static_dirs: Option<Vec<String>>,
    pub watch: Option<Vec<String>>,
    pub history_fallback: Option<bool>,
    pub compress: Option<bool>,
    pub open: Option<bool>,
    pub headers: Option<BTreeMap<String, String>>,
    pub overlay: Option<OverlaySection>,
    pub progress: Option<bool>,
    pub write_to_disk: Option<bool>,
    pub use_polling: Option<bool>,
}

impl DevServerOverrides {
    /// Apply every field that is set onto `base`
    pub fn apply(&self, base: &mut DevServerSection) {
        macro_rules! layer {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &self.$field {
                        base.$field = value.clone();
                    }
                )*
            };
        }

        layer!(
            port,
            host,
            live_reload,
            hot,
            static_dirs,
            watch,
            history_fallback,
            compress,
            open,
            overlay,
            progress,
            write_to_disk,
            use_polling,
        );

        // Headers merge rather than replace
        if let Some(headers) = &self.headers {
            base.headers
                .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
}

/// A single `[[rules]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSection {
    /// Regular expression tested against the file path
    #[serde(default)]
    pub test: Option<String>,

    /// Glob tested against the file name (or the path if it contains `/`)
    #[serde(default)]
    pub glob: Option<String>,

    /// Regular expression that suppresses a match
    #[serde(default)]
    pub exclude: Option<String>,

    /// Match patterns case-sensitively
    #[serde(default)]
    pub case_sensitive: bool,

    /// Handler chain, in declared order
    #[serde(rename = "use", default)]
    pub handlers: Vec<HandlerEntry>,
}

/// A handler is either a bare loader name or a table with options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandlerEntry {
    Name(String),
    Detailed {
        loader: String,
        #[serde(default)]
        options: Option<toml::Table>,
    },
}

/// A single `[[optimization]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSection {
    /// Asset type the plugin minimizes
    pub target: AssetKind,

    /// Plugin name/identifier
    pub name: String,

    /// Plugin-specific options
    #[serde(default)]
    pub options: toml::Table,
}

/// HTML page emission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HtmlSection {
    /// Source template, relative to the config file
    pub template: String,

    /// Emitted filename inside the output directory
    #[serde(default = "default_html_filename")]
    pub filename: String,

    #[serde(default)]
    pub minify: bool,
}

fn default_html_filename() -> String {
    "index.html".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_touch_set_fields() {
        let mut base = DevServerSection::default();
        base.headers.insert("X-Base".into(), "1".into());

        let overrides = DevServerOverrides {
            hot: Some(false),
            static_dirs: Some(vec!["public".into(), "assets".into()]),
            headers: Some(BTreeMap::from([("X-Extra".to_string(), "2".to_string())])),
            ..Default::default()
        };
        overrides.apply(&mut base);

        assert!(!base.hot);
        assert!(base.live_reload);
        assert_eq!(base.port, 3333);
        assert_eq!(base.static_dirs, vec!["public", "assets"]);
        assert_eq!(base.headers.len(), 2);
    }

    #[test]
    fn test_handler_entry_forms() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(rename = "use")]
            handlers: Vec<HandlerEntry>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"use = ["css-loader", { loader = "sass-loader", options = { indented = true } }]"#,
        )
        .unwrap();

        assert!(matches!(&parsed.handlers[0], HandlerEntry::Name(n) if n == "css-loader"));
        assert!(matches!(
            &parsed.handlers[1],
            HandlerEntry::Detailed { loader, options: Some(_) } if loader == "sass-loader"
        ));
    }
}
