//! Config initialization command

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use crate::config::CONFIG_FILE;

/// Write a starter config file
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Project directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Entry point, relative to the context directory
    #[arg(short, long, default_value = "./js/app.js")]
    pub entry: String,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn execute(&self) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        if path.exists() && !self.force {
            bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }

        fs::create_dir_all(&self.dir).context("Failed to create project directory")?;
        fs::write(&path, self.generate_config())
            .with_context(|| format!("Failed to write {}", path.display()))?;

        eprintln!("  {} Created {}", "✓".green(), path.display().to_string().cyan());
        eprintln!("  Next steps:");
        eprintln!("    {} packdesc inspect", "→".dimmed());
        eprintln!("    {} packdesc scan", "→".dimmed());
        eprintln!();

        Ok(())
    }

    fn generate_config(&self) -> String {
        format!(
r#"# packdesc build descriptor
# NODE_ENV=development switches to development mode.
# PORT, HOST and POWERED override the dev server.

mode = "production"
context = "src"
entry = "{entry}"

[output]
dir = "app"
filename = "app.bundle.[contenthash].[ext]"
dev_filename = "[name].[ext]"
clean = true
asset_filename = "assets/[path][name].[contenthash][ext]"
subdirs = {{ js = "assets/js", css = "assets/css" }}

[dev_server]
port = 3333
host = "127.0.0.1"
open = true
compress = true
history_fallback = false
static_dirs = ["public"]
watch = ["src/*.html", "public/*"]
write_to_disk = true

[dev_server.overlay]
errors = true
warnings = false

[profiles.hot]
hot = true
live_reload = false

[profiles.live]
hot = false
live_reload = true

[html]
template = "src/index.html"
filename = "index.html"
minify = false

[[rules]]
test = '\.html$'
use = ["html-loader"]

[[rules]]
test = '\.css$'
use = ["css-extract", "css-loader"]

[[rules]]
test = '\.js$'
exclude = "node_modules"
use = ["babel-loader"]

[[rules]]
test = '\.s[ac]ss$'
use = ["css-extract", "css-loader", "sass-loader"]

[[optimization]]
target = "css"
name = "css-minimizer"
options = {{ preset = "default", discardComments = {{ removeAll = true }} }}

[[optimization]]
target = "image"
name = "gifsicle"
options = {{ interlaced = true }}

[[optimization]]
target = "image"
name = "jpegtran"
options = {{ progressive = true }}

[[optimization]]
target = "image"
name = "optipng"
options = {{ optimizationLevel = 5 }}

[[optimization]]
target = "image"
name = "svgo"
options = {{ removeViewBox = false }}
"#,
            entry = self.entry,
        )
    }
}
