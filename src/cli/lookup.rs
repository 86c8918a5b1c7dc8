//! Filename and match command implementations

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::debug;

use crate::descriptor::BuildDescriptor;

/// Print the output filename for an extension
#[derive(Args, Debug)]
pub struct FilenameCommand {
    /// Asset extension (js, css, ...)
    pub extension: String,

    /// Chunk name to substitute for [name]
    #[arg(short, long, requires = "content_file")]
    pub name: Option<String>,

    /// Hash this file's bytes into the filename
    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

impl FilenameCommand {
    pub fn execute(&self, descriptor: &BuildDescriptor) -> Result<()> {
        let filename = match &self.content_file {
            Some(path) => {
                let content = fs::read(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let name = self.name.as_deref().unwrap_or("main");
                debug!("Rendering filename for {} ({} bytes)", name, content.len());
                descriptor.render_output_filename(&self.extension, name, &content)
            }
            None => descriptor.resolve_output_filename(&self.extension),
        };

        println!("{filename}");
        Ok(())
    }
}

/// Print the handler chain for each file
#[derive(Args, Debug)]
pub struct MatchCommand {
    /// Files to look up, relative to the context directory
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl MatchCommand {
    pub fn execute(&self, descriptor: &BuildDescriptor) -> Result<()> {
        for path in &self.paths {
            match descriptor.match_transform(path) {
                Some(chain) => println!("{}\t{}", path.display(), chain.describe()),
                None => {
                    println!("{}\t-", path.display());
                    eprintln!(
                        "  {} no transform rule matches {}",
                        "•".dimmed(),
                        path.display().to_string().yellow()
                    );
                }
            }
        }
        Ok(())
    }
}
