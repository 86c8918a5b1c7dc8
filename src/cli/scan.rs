//! Scan command implementation

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::descriptor::BuildDescriptor;
use crate::utils::relative_path;

/// Report handler chains for every file under a directory
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// Directory to scan (defaults to the context directory)
    pub dir: Option<PathBuf>,

    /// Fail when any file has no matching rule
    #[arg(long)]
    pub strict: bool,
}

impl ScanCommand {
    pub fn execute(&self, descriptor: &BuildDescriptor) -> Result<()> {
        let base = self
            .dir
            .clone()
            .unwrap_or_else(|| descriptor.context_dir());
        if !base.is_dir() {
            bail!("{} is not a directory", base.display());
        }

        let mut unmatched = Vec::new();
        let mut matched = 0usize;

        let walker = WalkDir::new(&base)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let rel = relative_path(&base, entry.path())
                .unwrap_or_else(|| entry.path().display().to_string());
            match descriptor.match_transform(&rel) {
                Some(chain) => {
                    matched += 1;
                    println!("{}\t{}", rel, chain.describe());
                }
                None => unmatched.push(rel),
            }
        }

        debug!("Scanned {}: {} matched, {} unmatched", base.display(), matched, unmatched.len());

        eprintln!(
            "\n{} {} file(s) matched a transform rule",
            "✓".green().bold(),
            matched
        );
        if !unmatched.is_empty() {
            eprintln!("{} {} file(s) with no rule:", "!".yellow().bold(), unmatched.len());
            for rel in &unmatched {
                eprintln!("  {} {}", "•".dimmed(), rel.yellow());
            }
        }

        if self.strict && !unmatched.is_empty() {
            bail!("{} file(s) have no transform rule", unmatched.len());
        }

        Ok(())
    }
}
