//! Inspect command implementation

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::descriptor::BuildDescriptor;

/// Print the validated descriptor as JSON
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}

impl InspectCommand {
    pub fn execute(&self, descriptor: &BuildDescriptor) -> Result<()> {
        let json = if self.compact {
            serde_json::to_string(descriptor)?
        } else {
            serde_json::to_string_pretty(descriptor)?
        };
        println!("{json}");

        eprintln!(
            "{} {} build, entry {}{}",
            "✓".green().bold(),
            descriptor.mode().to_string().cyan(),
            descriptor.entry_path().display().to_string().cyan(),
            descriptor
                .profile()
                .map(|p| format!(", profile {}", p.yellow()))
                .unwrap_or_default()
        );

        Ok(())
    }
}
