//! Command-line interface for packdesc
//!
//! Provides the main CLI structure using clap with subcommands for:
//! - `inspect`: Print the validated descriptor
//! - `filename`: Resolve an output filename
//! - `match`: Look up the handler chain for files
//! - `scan`: Report handler chains for a whole source tree
//! - `init`: Write a starter config file

mod init;
mod inspect;
mod lookup;
mod scan;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{Config, CONFIG_FILE};
use crate::descriptor::BuildDescriptor;
use crate::env::EnvSnapshot;

pub use init::InitCommand;
pub use inspect::InspectCommand;
pub use lookup::{FilenameCommand, MatchCommand};
pub use scan::ScanCommand;

/// packdesc - declarative build pipeline descriptor for frontend bundlers
#[derive(Parser, Debug)]
#[command(name = "packdesc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to packdesc.toml config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    pub config: String,

    /// Dev server profile to apply (falls back to PACKDESC_PROFILE)
    #[arg(short, long, global = true)]
    pub profile: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the validated descriptor as JSON
    Inspect(InspectCommand),

    /// Print the output filename for an extension
    Filename(FilenameCommand),

    /// Print the handler chain for each file
    Match(MatchCommand),

    /// Report handler chains for every file under a directory
    Scan(ScanCommand),

    /// Write a starter config file
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Inspect(cmd) => cmd.execute(&self.descriptor()?),
            Commands::Filename(cmd) => cmd.execute(&self.descriptor()?),
            Commands::Match(cmd) => cmd.execute(&self.descriptor()?),
            Commands::Scan(cmd) => cmd.execute(&self.descriptor()?),
            Commands::Init(cmd) => cmd.execute(),
        }
    }

    /// Build the descriptor from the config file, the process environment
    /// and the `.env` file beside the config
    fn descriptor(&self) -> Result<BuildDescriptor> {
        info!("Loading configuration from {}", self.config);
        let invalid = || format!("Invalid configuration in {}", self.config);

        let config = Config::load(&self.config).with_context(invalid)?;
        let env = EnvSnapshot::from_process_with_dotenv(&config.root).with_context(invalid)?;

        BuildDescriptor::from_config(&config, &env, self.profile.as_deref()).with_context(invalid)
    }
}
