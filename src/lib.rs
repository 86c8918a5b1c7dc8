//! packdesc library
//!
//! Validated, immutable build pipeline descriptors for frontend bundlers.
//!
//! ```no_run
//! use packdesc::{BuildDescriptor, EnvSnapshot};
//!
//! let descriptor = BuildDescriptor::load("packdesc.toml", &EnvSnapshot::from_process(), None)?;
//! let js = descriptor.resolve_output_filename("js");
//! let chain = descriptor.match_transform("css/site.css");
//! # Ok::<(), packdesc::ConfigError>(())
//! ```

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod env;
pub mod error;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use descriptor::{BuildDescriptor, HandlerChain, Mode};
pub use env::EnvSnapshot;
pub use error::ConfigError;
