//! SmartHire CLI library.
//!
//! The administrator surface: define job requirements, ingest résumés,
//! and read rankings, shortlists and the submission log.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::ConfigLocation;
pub use context::{CliExtractor, Context, Pipeline};
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
