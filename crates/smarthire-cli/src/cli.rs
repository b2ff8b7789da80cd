//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SmartHire CLI - Rank résumés against versioned job requirements.
#[derive(Debug, Parser)]
#[command(name = "smarthire")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.smarthire/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Gemini API key
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Extract profiles locally without calling the model
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (identifiers only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Define and inspect job requirements
    Job(JobArgs),

    /// Ingest résumé files for a job
    Ingest(IngestArgs),

    /// Rank candidates for a job
    Rank(RankArgs),

    /// Candidates at or above the shortlist threshold
    Shortlist(RankArgs),

    /// Score every stored profile against a requirement version
    Rescore(RescoreArgs),

    /// Show the submission log
    Submissions(SubmissionsArgs),

    /// Re-extract a stored document and replace its profile
    Reprocess(ReprocessArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for job management.
#[derive(Debug, Parser)]
pub struct JobArgs {
    #[command(subcommand)]
    pub action: JobAction,
}

/// Job management actions.
#[derive(Debug, Subcommand)]
pub enum JobAction {
    /// Define a job, or mint the next requirement version of an existing one
    Define {
        /// Job identifier
        job_id: String,

        /// Required skill as name or name:weight (repeatable)
        #[arg(short, long = "skill", required = true)]
        skills: Vec<String>,

        /// Minimum years of experience
        #[arg(short, long)]
        min_experience: Option<f64>,

        /// Job description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show a requirement version (latest by default)
    Show {
        /// Job identifier
        job_id: String,

        /// Requirement version
        #[arg(short, long)]
        version: Option<u32>,
    },

    /// List every requirement version of a job
    History {
        /// Job identifier
        job_id: String,
    },
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Résumé files (PDF, DOCX or plain text)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Job to score against
    #[arg(short, long)]
    pub job: String,

    /// Requirement version (latest by default)
    #[arg(short, long)]
    pub version: Option<u32>,
}

/// Arguments for rank and shortlist.
#[derive(Debug, Parser)]
pub struct RankArgs {
    /// Job identifier
    pub job: String,

    /// Requirement version (latest by default)
    #[arg(short, long)]
    pub version: Option<u32>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the rescore command.
#[derive(Debug, Parser)]
pub struct RescoreArgs {
    /// Job identifier
    pub job: String,

    /// Requirement version (latest by default)
    #[arg(short, long)]
    pub version: Option<u32>,
}

/// Arguments for the submissions command.
#[derive(Debug, Parser)]
pub struct SubmissionsArgs {
    /// Only submissions for this job
    #[arg(short, long)]
    pub job: Option<String>,

    /// Only failed submissions
    #[arg(long)]
    pub failed: bool,
}

/// Arguments for the reprocess command.
#[derive(Debug, Parser)]
pub struct ReprocessArgs {
    /// Document fingerprint (64 hex characters)
    pub fingerprint: String,

    /// Job to rescore against
    #[arg(short, long)]
    pub job: String,

    /// Requirement version (latest by default)
    #[arg(short, long)]
    pub version: Option<u32>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
