//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be loaded or written
    #[error(transparent)]
    ConfigFile(#[from] smarthire_pipeline::ConfigError),

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] smarthire_pipeline::PipelineError),

    /// Store error
    #[error(transparent)]
    Store(#[from] smarthire_store::StoreError),

    /// Blob directory error
    #[error(transparent)]
    Document(#[from] smarthire_document::DocumentError),

    /// Model client error
    #[error(transparent)]
    Llm(#[from] smarthire_llm::LlmError),

    /// Extractor setup error
    #[error(transparent)]
    Extractor(#[from] smarthire_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A background ingestion task panicked or was cancelled
    #[error("Ingestion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Ingestion needs a model credential
    #[error("No API key. Pass --api-key, set GEMINI_API_KEY, or use --offline.")]
    MissingApiKey,
}
