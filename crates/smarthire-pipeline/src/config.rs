//! Configuration file for the ingestion pipeline
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid.
//!
//! ```toml
//! [model]
//! model = "gemini-2.5-pro"
//! request_timeout_ms = 30000
//! requests_per_minute = 2
//!
//! [retry]
//! max_attempts = 3
//!
//! [ingest]
//! max_document_bytes = 5242880
//!
//! [scoring]
//! experience_ceiling = 0.5
//! synonyms = [["golang", "go"]]
//!
//! [storage]
//! database_path = "smarthire.db"
//! ```

use serde::{Deserialize, Serialize};
use smarthire_domain::{ScoringConfig, SynonymTable, DEFAULT_EXPERIENCE_CEILING};
use smarthire_extractor::ExtractorConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Full SmartHire configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartHireConfig {
    /// AI model connection
    pub model: ModelSettings,
    /// Retry and backoff bounds for model calls
    pub retry: RetrySettings,
    /// Upload and extraction limits
    pub ingest: IngestSettings,
    /// Scoring and shortlisting
    pub scoring: ScoringSettings,
    /// Database and blob locations
    pub storage: StorageSettings,
}

/// AI model connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// API base URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Timeout for a single model request (milliseconds)
    pub request_timeout_ms: u64,
    /// Model requests per minute shared by all in-flight extractions; 0 is unthrottled
    pub requests_per_minute: u32,
    /// API credential; injected by the caller, never written back to disk
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-pro".to_string(),
            temperature: 0.3,
            request_timeout_ms: 30_000,
            requests_per_minute: 0,
            api_key: None,
        }
    }
}

/// Retry bounds for transient model failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per model request
    pub max_attempts: u32,
    /// First backoff delay (milliseconds)
    pub backoff_base_ms: u64,
    /// Cap on a single backoff delay (milliseconds)
    pub backoff_max_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 8_000,
        }
    }
}

/// Upload and extraction limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Largest accepted upload (bytes)
    pub max_document_bytes: usize,
    /// Longest normalized text sent to the model (bytes)
    pub max_text_length: usize,
    /// Chunk size for long documents (bytes)
    pub max_chunk_size: usize,
    /// Retries for a failed text extraction
    pub extraction_retries: u32,
    /// Deadline for the whole profile extraction of one document (milliseconds)
    pub extraction_deadline_ms: u64,
    /// Submissions processed at once by the CLI
    pub max_concurrent: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_document_bytes: 5 * 1024 * 1024,
            max_text_length: 50_000,
            max_chunk_size: 12_000,
            extraction_retries: 1,
            extraction_deadline_ms: 120_000,
            max_concurrent: 4,
        }
    }
}

/// Scoring and shortlisting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Score cap below the minimum experience
    pub experience_ceiling: f64,
    /// Minimum score for the shortlist
    pub shortlist_threshold: f64,
    /// Include the built-in synonym groups
    pub builtin_synonyms: bool,
    /// Extra synonym groups, canonical name first; overlapping built-in groups merge into them
    pub synonyms: Vec<Vec<String>>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            experience_ceiling: DEFAULT_EXPERIENCE_CEILING,
            shortlist_threshold: 0.7,
            builtin_synonyms: true,
            synonyms: Vec::new(),
        }
    }
}

/// Where data lives; relative paths resolve against the config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Directory for uploaded documents
    pub blob_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("smarthire.db"),
            blob_dir: PathBuf::from("blobs"),
        }
    }
}

impl StorageSettings {
    /// Resolve relative paths against `base`
    pub fn resolve(&self, base: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        Self {
            database_path: join(&self.database_path),
            blob_dir: join(&self.blob_dir),
        }
    }
}

impl SmartHireConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: SmartHireConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML (the API key is omitted)
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.model.model.trim().is_empty() {
            return invalid("model.model must not be empty");
        }
        if !(0.0..=1.0).contains(&self.scoring.experience_ceiling) {
            return invalid("scoring.experience_ceiling must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.scoring.shortlist_threshold) {
            return invalid("scoring.shortlist_threshold must be within [0, 1]");
        }
        if self
            .scoring
            .synonyms
            .iter()
            .any(|group| group.iter().all(|s| s.trim().is_empty()))
        {
            return invalid("scoring.synonyms must not contain empty groups");
        }
        if self.ingest.max_document_bytes == 0 {
            return invalid("ingest.max_document_bytes must be greater than 0");
        }
        if self.ingest.extraction_deadline_ms == 0 {
            return invalid("ingest.extraction_deadline_ms must be greater than 0");
        }
        if self.ingest.max_concurrent == 0 {
            return invalid("ingest.max_concurrent must be greater than 0");
        }
        self.extractor_config()
            .validate()
            .map_err(ConfigError::Invalid)
    }

    /// Settings for the profile extraction client
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            max_text_length: self.ingest.max_text_length,
            max_chunk_size: self.ingest.max_chunk_size,
            request_timeout_ms: self.model.request_timeout_ms,
            max_attempts: self.retry.max_attempts,
            backoff_base_ms: self.retry.backoff_base_ms,
            backoff_max_ms: self.retry.backoff_max_ms,
            requests_per_minute: self.model.requests_per_minute,
        }
    }

    /// Settings for the scoring engine
    ///
    /// Configured groups go in first; a built-in group that overlaps one is
    /// merged into it under the configured canonical name.
    pub fn scoring_config(&self) -> ScoringConfig {
        let mut synonyms = SynonymTable::from_groups(&self.scoring.synonyms);
        if self.scoring.builtin_synonyms {
            for group in smarthire_domain::synonyms::BUILTIN_SYNONYMS {
                synonyms.add_group(group.iter().copied());
            }
        }
        ScoringConfig {
            experience_ceiling: self.scoring.experience_ceiling,
            synonyms,
        }
    }

    /// Deadline for one document's profile extraction
    pub fn extraction_deadline(&self) -> Duration {
        Duration::from_millis(self.ingest.extraction_deadline_ms)
    }
}
