//! SmartHire Ingestion Pipeline
//!
//! Drives each uploaded résumé through the submission state machine:
//! fingerprint, dedup, text extraction, profile extraction, scoring and
//! persistence. Also hosts the administrator operations that read or write
//! the store (requirements, ranking, shortlisting, reprocessing).
//!
//! # Concurrency
//!
//! One task per submission. Work on the same fingerprint is serialized by
//! [`FingerprintLocks`]; different fingerprints run fully in parallel.

#![warn(missing_docs)]

mod config;
mod error;
mod locks;
mod pipeline;

pub use config::{
    ConfigError, IngestSettings, ModelSettings, RetrySettings, ScoringSettings, SmartHireConfig,
    StorageSettings,
};
pub use error::PipelineError;
pub use locks::FingerprintLocks;
pub use pipeline::{IngestionPipeline, PipelineSettings, SubmissionOutcome};
