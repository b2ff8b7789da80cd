//! Error types for administrator operations
//!
//! Per-submission failures are not errors: they end the submission in
//! `FAILED(kind)` and are reported through [`crate::SubmissionOutcome`].

use smarthire_domain::RequirementError;
use thiserror::Error;

/// Errors returned by administrator operations on the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The store failed
    #[error("Store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Requirement draft rejected
    #[error("Invalid requirement: {0}")]
    InvalidRequirement(#[from] RequirementError),

    /// No such requirement version
    #[error("Unknown requirement: {job_id} version {version}")]
    UnknownRequirement {
        /// Job posting
        job_id: String,
        /// Requested version
        version: u32,
    },

    /// Job has no requirement at all
    #[error("No requirement defined for job '{0}'")]
    NoRequirement(String),

    /// No document with this fingerprint
    #[error("Unknown document: {0}")]
    UnknownDocument(String),
}

impl PipelineError {
    pub(crate) fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store(Box::new(err))
    }
}
