//! Error types for the profile extractor

use smarthire_domain::ProfileExtractionError;
use thiserror::Error;

/// Errors that can occur during profile extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// Model unreachable after bounded retries, or a permanent provider error
    #[error("Model unavailable after {attempts} attempt(s): {last}")]
    ModelUnavailable {
        /// Attempts made
        attempts: u32,
        /// Last failure seen
        last: String,
    },

    /// Response violates the profile schema
    #[error("Invalid profile format: {0}")]
    InvalidFormat(String),

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Nothing to extract from
    #[error("Text is empty")]
    EmptyText,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ExtractorError> for ProfileExtractionError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::ModelUnavailable { .. } => {
                ProfileExtractionError::ModelUnavailable(e.to_string())
            }
            ExtractorError::InvalidFormat(_) => ProfileExtractionError::MalformedResponse(e.to_string()),
            ExtractorError::TextTooLong(..) | ExtractorError::EmptyText | ExtractorError::Config(_) => {
                ProfileExtractionError::InputRejected(e.to_string())
            }
        }
    }
}
