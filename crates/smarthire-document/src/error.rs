//! Document error types

use smarthire_domain::FailureKind;
use thiserror::Error;

/// Errors raised while reading, storing or converting documents
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Content is neither PDF, DOCX nor plain text
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Recognized format, unreadable content
    #[error("Text extraction failed: {0}")]
    ExtractionFailure(String),

    /// Blob locator does not resolve
    #[error("Blob not found: {0}")]
    BlobNotFound(String),

    /// Filesystem error in the blob store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    /// The failure kind a submission ends in when this error surfaces
    pub fn kind(&self) -> FailureKind {
        match self {
            DocumentError::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            DocumentError::ExtractionFailure(_) => FailureKind::ExtractionFailure,
            DocumentError::BlobNotFound(_) | DocumentError::Io(_) => FailureKind::Storage,
        }
    }
}
