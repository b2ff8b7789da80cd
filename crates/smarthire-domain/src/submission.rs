//! Submissions and the ingestion state machine
//!
//! ```text
//! RECEIVED → FINGERPRINTED → DUPLICATE_SHORT_CIRCUIT ─────────────→ PERSISTED
//!                          ↘ EXTRACTING_TEXT → PROFILING → SCORING ↗
//! ```
//!
//! `FAILED(kind)` is reachable from every non-terminal state.

use crate::Fingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a submission based on UUIDv7
///
/// UUIDv7 sorts chronologically, so submission logs list in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionId(u128);

impl SubmissionId {
    /// Generate a new UUIDv7-based id
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create from a raw value (storage deserialization)
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse from the hyphenated UUID form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid submission id: {}", e))
    }

    /// Raw value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Why a submission failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Not a PDF, DOCX or plain-text document
    UnsupportedFormat,
    /// Recognized format but unreadable content
    ExtractionFailure,
    /// AI model unreachable, rate limited or too slow
    ModelUnavailable,
    /// AI model answered but the answer violated the profile schema
    MalformedResponse,
    /// A different profile already exists for this fingerprint
    ConflictingProfile,
    /// Upload exceeds the configured size limit
    DocumentTooLarge,
    /// Upload has no bytes
    EmptyDocument,
    /// Requested job or requirement version does not exist
    UnknownRequirement,
    /// The store or blob store failed
    Storage,
}

impl FailureKind {
    /// Whether a component may retry this failure internally
    ///
    /// Retries are always local to the component that owns the failure;
    /// the pipeline never retries across state transitions.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::ExtractionFailure
                | FailureKind::ModelUnavailable
                | FailureKind::MalformedResponse
        )
    }

    /// Stable name used in storage and output
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnsupportedFormat => "UnsupportedFormat",
            FailureKind::ExtractionFailure => "ExtractionFailure",
            FailureKind::ModelUnavailable => "ModelUnavailable",
            FailureKind::MalformedResponse => "MalformedResponse",
            FailureKind::ConflictingProfile => "ConflictingProfile",
            FailureKind::DocumentTooLarge => "DocumentTooLarge",
            FailureKind::EmptyDocument => "EmptyDocument",
            FailureKind::UnknownRequirement => "UnknownRequirement",
            FailureKind::Storage => "Storage",
        }
    }

    /// Inverse of [`FailureKind::as_str`]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "UnsupportedFormat" => FailureKind::UnsupportedFormat,
            "ExtractionFailure" => FailureKind::ExtractionFailure,
            "ModelUnavailable" => FailureKind::ModelUnavailable,
            "MalformedResponse" => FailureKind::MalformedResponse,
            "ConflictingProfile" => FailureKind::ConflictingProfile,
            "DocumentTooLarge" => FailureKind::DocumentTooLarge,
            "EmptyDocument" => FailureKind::EmptyDocument,
            "UnknownRequirement" => FailureKind::UnknownRequirement,
            "Storage" => FailureKind::Storage,
            _ => return None,
        })
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    /// Upload accepted for processing
    Received,
    /// Content fingerprint computed
    Fingerprinted,
    /// Known content; reusing the stored profile
    DuplicateShortCircuit,
    /// Converting the document to normalized text
    ExtractingText,
    /// Waiting on the profile extractor
    Profiling,
    /// Computing the match score
    Scoring,
    /// Profile and score are stored
    Persisted,
    /// Terminal failure
    Failed(FailureKind),
}

impl SubmissionState {
    /// True for `Persisted` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Persisted | SubmissionState::Failed(_))
    }

    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(&self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Failed(_)) {
            return true;
        }
        matches!(
            (self, next),
            (Received, Fingerprinted)
                | (Fingerprinted, DuplicateShortCircuit)
                | (Fingerprinted, ExtractingText)
                | (DuplicateShortCircuit, Persisted)
                | (ExtractingText, Profiling)
                | (Profiling, Scoring)
                | (Scoring, Persisted)
        )
    }

    /// Failure kind, if this is a failed state
    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            SubmissionState::Failed(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Stable name used in storage and output
    pub fn label(&self) -> String {
        match self {
            SubmissionState::Received => "RECEIVED".to_string(),
            SubmissionState::Fingerprinted => "FINGERPRINTED".to_string(),
            SubmissionState::DuplicateShortCircuit => "DUPLICATE_SHORT_CIRCUIT".to_string(),
            SubmissionState::ExtractingText => "EXTRACTING_TEXT".to_string(),
            SubmissionState::Profiling => "PROFILING".to_string(),
            SubmissionState::Scoring => "SCORING".to_string(),
            SubmissionState::Persisted => "PERSISTED".to_string(),
            SubmissionState::Failed(kind) => format!("FAILED({})", kind),
        }
    }

    /// Inverse of [`SubmissionState::label`]
    ///
    /// # Examples
    ///
    /// ```
    /// use smarthire_domain::{FailureKind, SubmissionState};
    ///
    /// let failed = SubmissionState::Failed(FailureKind::MalformedResponse);
    /// assert_eq!(SubmissionState::from_label(&failed.label()), Some(failed));
    /// assert_eq!(SubmissionState::from_label("PERSISTED"), Some(SubmissionState::Persisted));
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        if let Some(inner) = label
            .strip_prefix("FAILED(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return FailureKind::parse(inner).map(SubmissionState::Failed);
        }
        Some(match label {
            "RECEIVED" => SubmissionState::Received,
            "FINGERPRINTED" => SubmissionState::Fingerprinted,
            "DUPLICATE_SHORT_CIRCUIT" => SubmissionState::DuplicateShortCircuit,
            "EXTRACTING_TEXT" => SubmissionState::ExtractingText,
            "PROFILING" => SubmissionState::Profiling,
            "SCORING" => SubmissionState::Scoring,
            "PERSISTED" => SubmissionState::Persisted,
            _ => return None,
        })
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// What the administrator sees about a finished submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    /// Submission identifier
    pub submission_id: SubmissionId,
    /// Uploaded file name
    pub source_name: String,
    /// Content fingerprint, once computed
    pub fingerprint: Option<Fingerprint>,
    /// Job the submission was scored against
    pub job_id: String,
    /// Requirement version, once resolved
    pub requirement_version: Option<u32>,
    /// Terminal state
    pub state: SubmissionState,
    /// True when the stored profile was reused
    pub via_duplicate: bool,
    /// Score, when persisted
    pub score: Option<f64>,
    /// Failure detail, when failed
    pub message: Option<String>,
    /// When the submission was received (milliseconds since epoch)
    pub created_at: u64,
}
