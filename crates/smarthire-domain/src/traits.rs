//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    BlobLocator, CandidateProfile, Document, FailureKind, Fingerprint, JobRequirement,
    MatchScore, NewDocument, NormalizedText, RankedResult, RequirementDraft, SubmissionRecord,
};
use async_trait::async_trait;
use thiserror::Error;

/// Outcome of a conditional profile write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileWrite {
    /// No profile existed; this one was stored
    Inserted,
    /// An identical profile already existed; nothing changed
    Unchanged,
    /// A different profile existed and `force` replaced it
    Replaced,
    /// A different profile exists and `force` was not set; nothing was written
    Conflicting,
}

/// Outcome of registering a document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRegistration {
    /// The stored document (the earlier one if it already existed)
    pub document: Document,
    /// False when the fingerprint was already registered
    pub newly_registered: bool,
}

/// Persistence for documents, profiles, scores, requirements and submissions
///
/// Implemented by the infrastructure layer (smarthire-store). Every write is
/// all-or-nothing.
pub trait ProfileStore {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Register a document; the first registration of a fingerprint wins
    fn register_document(&mut self, document: NewDocument) -> Result<DocumentRegistration, Self::Error>;

    /// Look up a document by fingerprint
    fn get_document(&self, fingerprint: &Fingerprint) -> Result<Option<Document>, Self::Error>;

    /// Store a profile; first writer wins unless `force` is set
    fn upsert_profile(
        &mut self,
        fingerprint: &Fingerprint,
        profile: &CandidateProfile,
        force: bool,
    ) -> Result<ProfileWrite, Self::Error>;

    /// Look up a profile by fingerprint
    fn get_profile(&self, fingerprint: &Fingerprint) -> Result<Option<CandidateProfile>, Self::Error>;

    /// Every stored profile, in document registration order
    fn list_profiles(&self) -> Result<Vec<CandidateProfile>, Self::Error>;

    /// Store a score, overwriting any score with the same key triple
    fn upsert_score(&mut self, score: &MatchScore) -> Result<(), Self::Error>;

    /// Look up a score by key triple
    fn get_score(
        &self,
        fingerprint: &Fingerprint,
        job_id: &str,
        requirement_version: u32,
    ) -> Result<Option<MatchScore>, Self::Error>;

    /// Candidates for a requirement version, best first, ties by registration time
    fn rank(&self, job_id: &str, requirement_version: u32) -> Result<Vec<RankedResult>, Self::Error>;

    /// Mint the next version of a job's requirement
    fn define_requirement(&mut self, draft: RequirementDraft) -> Result<JobRequirement, Self::Error>;

    /// Look up one requirement version
    fn get_requirement(&self, job_id: &str, version: u32) -> Result<Option<JobRequirement>, Self::Error>;

    /// Look up the newest requirement version of a job
    fn latest_requirement(&self, job_id: &str) -> Result<Option<JobRequirement>, Self::Error>;

    /// Every version of a job's requirement, oldest first
    fn requirement_history(&self, job_id: &str) -> Result<Vec<JobRequirement>, Self::Error>;

    /// Record a finished submission
    fn record_submission(&mut self, record: &SubmissionRecord) -> Result<(), Self::Error>;

    /// Finished submissions, oldest first, optionally for one job only
    fn list_submissions(&self, job_id: Option<&str>) -> Result<Vec<SubmissionRecord>, Self::Error>;
}

/// Errors raised by AI model providers
pub trait ModelError: std::error::Error + Send + Sync + 'static {
    /// Whether another attempt could succeed (network, rate limit, timeout)
    fn is_transient(&self) -> bool;

    /// Whether the provider answered but the envelope was unreadable
    fn is_invalid_response(&self) -> bool {
        false
    }
}

/// Trait for AI model operations
///
/// Implemented by the infrastructure layer (smarthire-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for model operations
    type Error: ModelError;

    /// Generate text completion
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate with structured (JSON) output, if supported
    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}

/// Profile extraction failures, as surfaced to the pipeline
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProfileExtractionError {
    /// Model unreachable after bounded retries, or too slow
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Model answer violated the profile schema, also after the repair retry
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// Input was rejected before any model call
    #[error("input rejected: {0}")]
    InputRejected(String),
}

impl ProfileExtractionError {
    /// The failure kind this error maps to
    pub fn kind(&self) -> FailureKind {
        match self {
            ProfileExtractionError::ModelUnavailable(_) => FailureKind::ModelUnavailable,
            ProfileExtractionError::MalformedResponse(_) => FailureKind::MalformedResponse,
            ProfileExtractionError::InputRejected(_) => FailureKind::ExtractionFailure,
        }
    }
}

/// Trait for turning normalized text into a candidate profile
///
/// Callers identify a request by content fingerprint, never by attempt.
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    /// Extract a profile for the document with this fingerprint
    async fn extract_profile(
        &self,
        fingerprint: &Fingerprint,
        text: &NormalizedText,
    ) -> Result<CandidateProfile, ProfileExtractionError>;
}

/// Trait for raw document storage
///
/// Implemented by the infrastructure layer (smarthire-document). The core only
/// ever holds the opaque locators it returns.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Error type for blob operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store bytes and return a fresh locator
    async fn put(&self, bytes: &[u8]) -> Result<BlobLocator, Self::Error>;

    /// Read bytes back
    async fn get(&self, locator: &BlobLocator) -> Result<Vec<u8>, Self::Error>;
}
