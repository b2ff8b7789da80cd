//! SmartHire Domain Layer
//!
//! Core value types, the deterministic scoring engine, and the trait
//! interfaces every other layer depends upon.
//!
//! ## Key Concepts
//!
//! - **Fingerprint**: SHA-256 of an uploaded document, the dedup and idempotency key
//! - **CandidateProfile**: structured data extracted once per unique fingerprint
//! - **JobRequirement**: a versioned snapshot of what a job asks for
//! - **MatchScore**: the reproducible result of scoring a profile against a requirement version
//! - **Submission**: one upload travelling through the ingestion state machine
//!
//! ## Architecture
//!
//! - Pure business logic only; no I/O
//! - Infrastructure implementations (SQLite, HTTP, file parsing) live in other crates
//! - Trait definitions for all external interactions live in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod fingerprint;
pub mod profile;
pub mod requirement;
pub mod score;
pub mod scoring;
pub mod submission;
pub mod synonyms;
pub mod text;
pub mod traits;

// Re-exports for convenience
pub use document::{BlobLocator, Document, NewDocument};
pub use fingerprint::Fingerprint;
pub use profile::{CandidateProfile, ContactInfo, EducationEntry, ExperienceEntry};
pub use requirement::{JobRequirement, RequirementDraft, RequirementError, RequirementSkill};
pub use score::{MatchScore, RankedResult};
pub use scoring::{score, ScoringConfig, DEFAULT_EXPERIENCE_CEILING};
pub use submission::{FailureKind, SubmissionId, SubmissionRecord, SubmissionState};
pub use synonyms::SynonymTable;
pub use text::{NormalizedText, SECTION_HEADERS};
pub use traits::{
    BlobStore, DocumentRegistration, LlmProvider, ModelError, ProfileExtractionError,
    ProfileExtractor, ProfileStore, ProfileWrite,
};

/// Milliseconds since the Unix epoch, saturating to 0 if the clock is before it.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
