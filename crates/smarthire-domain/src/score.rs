//! Match scores and ranked results

use crate::{CandidateProfile, Fingerprint};
use serde::{Deserialize, Serialize};

/// Result of scoring one profile against one requirement version
///
/// Keyed by `(fingerprint, job_id, requirement_version)`; recomputation
/// overwrites rather than duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// Scored document
    pub fingerprint: Fingerprint,
    /// Job posting
    pub job_id: String,
    /// Requirement version used
    pub requirement_version: u32,
    /// Score in [0, 1]
    pub score: f64,
    /// Required skills the candidate has, in requirement order
    pub matched: Vec<String>,
    /// Required skills the candidate lacks, in requirement order
    pub missing: Vec<String>,
    /// True when the experience gate capped the score
    pub experience_gated: bool,
    /// Human-readable explanation
    pub rationale: String,
}

/// One row of a ranking; derived, never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// 1-based position
    pub rank: usize,
    /// The candidate
    pub profile: CandidateProfile,
    /// Their score for the requested requirement version
    pub score: MatchScore,
    /// When the candidate's document was first registered
    pub registered_at: u64,
}
