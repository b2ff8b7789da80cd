//! Scoring engine
//!
//! A pure, deterministic function of `(profile, requirement, config)`:
//!
//! 1. Canonicalize every candidate skill through the synonym table.
//! 2. Walk the requirement's skills in order; a skill is matched when its
//!    canonical form is in the candidate's set.
//! 3. Base score = matched weight / total weight (1.0 when nothing is required).
//! 4. Experience gate: below the minimum, the score is capped at the ceiling.

use crate::{CandidateProfile, JobRequirement, MatchScore, SynonymTable};
use std::collections::BTreeSet;

/// Default cap applied when a candidate is below the minimum experience
pub const DEFAULT_EXPERIENCE_CEILING: f64 = 0.5;

/// Scoring configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Maximum score attainable below the minimum experience, in [0, 1]
    pub experience_ceiling: f64,
    /// Synonym table used for skill matching
    pub synonyms: SynonymTable,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            experience_ceiling: DEFAULT_EXPERIENCE_CEILING,
            synonyms: SynonymTable::builtin(),
        }
    }
}

/// Score a profile against a requirement version
///
/// # Examples
///
/// ```
/// use smarthire_domain::{score, CandidateProfile, ContactInfo, Fingerprint,
///     JobRequirement, RequirementSkill, ScoringConfig};
///
/// let profile = CandidateProfile {
///     fingerprint: Fingerprint::from_bytes([1; 32]),
///     skills: vec!["Python".into(), "SQL".into()],
///     years_experience: 3.0,
///     education: vec![],
///     experience: vec![],
///     contact_info: ContactInfo::default(),
/// };
/// let requirement = JobRequirement {
///     job_id: "data-eng".into(),
///     version: 1,
///     skills: vec![RequirementSkill::new("python", 0.6), RequirementSkill::new("sql", 0.4)],
///     minimum_experience: Some(2.0),
///     description: String::new(),
///     created_at: 0,
/// };
///
/// let result = score(&profile, &requirement, &ScoringConfig::default());
/// assert_eq!(result.score, 1.0);
/// assert_eq!(result.matched, vec!["python", "sql"]);
/// assert!(result.missing.is_empty());
/// ```
pub fn score(
    profile: &CandidateProfile,
    requirement: &JobRequirement,
    config: &ScoringConfig,
) -> MatchScore {
    let candidate_skills: BTreeSet<String> = profile
        .skills
        .iter()
        .map(|s| config.synonyms.canonicalize(s))
        .filter(|s| !s.is_empty())
        .collect();

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    let mut matched_weight = 0.0;
    let mut total_weight = 0.0;

    for skill in &requirement.skills {
        total_weight += skill.weight;
        if candidate_skills.contains(&config.synonyms.canonicalize(&skill.name)) {
            matched_weight += skill.weight;
            matched.push(skill.name.clone());
        } else {
            missing.push(skill.name.clone());
        }
    }

    let base = if requirement.skills.is_empty() || total_weight <= 0.0 {
        1.0
    } else if missing.is_empty() {
        // Full match is exactly 1.0 whatever the weights sum to.
        1.0
    } else {
        (matched_weight / total_weight).clamp(0.0, 1.0)
    };

    let ceiling = config.experience_ceiling.clamp(0.0, 1.0);
    let below_minimum = requirement
        .minimum_experience
        .is_some_and(|min| profile.years_experience < min);
    let experience_gated = below_minimum && base > ceiling;
    let final_score = if below_minimum { base.min(ceiling) } else { base };

    let rationale = build_rationale(
        &matched,
        requirement.skills.len(),
        matched_weight,
        total_weight,
        profile.years_experience,
        requirement.minimum_experience,
        below_minimum,
        ceiling,
    );

    MatchScore {
        fingerprint: profile.fingerprint,
        job_id: requirement.job_id.clone(),
        requirement_version: requirement.version,
        score: final_score,
        matched,
        missing,
        experience_gated,
        rationale,
    }
}

#[allow(clippy::too_many_arguments)]
fn build_rationale(
    matched: &[String],
    required_count: usize,
    matched_weight: f64,
    total_weight: f64,
    years: f64,
    minimum: Option<f64>,
    below_minimum: bool,
    ceiling: f64,
) -> String {
    let skills_part = if required_count == 0 {
        "no required skills".to_string()
    } else {
        format!(
            "matched {}/{} required skills (weight {:.2}/{:.2})",
            matched.len(),
            required_count,
            matched_weight,
            total_weight
        )
    };
    let experience_part = match minimum {
        None => format!("experience {:.1}y, no minimum", years),
        Some(min) if below_minimum => format!(
            "experience {:.1}y below minimum {:.1}y, score capped at {:.2}",
            years, min, ceiling
        ),
        Some(min) => format!("experience {:.1}y meets minimum {:.1}y", years, min),
    };
    format!("{}; {}", skills_part, experience_part)
}
