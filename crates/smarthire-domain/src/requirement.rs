//! Versioned job requirements
//!
//! Every edit mints a new `version`; a version never changes after creation,
//! so a `MatchScore` always points at the exact requirement it was computed from.

use crate::SynonymTable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Weight applied when a required skill does not state one
pub const DEFAULT_SKILL_WEIGHT: f64 = 1.0;

/// Requirement validation errors
#[derive(Debug, Error, PartialEq)]
pub enum RequirementError {
    /// Job identifier is empty
    #[error("job_id must not be empty")]
    EmptyJobId,

    /// Skill name is empty
    #[error("skill names must not be empty")]
    EmptySkill,

    /// Weight is zero, negative or not finite
    #[error("invalid weight {weight} for skill '{skill}'")]
    InvalidWeight {
        /// Offending skill
        skill: String,
        /// Offending weight
        weight: f64,
    },

    /// Same skill listed twice
    #[error("skill '{0}' is listed more than once")]
    DuplicateSkill(String),

    /// Minimum experience is negative or not finite
    #[error("invalid minimum experience {0}")]
    InvalidMinimumExperience(f64),
}

/// A required skill with its weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSkill {
    /// Skill name as the administrator wrote it
    pub name: String,
    /// Relative importance, > 0
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    DEFAULT_SKILL_WEIGHT
}

impl RequirementSkill {
    /// Skill with an explicit weight
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    /// Skill with the default weight
    pub fn unweighted(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_SKILL_WEIGHT)
    }

    /// Parse `name` or `name:weight` (as typed on the command line)
    ///
    /// # Examples
    ///
    /// ```
    /// use smarthire_domain::RequirementSkill;
    ///
    /// assert_eq!(RequirementSkill::parse("python:0.6").unwrap().weight, 0.6);
    /// assert_eq!(RequirementSkill::parse("sql").unwrap().weight, 1.0);
    /// assert!(RequirementSkill::parse("sql:lots").is_err());
    /// ```
    pub fn parse(spec: &str) -> Result<Self, String> {
        match spec.rsplit_once(':') {
            Some((name, weight)) => {
                let weight: f64 = weight
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid weight in '{}'", spec))?;
                Ok(Self::new(name.trim(), weight))
            }
            None => Ok(Self::unweighted(spec.trim())),
        }
    }
}

/// What an administrator submits when defining or editing a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementDraft {
    /// Job posting identifier
    pub job_id: String,
    /// Weighted required skills
    #[serde(default)]
    pub skills: Vec<RequirementSkill>,
    /// Minimum years of experience, if any
    #[serde(default)]
    pub minimum_experience: Option<f64>,
    /// Free-text job description
    #[serde(default)]
    pub description: String,
}

impl RequirementDraft {
    /// Check the draft before a version is minted for it
    pub fn validate(&self) -> Result<(), RequirementError> {
        self.validate_with(&SynonymTable::empty())
    }

    /// Like [`RequirementDraft::validate`], treating synonyms as duplicates
    ///
    /// # Examples
    ///
    /// ```
    /// use smarthire_domain::{RequirementDraft, RequirementError, RequirementSkill, SynonymTable};
    ///
    /// let draft = RequirementDraft {
    ///     job_id: "web".into(),
    ///     skills: vec![RequirementSkill::unweighted("JS"), RequirementSkill::unweighted("JavaScript")],
    ///     minimum_experience: None,
    ///     description: String::new(),
    /// };
    /// assert!(draft.validate().is_ok());
    /// assert_eq!(
    ///     draft.validate_with(&SynonymTable::builtin()),
    ///     Err(RequirementError::DuplicateSkill("JavaScript".into()))
    /// );
    /// ```
    pub fn validate_with(&self, synonyms: &SynonymTable) -> Result<(), RequirementError> {
        if self.job_id.trim().is_empty() {
            return Err(RequirementError::EmptyJobId);
        }
        let mut seen = HashSet::new();
        for skill in &self.skills {
            let key = synonyms.canonicalize(&skill.name);
            if key.is_empty() {
                return Err(RequirementError::EmptySkill);
            }
            if !skill.weight.is_finite() || skill.weight <= 0.0 {
                return Err(RequirementError::InvalidWeight {
                    skill: skill.name.clone(),
                    weight: skill.weight,
                });
            }
            if !seen.insert(key) {
                return Err(RequirementError::DuplicateSkill(skill.name.clone()));
            }
        }
        if let Some(min) = self.minimum_experience {
            if !min.is_finite() || min < 0.0 {
                return Err(RequirementError::InvalidMinimumExperience(min));
            }
        }
        Ok(())
    }
}

/// An immutable requirement snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    /// Job posting identifier
    pub job_id: String,
    /// Version number, starting at 1 for each job
    pub version: u32,
    /// Weighted required skills
    pub skills: Vec<RequirementSkill>,
    /// Minimum years of experience, if any
    pub minimum_experience: Option<f64>,
    /// Free-text job description
    pub description: String,
    /// When this version was minted (milliseconds since epoch)
    pub created_at: u64,
}

impl JobRequirement {
    /// Sum of all skill weights
    pub fn total_weight(&self) -> f64 {
        self.skills.iter().map(|s| s.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(skills: Vec<RequirementSkill>) -> RequirementDraft {
        RequirementDraft {
            job_id: "backend-1".to_string(),
            skills,
            minimum_experience: Some(2.0),
            description: String::new(),
        }
    }

    #[test]
    fn test_valid_draft() {
        let d = draft(vec![
            RequirementSkill::new("python", 0.6),
            RequirementSkill::new("sql", 0.4),
        ]);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_rejects_duplicate_skill_case_insensitive() {
        let d = draft(vec![
            RequirementSkill::unweighted("Python"),
            RequirementSkill::unweighted("python "),
        ]);
        assert!(matches!(d.validate(), Err(RequirementError::DuplicateSkill(_))));
    }

    #[test]
    fn test_rejects_bad_weights() {
        for w in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let d = draft(vec![RequirementSkill::new("rust", w)]);
            assert!(matches!(d.validate(), Err(RequirementError::InvalidWeight { .. })));
        }
    }

    #[test]
    fn test_rejects_empty_job_id_and_negative_minimum() {
        let mut d = draft(vec![]);
        d.job_id = "  ".to_string();
        assert_eq!(d.validate(), Err(RequirementError::EmptyJobId));

        let mut d = draft(vec![]);
        d.minimum_experience = Some(-1.0);
        assert_eq!(
            d.validate(),
            Err(RequirementError::InvalidMinimumExperience(-1.0))
        );
    }

    #[test]
    fn test_weight_defaults_when_absent_in_json() {
        let skill: RequirementSkill = serde_json::from_str(r#"{"name": "go"}"#).unwrap();
        assert_eq!(skill.weight, DEFAULT_SKILL_WEIGHT);
    }
}
