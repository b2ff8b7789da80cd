//! Candidate profiles extracted from résumés

use crate::Fingerprint;
use serde::{Deserialize, Serialize};

/// One education entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    /// Degree name as written in the source
    pub degree: String,
    /// Institution name as written in the source
    pub institution: String,
    /// Completion (or expected) year, when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

/// One work-history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    /// Job title
    pub title: String,
    /// Employer
    pub company: String,
    /// Employment period as written in the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Contact details; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Candidate name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// E-mail address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactInfo {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Structured data derived from one unique document
///
/// Created once per fingerprint and immutable afterwards; only an explicit
/// reprocessing request may replace it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// The document this profile was extracted from
    pub fingerprint: Fingerprint,
    /// Skills in the order the source lists them
    pub skills: Vec<String>,
    /// Total professional experience in years
    pub years_experience: f64,
    /// Education history
    pub education: Vec<EducationEntry>,
    /// Work history
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    /// Contact details
    #[serde(default)]
    pub contact_info: ContactInfo,
}

impl CandidateProfile {
    /// True when two profiles carry the same extracted content
    ///
    /// The fingerprint is ignored, so this compares what the model produced.
    pub fn same_content(&self, other: &CandidateProfile) -> bool {
        self.skills == other.skills
            && self.years_experience == other.years_experience
            && self.education == other.education
            && self.experience == other.experience
            && self.contact_info == other.contact_info
    }

    /// Display name for tables, falling back to the short fingerprint
    pub fn display_name(&self) -> String {
        self.contact_info
            .name
            .clone()
            .unwrap_or_else(|| self.fingerprint.short())
    }
}
