//! Deterministic stub extractor
//!
//! Returns fixed profiles by fingerprint. Unmapped documents get a profile
//! read straight from the text: the lines of the skills section and the
//! largest "N years" figure. No model is involved.

use async_trait::async_trait;
use smarthire_domain::text::section_header;
use smarthire_domain::{
    CandidateProfile, ContactInfo, Fingerprint, NormalizedText, ProfileExtractionError,
    ProfileExtractor,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Stub extractor with a fixed fingerprint-to-profile mapping
#[derive(Debug, Clone, Default)]
pub struct StubProfileExtractor {
    profiles: Arc<Mutex<HashMap<Fingerprint, CandidateProfile>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl StubProfileExtractor {
    /// Create a stub with no fixed profiles
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long in every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Return `profile` for documents with this fingerprint
    pub fn insert(&self, fingerprint: Fingerprint, profile: CandidateProfile) {
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fingerprint, CandidateProfile { fingerprint, ..profile });
    }

    /// Number of extraction calls so far
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProfileExtractor for StubProfileExtractor {
    async fn extract_profile(
        &self,
        fingerprint: &Fingerprint,
        text: &NormalizedText,
    ) -> Result<CandidateProfile, ProfileExtractionError> {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let fixed = self
            .profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(fingerprint)
            .cloned();
        Ok(fixed.unwrap_or_else(|| profile_from_text(*fingerprint, text.as_str())))
    }
}

/// Read a profile directly from normalized text
pub fn profile_from_text(fingerprint: Fingerprint, text: &str) -> CandidateProfile {
    let mut skills = Vec::new();
    let mut seen = HashSet::new();
    let mut in_skills = false;

    for line in text.lines() {
        if let Some(header) = section_header(line) {
            in_skills = header.ends_with("skills");
            continue;
        }
        if !in_skills {
            continue;
        }
        let line = line.trim_start_matches('-').trim();
        for skill in line.split([',', ';', '|', '/']) {
            let skill = skill.trim();
            if !skill.is_empty() && seen.insert(skill.to_lowercase()) {
                skills.push(skill.to_string());
            }
        }
    }

    CandidateProfile {
        fingerprint,
        skills,
        years_experience: years_mentioned(text),
        education: Vec::new(),
        experience: Vec::new(),
        contact_info: ContactInfo::default(),
    }
}

/// Largest number directly followed by "year(s)" or "yrs"
fn years_mentioned(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .windows(2)
        .filter(|pair| {
            let unit = pair[1].to_lowercase();
            unit.starts_with("year") || unit.starts_with("yrs")
        })
        .filter_map(|pair| pair[0].trim_end_matches('+').parse::<f64>().ok())
        .filter(|years| years.is_finite() && *years >= 0.0)
        .fold(0.0, f64::max)
}
