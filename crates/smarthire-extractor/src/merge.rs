//! Deterministic merge of per-chunk profiles

use smarthire_domain::{CandidateProfile, ContactInfo, Fingerprint};
use std::collections::HashSet;

/// Merge partial profiles extracted from consecutive chunks
///
/// Skills are unioned in first-seen order, the largest experience figure
/// wins, entries are deduplicated case-insensitively and the first non-empty
/// contact field wins. The result depends only on the order of `parts`.
pub fn merge_profiles(fingerprint: Fingerprint, parts: Vec<CandidateProfile>) -> CandidateProfile {
    let mut merged = CandidateProfile {
        fingerprint,
        skills: Vec::new(),
        years_experience: 0.0,
        education: Vec::new(),
        experience: Vec::new(),
        contact_info: ContactInfo::default(),
    };

    let mut seen_skills = HashSet::new();
    let mut seen_education = HashSet::new();
    let mut seen_experience = HashSet::new();

    for part in parts {
        for skill in part.skills {
            if seen_skills.insert(skill.to_lowercase()) {
                merged.skills.push(skill);
            }
        }

        merged.years_experience = merged.years_experience.max(part.years_experience);

        for entry in part.education {
            let key = (entry.degree.to_lowercase(), entry.institution.to_lowercase());
            if seen_education.insert(key) {
                merged.education.push(entry);
            }
        }

        for entry in part.experience {
            let key = (entry.title.to_lowercase(), entry.company.to_lowercase());
            if seen_experience.insert(key) {
                merged.experience.push(entry);
            }
        }

        let contact = &mut merged.contact_info;
        contact.name = contact.name.take().or(part.contact_info.name);
        contact.email = contact.email.take().or(part.contact_info.email);
        contact.phone = contact.phone.take().or(part.contact_info.phone);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthire_domain::{EducationEntry, ExperienceEntry};

    fn part(skills: &[&str], years: f64) -> CandidateProfile {
        CandidateProfile {
            fingerprint: Fingerprint::from_bytes([0u8; 32]),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            years_experience: years,
            education: vec![],
            experience: vec![],
            contact_info: ContactInfo::default(),
        }
    }

    #[test]
    fn test_skills_union_first_seen() {
        let merged = merge_profiles(
            Fingerprint::from_bytes([1u8; 32]),
            vec![part(&["Rust", "SQL"], 2.0), part(&["sql", "Go"], 5.0), part(&[], 3.0)],
        );
        assert_eq!(merged.skills, vec!["Rust", "SQL", "Go"]);
        assert_eq!(merged.years_experience, 5.0);
        assert_eq!(merged.fingerprint, Fingerprint::from_bytes([1u8; 32]));
    }

    #[test]
    fn test_entries_deduplicated() {
        let mut a = part(&[], 0.0);
        a.education.push(EducationEntry {
            degree: "BSc".into(),
            institution: "MIT".into(),
            year: None,
        });
        a.experience.push(ExperienceEntry {
            title: "Engineer".into(),
            company: "Acme".into(),
            duration: None,
        });
        let mut b = a.clone();
        b.education[0].institution = "mit".into();
        b.experience.push(ExperienceEntry {
            title: "Lead".into(),
            company: "Acme".into(),
            duration: Some("2022-".into()),
        });

        let merged = merge_profiles(a.fingerprint, vec![a, b]);
        assert_eq!(merged.education.len(), 1);
        assert_eq!(merged.experience.len(), 2);
    }

    #[test]
    fn test_first_contact_field_wins() {
        let mut a = part(&[], 0.0);
        a.contact_info.email = Some("a@example.com".into());
        let mut b = part(&[], 0.0);
        b.contact_info.name = Some("Jane".into());
        b.contact_info.email = Some("b@example.com".into());

        let merged = merge_profiles(a.fingerprint, vec![a, b]);
        assert_eq!(merged.contact_info.name.as_deref(), Some("Jane"));
        assert_eq!(merged.contact_info.email.as_deref(), Some("a@example.com"));
    }
}
