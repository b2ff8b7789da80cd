//! Parse and validate model output into candidate profiles
//!
//! The model's answer is untrusted: every field is checked by hand against
//! the profile schema before a [`CandidateProfile`] is built.

use crate::error::ExtractorError;
use serde_json::{Map, Value};
use smarthire_domain::{CandidateProfile, ContactInfo, EducationEntry, ExperienceEntry, Fingerprint};
use std::collections::HashSet;

/// Parse a model response into a validated profile
pub fn parse_profile_response(
    response: &str,
    fingerprint: Fingerprint,
) -> Result<CandidateProfile, ExtractorError> {
    let json_str = extract_json(response)?;
    let json: Value = serde_json::from_str(&strip_trailing_commas(&json_str))
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object at the top level"))?;

    let skills = parse_skills(obj)?;
    let years_experience = parse_years(obj)?;
    let education = parse_array(obj, "education", true, parse_education)?;
    let experience = parse_array(obj, "experience", false, parse_experience)?;
    let contact_info = parse_contact(obj)?;

    Ok(CandidateProfile {
        fingerprint,
        skills,
        years_experience,
        education,
        experience,
        contact_info,
    })
}

fn invalid(msg: impl Into<String>) -> ExtractorError {
    ExtractorError::InvalidFormat(msg.into())
}

/// Extract JSON from response, handling markdown code blocks and chatter
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let mut trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(invalid("empty code block"));
        }
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        return Ok(lines[1..end].join("\n"));
    }

    // Some models wrap the object in a sentence
    if !trimmed.starts_with('{') {
        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
            if start < end {
                trimmed = &trimmed[start..=end];
            }
        }
    }

    if trimmed.is_empty() {
        return Err(invalid("empty response"));
    }
    Ok(trimmed.to_string())
}

/// Remove commas directly before `}` or `]`, outside of strings
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn parse_skills(obj: &Map<String, Value>) -> Result<Vec<String>, ExtractorError> {
    let array = obj
        .get("skills")
        .ok_or_else(|| invalid("missing required field 'skills'"))?
        .as_array()
        .ok_or_else(|| invalid("'skills' must be an array of strings"))?;

    let mut seen = HashSet::new();
    let mut skills = Vec::with_capacity(array.len());
    for (idx, value) in array.iter().enumerate() {
        let skill = value
            .as_str()
            .ok_or_else(|| invalid(format!("skills[{}] must be a string", idx)))?
            .trim();
        if skill.is_empty() {
            continue;
        }
        if seen.insert(skill.to_lowercase()) {
            skills.push(skill.to_string());
        }
    }
    Ok(skills)
}

fn parse_years(obj: &Map<String, Value>) -> Result<f64, ExtractorError> {
    let years = obj
        .get("years_experience")
        .ok_or_else(|| invalid("missing required field 'years_experience'"))?
        .as_f64()
        .ok_or_else(|| invalid("'years_experience' must be a number"))?;
    if !years.is_finite() || years < 0.0 {
        return Err(invalid(format!(
            "'years_experience' must be a non-negative number, got {}",
            years
        )));
    }
    Ok(years)
}

fn parse_array<T>(
    obj: &Map<String, Value>,
    field: &str,
    required: bool,
    parse_item: fn(&Map<String, Value>, usize) -> Result<T, ExtractorError>,
) -> Result<Vec<T>, ExtractorError> {
    let array = match obj.get(field) {
        None | Some(Value::Null) if !required => return Ok(Vec::new()),
        None => return Err(invalid(format!("missing required field '{}'", field))),
        Some(value) => value
            .as_array()
            .ok_or_else(|| invalid(format!("'{}' must be an array", field)))?,
    };

    array
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let item = item
                .as_object()
                .ok_or_else(|| invalid(format!("{}[{}] must be an object", field, idx)))?;
            parse_item(item, idx)
        })
        .collect()
}

fn parse_education(obj: &Map<String, Value>, idx: usize) -> Result<EducationEntry, ExtractorError> {
    Ok(EducationEntry {
        degree: required_str(obj, "degree", "education", idx)?,
        institution: required_str(obj, "institution", "education", idx)?,
        year: optional_text(obj, "year", "education", idx)?,
    })
}

fn parse_experience(obj: &Map<String, Value>, idx: usize) -> Result<ExperienceEntry, ExtractorError> {
    Ok(ExperienceEntry {
        title: required_str(obj, "title", "experience", idx)?,
        company: required_str(obj, "company", "experience", idx)?,
        duration: optional_text(obj, "duration", "experience", idx)?,
    })
}

fn parse_contact(obj: &Map<String, Value>) -> Result<ContactInfo, ExtractorError> {
    let contact = match obj.get("contact_info") {
        None | Some(Value::Null) => return Ok(ContactInfo::default()),
        Some(value) => value
            .as_object()
            .ok_or_else(|| invalid("'contact_info' must be an object"))?,
    };
    Ok(ContactInfo {
        name: optional_text(contact, "name", "contact_info", 0)?,
        email: optional_text(contact, "email", "contact_info", 0)?,
        phone: optional_text(contact, "phone", "contact_info", 0)?,
    })
}

fn required_str(
    obj: &Map<String, Value>,
    key: &str,
    field: &str,
    idx: usize,
) -> Result<String, ExtractorError> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| invalid(format!("{}[{}].{} must be a string", field, idx, key)))
}

/// Optional string; numbers (a bare year) are accepted, blanks become `None`
fn optional_text(
    obj: &Map<String, Value>,
    key: &str,
    field: &str,
    idx: usize,
) -> Result<Option<String>, ExtractorError> {
    let text = match obj.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(invalid(format!(
                "{}[{}].{} must be a string",
                field, idx, key
            )))
        }
    };
    Ok(if text.is_empty() { None } else { Some(text) })
}
