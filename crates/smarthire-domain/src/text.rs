//! Normalized document text

use std::fmt;

/// Section headers the normalizer and the chunker treat as structural cues
pub const SECTION_HEADERS: &[&str] = &[
    "professional summary",
    "technical skills",
    "work experience",
    "work history",
    "certifications",
    "achievements",
    "employment",
    "experience",
    "education",
    "objective",
    "projects",
    "summary",
    "contact",
    "skills",
];

/// Plain text after structure-preserving cleanup
///
/// Produced only by the text extractor's normalizer, so holders can rely on:
/// no control characters other than `\n`, no runs of horizontal whitespace,
/// no blank lines, and section headers on their own lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Wrap text that has already been normalized
    pub fn from_normalized(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Borrow the text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there is no text at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// If `line` is a known section header (optionally followed by `:`), return it lowercased
pub fn section_header(line: &str) -> Option<&'static str> {
    let trimmed = line.trim().trim_end_matches(':').trim();
    SECTION_HEADERS
        .iter()
        .copied()
        .find(|h| trimmed.eq_ignore_ascii_case(h))
}
