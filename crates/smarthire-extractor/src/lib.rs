//! SmartHire Profile Extractor
//!
//! Turns normalized résumé text into a validated [`CandidateProfile`](smarthire_domain::CandidateProfile).
//!
//! # Architecture
//!
//! ```text
//! NormalizedText → chunks → LLM → schema validation (→ one repair prompt) → merge → CandidateProfile
//! ```
//!
//! # Implementations
//!
//! - [`LlmProfileExtractor`]: prompts any `LlmProvider`, with bounded
//!   backoff for transient failures and a single repair retry for
//!   schema-violating answers
//! - [`StubProfileExtractor`]: deterministic fixed mapping, no model
//!
//! # Example Usage
//!
//! ```no_run
//! use smarthire_extractor::{ExtractorConfig, LlmProfileExtractor};
//! use smarthire_domain::{Fingerprint, NormalizedText};
//! use smarthire_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"skills": ["Rust"], "years_experience": 3, "education": []}"#);
//! let extractor = LlmProfileExtractor::new(llm, ExtractorConfig::default())?;
//!
//! let text = NormalizedText::from_normalized("Skills\nRust");
//! let profile = extractor.extract(&Fingerprint::from_bytes([0; 32]), &text).await?;
//! println!("{} skills", profile.skills.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod merge;
mod parser;
mod prompt;
mod rate_limit;
mod stub;

#[cfg(test)]
mod tests;

pub use chunking::TextChunker;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::LlmProfileExtractor;
pub use merge::merge_profiles;
pub use parser::parse_profile_response;
pub use prompt::{PromptBuilder, PROFILE_SCHEMA};
pub use rate_limit::ModelRateLimiter;
pub use stub::{profile_from_text, StubProfileExtractor};
