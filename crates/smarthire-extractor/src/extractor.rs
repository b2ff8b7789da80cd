//! LLM-backed profile extractor

use crate::chunking::TextChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::merge::merge_profiles;
use crate::parser::parse_profile_response;
use crate::prompt::{PromptBuilder, PROFILE_SCHEMA};
use crate::rate_limit::ModelRateLimiter;
use async_trait::async_trait;
use smarthire_domain::{
    CandidateProfile, Fingerprint, LlmProvider, ModelError, NormalizedText,
    ProfileExtractionError, ProfileExtractor,
};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Extracts candidate profiles by prompting an AI model
///
/// Transient model failures are retried with exponential backoff up to
/// `max_attempts`; a schema-violating answer gets exactly one repair prompt.
/// Every attempt waits on the rate limiter first, outside the request timeout.
pub struct LlmProfileExtractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: ExtractorConfig,
    chunker: TextChunker,
    rate_limiter: Option<ModelRateLimiter>,
}

impl<L> LlmProfileExtractor<L>
where
    L: LlmProvider + 'static,
{
    /// Create a new extractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::with_shared_provider(Arc::new(llm_provider), config)
    }

    /// Create a new extractor around an already shared provider
    pub fn with_shared_provider(
        llm_provider: Arc<L>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let chunker = TextChunker::new(config.max_chunk_size);
        let rate_limiter = ModelRateLimiter::per_minute(config.requests_per_minute);
        Ok(Self {
            llm_provider,
            config,
            chunker,
            rate_limiter,
        })
    }

    /// Share a request budget with other extractors calling the same endpoint
    pub fn with_rate_limiter(mut self, limiter: ModelRateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Request budget, if throttled
    pub fn rate_limiter(&self) -> Option<&ModelRateLimiter> {
        self.rate_limiter.as_ref()
    }

    /// Extract a profile from normalized text
    pub async fn extract(
        &self,
        fingerprint: &Fingerprint,
        text: &NormalizedText,
    ) -> Result<CandidateProfile, ExtractorError> {
        if text.is_empty() {
            return Err(ExtractorError::EmptyText);
        }
        if text.len() > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                text.len(),
                self.config.max_text_length,
            ));
        }

        let chunks = self.chunker.chunk(text.as_str());
        if chunks.is_empty() {
            return Err(ExtractorError::EmptyText);
        }
        info!(
            fingerprint = %fingerprint.short(),
            chars = text.len(),
            chunks = chunks.len(),
            "Starting profile extraction"
        );

        let mut parts = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Processing chunk {}/{}", idx + 1, chunks.len());
            let prompt = PromptBuilder::new(chunk).part(idx, chunks.len());
            parts.push(self.extract_chunk(*fingerprint, &prompt).await?);
        }

        let profile = if parts.len() == 1 {
            parts.remove(0)
        } else {
            merge_profiles(*fingerprint, parts)
        };

        info!(
            fingerprint = %fingerprint.short(),
            skills = profile.skills.len(),
            years = profile.years_experience,
            "Profile extraction complete"
        );
        Ok(profile)
    }

    async fn extract_chunk(
        &self,
        fingerprint: Fingerprint,
        prompt: &PromptBuilder<'_>,
    ) -> Result<CandidateProfile, ExtractorError> {
        let (previous, problem) = match self.call_llm(&prompt.build()).await {
            Ok(response) => match parse_profile_response(&response, fingerprint) {
                Ok(profile) => return Ok(profile),
                Err(e) => (response, e.to_string()),
            },
            Err(ExtractorError::InvalidFormat(problem)) => (String::new(), problem),
            Err(e) => return Err(e),
        };

        warn!(
            fingerprint = %fingerprint.short(),
            %problem,
            "Model response rejected, sending repair prompt"
        );
        let repaired = self
            .call_llm(&prompt.build_repair(&previous, &problem))
            .await?;
        parse_profile_response(&repaired, fingerprint)
    }

    /// Call the model with per-request timeout and bounded exponential backoff
    async fn call_llm(&self, prompt: &str) -> Result<String, ExtractorError> {
        debug!("Prompt length: {} chars", prompt.len());
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_attempts {
            if let Some(limiter) = &self.rate_limiter {
                limiter.acquire().await;
            }
            let outcome = timeout(
                self.config.request_timeout(),
                self.llm_provider.generate_structured(prompt, PROFILE_SCHEMA),
            )
            .await;

            match outcome {
                Ok(Ok(response)) => {
                    debug!("LLM response length: {} chars", response.len());
                    return Ok(response);
                }
                Ok(Err(e)) if e.is_invalid_response() => {
                    return Err(ExtractorError::InvalidFormat(e.to_string()));
                }
                Ok(Err(e)) if e.is_transient() => last_error = e.to_string(),
                Ok(Err(e)) => {
                    return Err(ExtractorError::ModelUnavailable {
                        attempts: attempt,
                        last: e.to_string(),
                    });
                }
                Err(_) => {
                    last_error = format!(
                        "request timed out after {} ms",
                        self.config.request_timeout_ms
                    )
                }
            }

            if attempt < self.config.max_attempts {
                let delay = self.config.backoff_delay(attempt);
                warn!(
                    attempt,
                    max_attempts = self.config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "Model call failed, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(ExtractorError::ModelUnavailable {
            attempts: self.config.max_attempts,
            last: last_error,
        })
    }
}

#[async_trait]
impl<L> ProfileExtractor for LlmProfileExtractor<L>
where
    L: LlmProvider + 'static,
{
    async fn extract_profile(
        &self,
        fingerprint: &Fingerprint,
        text: &NormalizedText,
    ) -> Result<CandidateProfile, ProfileExtractionError> {
        self.extract(fingerprint, text).await.map_err(Into::into)
    }
}
