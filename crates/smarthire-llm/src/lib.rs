//! SmartHire LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `smarthire-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted, deterministic provider for tests
//! - `GeminiProvider`: Google Gemini `generateContent` API
//!
//! # Examples
//!
//! ```
//! use smarthire_llm::MockProvider;
//! use smarthire_domain::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let result = rt.block_on(provider.generate("test prompt")).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod gemini;

use async_trait::async_trait;
use smarthire_domain::{LlmProvider, ModelError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response envelope could not be read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Credential missing or rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl ModelError for LlmError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Communication(_) | LlmError::RateLimitExceeded | LlmError::Timeout
        )
    }

    fn is_invalid_response(&self) -> bool {
        matches!(self, LlmError::InvalidResponse(_))
    }
}

/// One scripted reply of the [`MockProvider`]
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this text
    Text(String),
    /// Fail with a transient communication error
    Unavailable,
    /// Fail with a rate-limit error
    RateLimited,
    /// Fail with a permanent error
    Fatal(String),
    /// Sleep for the duration, then answer with the default response
    Hang(Duration),
}

/// Mock LLM provider for deterministic testing
///
/// Replies are chosen in this order:
///
/// 1. the next scripted reply, if any remain
/// 2. the first registered response whose key the prompt contains
/// 3. the default response
///
/// Clones share the script, counters and recorded prompts.
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, String)>>>,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer `response` to any prompt containing `key`
    pub fn add_response(&mut self, key: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((key.into(), response.into()));
    }

    /// Queue a scripted reply
    pub fn enqueue(&self, reply: MockReply) {
        lock(&self.script).push_back(reply);
    }

    /// Queue a scripted text reply
    pub fn enqueue_text(&self, text: impl Into<String>) {
        self.enqueue(MockReply::Text(text.into()));
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count and recorded prompts
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
        lock(&self.prompts).clear();
    }

    /// Every prompt received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    fn next_reply(&self, prompt: &str) -> Option<MockReply> {
        *lock(&self.call_count) += 1;
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.script).pop_front()
    }

    fn lookup(&self, prompt: &str) -> String {
        lock(&self.responses)
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self.next_reply(prompt) {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Unavailable) => Err(LlmError::Communication(
                "mock provider unavailable".to_string(),
            )),
            Some(MockReply::RateLimited) => Err(LlmError::RateLimitExceeded),
            Some(MockReply::Fatal(reason)) => Err(LlmError::Other(reason)),
            Some(MockReply::Hang(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(self.lookup(prompt))
            }
            None => Ok(self.lookup(prompt)),
        }
    }

    async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt).await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
