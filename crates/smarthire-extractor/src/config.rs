//! Configuration for the profile extractor

use std::time::Duration;

/// Configuration for the profile extractor
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Maximum normalized text length (bytes); longer text is rejected
    pub max_text_length: usize,

    /// Text longer than this is split into chunks extracted separately
    pub max_chunk_size: usize,

    /// Timeout for a single model request (milliseconds)
    pub request_timeout_ms: u64,

    /// Attempts per request for transient model failures
    pub max_attempts: u32,

    /// First backoff delay (milliseconds); doubles per attempt
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff delay (milliseconds)
    pub backoff_max_ms: u64,

    /// Model requests allowed per minute, retries included; 0 disables throttling
    pub requests_per_minute: u32,
}

impl ExtractorConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Delay before retry number `attempt` (1-based): base, 2*base, 4*base, ...
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let delay = self.backoff_base_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.backoff_max_ms))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        if self.max_chunk_size > self.max_text_length {
            return Err("max_chunk_size cannot exceed max_text_length".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err("backoff_max_ms cannot be less than backoff_base_ms".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_text_length: 50_000,
            max_chunk_size: 12_000,
            request_timeout_ms: 30_000,
            max_attempts: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 8_000,
            requests_per_minute: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.requests_per_minute, 0);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = ExtractorConfig {
            max_attempts: 0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_chunk_size_too_large() {
        let mut config = ExtractorConfig::default();
        config.max_chunk_size = config.max_text_length + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = ExtractorConfig {
            backoff_base_ms: 100,
            backoff_max_ms: 350,
            ..ExtractorConfig::default()
        };
        assert_eq!(config.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(config.backoff_delay(3), Duration::from_millis(350));
        assert_eq!(config.backoff_delay(64), Duration::from_millis(350));
    }
}
