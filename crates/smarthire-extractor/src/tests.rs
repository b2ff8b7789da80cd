//! Extractor tests against the scripted mock provider

use crate::{ExtractorConfig, ExtractorError, LlmProfileExtractor, ModelRateLimiter};
use smarthire_domain::{Fingerprint, NormalizedText, ProfileExtractionError, ProfileExtractor};
use smarthire_llm::{MockProvider, MockReply};
use std::time::{Duration, Instant};

const VALID: &str = r#"{"skills": ["python", "sql"], "years_experience": 3, "education": [{"degree": "BSc", "institution": "MIT"}]}"#;
const MISSING_SKILLS: &str = r#"{"years_experience": 3, "education": []}"#;

fn fast_config() -> ExtractorConfig {
    ExtractorConfig {
        request_timeout_ms: 200,
        backoff_base_ms: 1,
        backoff_max_ms: 4,
        ..ExtractorConfig::default()
    }
}

fn extractor(llm: MockProvider) -> LlmProfileExtractor<MockProvider> {
    LlmProfileExtractor::new(llm, fast_config()).unwrap()
}

fn fp() -> Fingerprint {
    Fingerprint::from_bytes([5u8; 32])
}

fn text(s: &str) -> NormalizedText {
    NormalizedText::from_normalized(s)
}

#[tokio::test]
async fn test_valid_response_single_call() {
    let llm = MockProvider::new(VALID);
    let profile = extractor(llm.clone())
        .extract(&fp(), &text("Skills\npython, sql"))
        .await
        .unwrap();
    assert_eq!(profile.skills, vec!["python", "sql"]);
    assert_eq!(profile.fingerprint, fp());
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_malformed_then_repaired() {
    let llm = MockProvider::new(VALID);
    llm.enqueue_text(MISSING_SKILLS);

    let profile = extractor(llm.clone())
        .extract(&fp(), &text("Skills\npython"))
        .await
        .unwrap();
    assert_eq!(profile.skills.len(), 2);
    assert_eq!(llm.call_count(), 2);

    let prompts = llm.prompts();
    assert!(prompts[1].contains("missing required field 'skills'"));
    assert!(prompts[1].contains(MISSING_SKILLS));
}

#[tokio::test]
async fn test_malformed_twice_surfaces_after_exactly_one_repair() {
    let llm = MockProvider::new(MISSING_SKILLS);
    let err = extractor(llm.clone())
        .extract_profile(&fp(), &text("Skills\npython"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileExtractionError::MalformedResponse(_)));
    assert_eq!(llm.call_count(), 2);
}

#[tokio::test]
async fn test_not_json_is_malformed() {
    let llm = MockProvider::new("Sorry, I can't do that.");
    let err = extractor(llm.clone())
        .extract_profile(&fp(), &text("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileExtractionError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let llm = MockProvider::new(VALID);
    llm.enqueue(MockReply::Unavailable);
    llm.enqueue(MockReply::RateLimited);

    let profile = extractor(llm.clone()).extract(&fp(), &text("x")).await.unwrap();
    assert_eq!(profile.years_experience, 3.0);
    assert_eq!(llm.call_count(), 3);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let llm = MockProvider::new(VALID);
    for _ in 0..5 {
        llm.enqueue(MockReply::Unavailable);
    }

    let err = extractor(llm.clone()).extract(&fp(), &text("x")).await.unwrap_err();
    assert!(matches!(err, ExtractorError::ModelUnavailable { attempts: 3, .. }));
    assert_eq!(llm.call_count(), 3);
}

#[tokio::test]
async fn test_every_attempt_spends_a_permit() {
    let llm = MockProvider::new(VALID);
    llm.enqueue(MockReply::Unavailable);
    let limiter = ModelRateLimiter::per_minute(3).unwrap();

    let extractor = extractor(llm.clone()).with_rate_limiter(limiter.clone());
    extractor.extract(&fp(), &text("x")).await.unwrap();

    assert_eq!(llm.call_count(), 2);
    assert!(limiter.try_acquire());
    assert!(!limiter.try_acquire());
}

#[tokio::test]
async fn test_shared_limiter_spaces_out_concurrent_extractions() {
    let llm = MockProvider::new(VALID);
    let quota = governor::Quota::with_period(Duration::from_millis(50)).unwrap();
    let limiter = ModelRateLimiter::with_quota(quota);
    let first = extractor(llm.clone()).with_rate_limiter(limiter.clone());
    let second = extractor(llm.clone()).with_rate_limiter(limiter);

    let (fp_a, text_a) = (fp(), text("x"));
    let (fp_b, text_b) = (fp(), text("y"));
    let start = Instant::now();
    let (a, b) = tokio::join!(
        first.extract(&fp_a, &text_a),
        second.extract(&fp_b, &text_b)
    );
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(llm.call_count(), 2);
    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[test]
fn test_configured_rate_builds_limiter() {
    let config = ExtractorConfig {
        requests_per_minute: 2,
        ..fast_config()
    };
    let throttled = LlmProfileExtractor::new(MockProvider::default(), config).unwrap();
    assert!(throttled.rate_limiter().is_some());
    assert!(extractor(MockProvider::default()).rate_limiter().is_none());
}

#[tokio::test]
async fn test_permanent_failure_not_retried() {
    let llm = MockProvider::new(VALID);
    llm.enqueue(MockReply::Fatal("model not found".into()));

    let err = extractor(llm.clone())
        .extract_profile(&fp(), &text("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileExtractionError::ModelUnavailable(_)));
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_hung_request_times_out_as_unavailable() {
    let llm = MockProvider::new(VALID);
    for _ in 0..3 {
        llm.enqueue(MockReply::Hang(Duration::from_secs(5)));
    }

    let err = extractor(llm.clone())
        .extract_profile(&fp(), &text("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileExtractionError::ModelUnavailable(_)));
    assert_eq!(llm.call_count(), 3);
}

#[tokio::test]
async fn test_text_too_long_rejected_before_any_call() {
    let llm = MockProvider::new(VALID);
    let config = ExtractorConfig {
        max_text_length: 100,
        max_chunk_size: 50,
        ..fast_config()
    };
    let extractor = LlmProfileExtractor::new(llm.clone(), config).unwrap();

    let err = extractor.extract(&fp(), &text(&"a".repeat(101))).await.unwrap_err();
    assert_eq!(err, ExtractorError::TextTooLong(101, 100));
    assert_eq!(llm.call_count(), 0);

    let mapped: ProfileExtractionError = err.into();
    assert!(matches!(mapped, ProfileExtractionError::InputRejected(_)));
}

#[tokio::test]
async fn test_long_text_is_chunked_and_merged() {
    let mut llm = MockProvider::new(VALID);
    llm.add_response(
        "part 2 of 2",
        r#"{"skills": ["SQL", "Rust"], "years_experience": 6, "education": [{"degree": "BSc", "institution": "mit"}]}"#,
    );
    let config = ExtractorConfig {
        max_chunk_size: 50,
        ..fast_config()
    };
    let extractor = LlmProfileExtractor::new(llm.clone(), config).unwrap();

    let resume = "Experience\nData Engineer at Acme 2018-2024\nSkills\nPython, SQL, Rust";
    let profile = extractor.extract(&fp(), &text(resume)).await.unwrap();

    assert_eq!(llm.call_count(), 2);
    assert_eq!(profile.skills, vec!["python", "sql", "Rust"]);
    assert_eq!(profile.years_experience, 6.0);
    assert_eq!(profile.education.len(), 1);
}

#[test]
fn test_invalid_config_rejected() {
    let config = ExtractorConfig {
        max_attempts: 0,
        ..ExtractorConfig::default()
    };
    assert!(matches!(
        LlmProfileExtractor::new(MockProvider::default(), config),
        Err(ExtractorError::Config(_))
    ));
}
