//! End-to-end tests for the ingestion pipeline
//!
//! Real SQLite store (in memory), in-memory blobs, and either the
//! LLM-backed extractor over a scripted `MockProvider` or the deterministic
//! stub extractor.

use smarthire_document::{fingerprint, InMemoryBlobStore};
use smarthire_domain::{
    CandidateProfile, ContactInfo, FailureKind, Fingerprint, RequirementDraft, RequirementSkill,
    SubmissionState,
};
use smarthire_extractor::{ExtractorConfig, LlmProfileExtractor, StubProfileExtractor};
use smarthire_llm::MockProvider;
use smarthire_pipeline::{IngestionPipeline, PipelineError, SmartHireConfig};
use smarthire_store::SqliteStore;
use std::time::Duration;

type LlmPipeline = IngestionPipeline<SqliteStore, InMemoryBlobStore, LlmProfileExtractor<MockProvider>>;
type StubPipeline = IngestionPipeline<SqliteStore, InMemoryBlobStore, StubProfileExtractor>;

const RESUME: &[u8] = b"Ada Lovelace\nSkills\nPython, SQL\nExperience\nData Engineer, 3 years";

const VALID_PROFILE: &str = r#"{
    "skills": ["Python", "SQL"],
    "years_experience": 3,
    "education": [{"degree": "BSc Mathematics", "institution": "London"}],
    "contact_info": {"name": "Ada Lovelace"}
}"#;

fn fast_extractor_config() -> ExtractorConfig {
    ExtractorConfig {
        request_timeout_ms: 1_000,
        backoff_base_ms: 1,
        backoff_max_ms: 5,
        ..ExtractorConfig::default()
    }
}

fn llm_pipeline(mock: &MockProvider) -> LlmPipeline {
    let extractor = LlmProfileExtractor::new(mock.clone(), fast_extractor_config()).unwrap();
    IngestionPipeline::new(
        SqliteStore::new(":memory:").unwrap(),
        InMemoryBlobStore::new(),
        extractor,
        &SmartHireConfig::default(),
    )
}

fn stub_pipeline_with(stub: &StubProfileExtractor, config: &SmartHireConfig) -> StubPipeline {
    IngestionPipeline::new(
        SqliteStore::new(":memory:").unwrap(),
        InMemoryBlobStore::new(),
        stub.clone(),
        config,
    )
}

fn stub_pipeline(stub: &StubProfileExtractor) -> StubPipeline {
    stub_pipeline_with(stub, &SmartHireConfig::default())
}

fn data_engineer(job_id: &str) -> RequirementDraft {
    RequirementDraft {
        job_id: job_id.to_string(),
        skills: vec![
            RequirementSkill::new("python", 0.6),
            RequirementSkill::new("sql", 0.4),
        ],
        minimum_experience: Some(2.0),
        description: "Builds data pipelines".to_string(),
    }
}

fn profile(skills: &[&str], years: f64, name: &str) -> CandidateProfile {
    CandidateProfile {
        fingerprint: Fingerprint::from_bytes([0; 32]),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        years_experience: years,
        education: vec![],
        experience: vec![],
        contact_info: ContactInfo {
            name: Some(name.to_string()),
            ..ContactInfo::default()
        },
    }
}

#[tokio::test]
async fn test_full_match_scores_one() {
    let mock = MockProvider::new(VALID_PROFILE);
    let pipeline = llm_pipeline(&mock);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let outcome = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", None).await;

    assert_eq!(outcome.state, SubmissionState::Persisted);
    assert_eq!(
        outcome.path,
        vec![
            SubmissionState::Received,
            SubmissionState::Fingerprinted,
            SubmissionState::ExtractingText,
            SubmissionState::Profiling,
            SubmissionState::Scoring,
            SubmissionState::Persisted,
        ]
    );
    let score = outcome.score.unwrap();
    assert_eq!(score.score, 1.0);
    assert_eq!(score.matched, vec!["python", "sql"]);
    assert!(score.missing.is_empty());
    assert_eq!(outcome.fingerprint, Some(fingerprint(RESUME)));
    assert_eq!(outcome.requirement_version, Some(1));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_identical_upload_short_circuits() {
    let mock = MockProvider::new(VALID_PROFILE);
    let pipeline = llm_pipeline(&mock);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let first = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", None).await;
    let second = pipeline.submit(RESUME.to_vec(), "ada-copy.txt", "data-eng", None).await;

    assert!(first.is_persisted());
    assert!(!first.via_duplicate);
    assert_eq!(second.state, SubmissionState::Persisted);
    assert!(second.via_duplicate);
    assert_eq!(
        second.path,
        vec![
            SubmissionState::Received,
            SubmissionState::Fingerprinted,
            SubmissionState::DuplicateShortCircuit,
            SubmissionState::Persisted,
        ]
    );
    assert_eq!(second.score, first.score);
    assert_eq!(mock.call_count(), 1, "No second model call for known content");
}

#[tokio::test]
async fn test_duplicate_is_rescored_against_requested_version() {
    let mock = MockProvider::new(VALID_PROFILE);
    let pipeline = llm_pipeline(&mock);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();
    let mut stricter = data_engineer("data-eng");
    stricter.skills.push(RequirementSkill::new("spark", 1.0));
    pipeline.define_requirement(stricter).unwrap();

    let v2 = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", None).await;
    let v1 = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", Some(1)).await;

    assert_eq!(v2.requirement_version, Some(2));
    assert_eq!(v2.score.unwrap().score, 0.5);
    assert!(v1.via_duplicate);
    assert_eq!(v1.score.unwrap().score, 1.0);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_missing_skills_fails_after_one_repair() {
    let mock = MockProvider::new(r#"{"years_experience": 2, "education": []}"#);
    let pipeline = llm_pipeline(&mock);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let outcome = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", None).await;

    assert_eq!(
        outcome.state,
        SubmissionState::Failed(FailureKind::MalformedResponse)
    );
    assert_eq!(mock.call_count(), 2, "Original prompt plus exactly one repair");
    assert!(outcome.message.unwrap().contains("skills"));
    assert!(outcome.score.is_none());
    assert!(pipeline.profile(&fingerprint(RESUME)).unwrap().is_none());
    assert!(pipeline.rank("data-eng", 1).unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_extraction_can_be_resubmitted() {
    let mock = MockProvider::new(VALID_PROFILE);
    mock.enqueue_text("not json");
    mock.enqueue_text("still not json");
    let pipeline = llm_pipeline(&mock);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let failed = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", None).await;
    assert_eq!(failed.failure(), Some(FailureKind::MalformedResponse));

    let retried = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", None).await;
    assert!(retried.is_persisted());
    assert!(!retried.via_duplicate);
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn test_concurrent_identical_uploads_extract_once() {
    let stub = StubProfileExtractor::new().with_delay(Duration::from_millis(50));
    stub.insert(fingerprint(RESUME), profile(&["python", "sql"], 3.0, "Ada"));
    let pipeline = stub_pipeline(&stub);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                pipeline
                    .submit(RESUME.to_vec(), &format!("upload-{}.txt", i), "data-eng", None)
                    .await
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    assert!(outcomes.iter().all(|o| o.is_persisted()));
    assert_eq!(outcomes.iter().filter(|o| !o.via_duplicate).count(), 1);
    assert_eq!(stub.call_count(), 1);
    assert_eq!(pipeline.rank("data-eng", 1).unwrap().len(), 1);
}

#[tokio::test]
async fn test_different_content_never_collides() {
    let stub = StubProfileExtractor::new();
    let a = b"Skills\nPython\nExperience\n5 years".to_vec();
    let b = b"Skills\nPython\nExperience\n5 years\n".to_vec();
    stub.insert(fingerprint(&a), profile(&["python"], 5.0, "Ada"));
    stub.insert(fingerprint(&b), profile(&["python", "sql"], 5.0, "Ada"));
    let pipeline = stub_pipeline(&stub);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let (first, second) = tokio::join!(
        pipeline.submit(a.clone(), "ada-v1.txt", "data-eng", None),
        pipeline.submit(b.clone(), "ada-v2.txt", "data-eng", None),
    );

    assert_ne!(first.fingerprint, second.fingerprint);
    assert!(first.is_persisted() && second.is_persisted());
    assert!(!first.via_duplicate && !second.via_duplicate);
    assert_eq!(pipeline.rank("data-eng", 1).unwrap().len(), 2);
    assert_eq!(
        pipeline.profile(&fingerprint(&a)).unwrap().unwrap().skills,
        vec!["python"]
    );
    assert_eq!(
        pipeline.profile(&fingerprint(&b)).unwrap().unwrap().skills,
        vec!["python", "sql"]
    );
}

#[tokio::test]
async fn test_experience_gate_caps_score() {
    let stub = StubProfileExtractor::new();
    stub.insert(fingerprint(RESUME), profile(&["Python", "SQL"], 1.0, "Junior"));
    let pipeline = stub_pipeline(&stub);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let outcome = pipeline.submit(RESUME.to_vec(), "junior.txt", "data-eng", None).await;

    let score = outcome.score.unwrap();
    assert_eq!(score.score, 0.5);
    assert!(score.experience_gated);
    assert_eq!(score.matched, vec!["python", "sql"]);
}

#[tokio::test]
async fn test_ranking_is_deterministic_with_registration_tiebreak() {
    let stub = StubProfileExtractor::new();
    let docs: Vec<Vec<u8>> = (0..3)
        .map(|i| format!("Candidate {}\nSkills\nPython", i).into_bytes())
        .collect();
    stub.insert(fingerprint(&docs[0]), profile(&["python"], 3.0, "First"));
    stub.insert(fingerprint(&docs[1]), profile(&["python", "sql"], 3.0, "Best"));
    stub.insert(fingerprint(&docs[2]), profile(&["python"], 3.0, "Third"));
    let pipeline = stub_pipeline(&stub);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    for (i, doc) in docs.iter().enumerate() {
        let outcome = pipeline
            .submit(doc.clone(), &format!("c{}.txt", i), "data-eng", None)
            .await;
        assert!(outcome.is_persisted());
    }

    let ranked = pipeline.rank("data-eng", 1).unwrap();
    let names: Vec<String> = ranked.iter().map(|r| r.profile.display_name()).collect();
    assert_eq!(names, vec!["Best", "First", "Third"]);
    assert_eq!(ranked[1].score.score, ranked[2].score.score);
    assert_eq!(pipeline.rank("data-eng", 1).unwrap(), ranked);
}

#[tokio::test]
async fn test_shortlist_applies_threshold() {
    let stub = StubProfileExtractor::new();
    let strong = b"Strong\nSkills\nPython, SQL".to_vec();
    let weak = b"Weak\nSkills\nPython".to_vec();
    stub.insert(fingerprint(&strong), profile(&["python", "sql"], 4.0, "Strong"));
    stub.insert(fingerprint(&weak), profile(&["python"], 4.0, "Weak"));
    let pipeline = stub_pipeline(&stub);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    pipeline.submit(weak, "weak.txt", "data-eng", None).await;
    pipeline.submit(strong, "strong.txt", "data-eng", None).await;

    assert_eq!(pipeline.rank("data-eng", 1).unwrap().len(), 2);
    let shortlist = pipeline.shortlist("data-eng", 1).unwrap();
    assert_eq!(shortlist.len(), 1);
    assert_eq!(shortlist[0].profile.display_name(), "Strong");
}

#[tokio::test]
async fn test_extraction_deadline_fails_as_model_unavailable() {
    let stub = StubProfileExtractor::new().with_delay(Duration::from_millis(500));
    let mut config = SmartHireConfig::default();
    config.ingest.extraction_deadline_ms = 20;
    let pipeline = stub_pipeline_with(&stub, &config);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let outcome = pipeline.submit(RESUME.to_vec(), "slow.txt", "data-eng", None).await;

    assert_eq!(outcome.failure(), Some(FailureKind::ModelUnavailable));
    assert_eq!(
        outcome.path[..4],
        [
            SubmissionState::Received,
            SubmissionState::Fingerprinted,
            SubmissionState::ExtractingText,
            SubmissionState::Profiling,
        ]
    );
}

#[tokio::test]
async fn test_oversize_and_empty_uploads_fail_before_fingerprinting() {
    let stub = StubProfileExtractor::new();
    let mut config = SmartHireConfig::default();
    config.ingest.max_document_bytes = 16;
    let pipeline = stub_pipeline_with(&stub, &config);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let large = pipeline.submit(vec![b'a'; 17], "big.txt", "data-eng", None).await;
    assert_eq!(large.failure(), Some(FailureKind::DocumentTooLarge));
    assert_eq!(large.fingerprint, None);
    assert_eq!(
        large.path,
        vec![
            SubmissionState::Received,
            SubmissionState::Failed(FailureKind::DocumentTooLarge),
        ]
    );

    let empty = pipeline.submit(Vec::new(), "empty.txt", "data-eng", None).await;
    assert_eq!(empty.failure(), Some(FailureKind::EmptyDocument));
    assert_eq!(stub.call_count(), 0);
}

#[test]
fn test_oversize_rejected_from_size_alone_is_logged() {
    let stub = StubProfileExtractor::new();
    let mut config = SmartHireConfig::default();
    config.ingest.max_document_bytes = 16;
    let pipeline = stub_pipeline_with(&stub, &config);

    assert!(pipeline.reject_if_oversized(16, "fits.txt", "data-eng").is_none());

    let outcome = pipeline
        .reject_if_oversized(10 * 1024 * 1024, "huge.pdf", "data-eng")
        .unwrap();
    assert_eq!(outcome.failure(), Some(FailureKind::DocumentTooLarge));
    assert_eq!(outcome.fingerprint, None);

    let log = pipeline.submissions(Some("data-eng")).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].source_name, "huge.pdf");
    assert_eq!(log[0].state, SubmissionState::Failed(FailureKind::DocumentTooLarge));
}

#[tokio::test]
async fn test_unknown_requirement_and_format() {
    let stub = StubProfileExtractor::new();
    let pipeline = stub_pipeline(&stub);

    let outcome = pipeline.submit(RESUME.to_vec(), "ada.txt", "nope", None).await;
    assert_eq!(outcome.failure(), Some(FailureKind::UnknownRequirement));

    pipeline.define_requirement(data_engineer("data-eng")).unwrap();
    let outcome = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", Some(9)).await;
    assert_eq!(outcome.failure(), Some(FailureKind::UnknownRequirement));

    let binary = vec![0x00, 0x9f, 0x92, 0x96, 0x00, 0x01];
    let outcome = pipeline.submit(binary, "photo.bin", "data-eng", None).await;
    assert_eq!(outcome.failure(), Some(FailureKind::UnsupportedFormat));
    assert_eq!(
        outcome.path.last(),
        Some(&SubmissionState::Failed(FailureKind::UnsupportedFormat))
    );
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_reprocess_replaces_profile() {
    let stub = StubProfileExtractor::new();
    let fp = fingerprint(RESUME);
    stub.insert(fp, profile(&["python"], 3.0, "Ada"));
    let pipeline = stub_pipeline(&stub);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let first = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", None).await;
    assert_eq!(first.score.unwrap().score, 0.6);

    stub.insert(fp, profile(&["python", "sql"], 3.0, "Ada"));
    let again = pipeline.reprocess(fp, "data-eng", None).await.unwrap();

    assert!(again.is_persisted());
    assert_eq!(again.source_name, "ada.txt");
    assert_eq!(again.score.unwrap().score, 1.0);
    assert_eq!(
        pipeline.profile(&fp).unwrap().unwrap().skills,
        vec!["python", "sql"]
    );
    assert_eq!(stub.call_count(), 2);

    let ranked = pipeline.rank("data-eng", 1).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score.score, 1.0);
}

#[tokio::test]
async fn test_reprocess_unknown_document() {
    let pipeline = stub_pipeline(&StubProfileExtractor::new());
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let result = pipeline
        .reprocess(Fingerprint::from_bytes([9; 32]), "data-eng", None)
        .await;
    assert!(matches!(result, Err(PipelineError::UnknownDocument(_))));
}

#[tokio::test]
async fn test_rescore_new_version_without_model_calls() {
    let stub = StubProfileExtractor::new();
    let pipeline = stub_pipeline(&stub);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let a = b"Skills\nPython, SQL\nExperience\n4 years".to_vec();
    let b = b"Skills\nRust\nExperience\n6 years".to_vec();
    pipeline.submit(a, "a.txt", "data-eng", None).await;
    pipeline.submit(b, "b.txt", "data-eng", None).await;
    assert_eq!(stub.call_count(), 2);

    let v2 = pipeline
        .define_requirement(RequirementDraft {
            job_id: "data-eng".to_string(),
            skills: vec![RequirementSkill::unweighted("rust")],
            minimum_experience: None,
            description: String::new(),
        })
        .unwrap();
    assert_eq!(v2.version, 2);
    assert!(pipeline.rank("data-eng", 2).unwrap().is_empty());

    let scores = pipeline.rescore("data-eng", 2).await.unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(stub.call_count(), 2);

    let ranked = pipeline.rank("data-eng", 2).unwrap();
    assert_eq!(ranked[0].profile.skills, vec!["Rust"]);
    assert_eq!(ranked[0].score.score, 1.0);
    assert_eq!(ranked[1].score.score, 0.0);
}

#[tokio::test]
async fn test_requirement_lookup_errors() {
    let pipeline = stub_pipeline(&StubProfileExtractor::new());
    assert!(matches!(
        pipeline.requirement("none", None),
        Err(PipelineError::NoRequirement(_))
    ));
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();
    assert!(matches!(
        pipeline.requirement("data-eng", Some(2)),
        Err(PipelineError::UnknownRequirement { version: 2, .. })
    ));
    assert!(matches!(
        pipeline.rescore("data-eng", 2).await,
        Err(PipelineError::UnknownRequirement { .. })
    ));
}

#[tokio::test]
async fn test_synonym_duplicates_rejected_in_requirements() {
    let pipeline = stub_pipeline(&StubProfileExtractor::new());
    let draft = RequirementDraft {
        job_id: "web".to_string(),
        skills: vec![
            RequirementSkill::unweighted("JS"),
            RequirementSkill::unweighted("JavaScript"),
        ],
        minimum_experience: None,
        description: String::new(),
    };
    assert!(matches!(
        pipeline.define_requirement(draft),
        Err(PipelineError::InvalidRequirement(_))
    ));
}

#[tokio::test]
async fn test_every_submission_is_logged() {
    let stub = StubProfileExtractor::new();
    let pipeline = stub_pipeline(&stub);
    pipeline.define_requirement(data_engineer("data-eng")).unwrap();

    let ok = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", None).await;
    let dup = pipeline.submit(RESUME.to_vec(), "ada.txt", "data-eng", None).await;
    let bad = pipeline.submit(Vec::new(), "empty.txt", "data-eng", None).await;
    pipeline.submit(RESUME.to_vec(), "ada.txt", "other", None).await;

    let log = pipeline.submissions(Some("data-eng")).unwrap();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].submission_id, ok.submission_id);
    assert_eq!(log[1].submission_id, dup.submission_id);
    assert!(log[1].via_duplicate);
    assert_eq!(log[2].state, SubmissionState::Failed(FailureKind::EmptyDocument));
    assert_eq!(log[2].submission_id, bad.submission_id);
    assert_eq!(log[0].score, Some(1.0));

    assert_eq!(pipeline.submissions(None).unwrap().len(), 4);
}
