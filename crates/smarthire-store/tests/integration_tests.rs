//! Integration tests for smarthire-store
//!
//! These tests cover documents, profiles, scores, requirement versions,
//! ranking order and the submission log.

use smarthire_domain::{
    BlobLocator, CandidateProfile, ContactInfo, FailureKind, Fingerprint, MatchScore, NewDocument,
    ProfileStore, ProfileWrite, RequirementDraft, RequirementSkill, SubmissionId,
    SubmissionRecord, SubmissionState,
};
use smarthire_store::{SqliteStore, StoreError};

fn fp(n: u8) -> Fingerprint {
    Fingerprint::from_bytes([n; 32])
}

fn new_document(n: u8) -> NewDocument {
    NewDocument {
        fingerprint: fp(n),
        source_name: format!("resume-{}.pdf", n),
        storage_locator: BlobLocator::new(format!("mem-{}", n)),
        size_bytes: 1024,
    }
}

fn profile(n: u8, skills: &[&str], years: f64) -> CandidateProfile {
    CandidateProfile {
        fingerprint: fp(n),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        years_experience: years,
        education: vec![],
        experience: vec![],
        contact_info: ContactInfo {
            name: Some(format!("Candidate {}", n)),
            ..ContactInfo::default()
        },
    }
}

fn draft(job_id: &str, skills: &[(&str, f64)]) -> RequirementDraft {
    RequirementDraft {
        job_id: job_id.to_string(),
        skills: skills
            .iter()
            .map(|(name, weight)| RequirementSkill::new(*name, *weight))
            .collect(),
        minimum_experience: Some(2.0),
        description: "Data engineer".to_string(),
    }
}

fn score(n: u8, job_id: &str, version: u32, value: f64) -> MatchScore {
    MatchScore {
        fingerprint: fp(n),
        job_id: job_id.to_string(),
        requirement_version: version,
        score: value,
        matched: vec!["python".to_string()],
        missing: vec!["sql".to_string()],
        experience_gated: false,
        rationale: format!("score {}", value),
    }
}

/// Register a document and store its profile
fn seed_candidate(store: &mut SqliteStore, n: u8) {
    store.register_document(new_document(n)).unwrap();
    let write = store
        .upsert_profile(&fp(n), &profile(n, &["python"], 3.0), false)
        .unwrap();
    assert_eq!(write, ProfileWrite::Inserted);
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_register_document_first_registration_wins() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let first = store.register_document(new_document(1)).unwrap();
    assert!(first.newly_registered);

    let mut again = new_document(1);
    again.source_name = "renamed.pdf".to_string();
    let second = store.register_document(again).unwrap();
    assert!(!second.newly_registered);
    assert_eq!(second.document.source_name, "resume-1.pdf");
    assert_eq!(second.document.registration_seq, first.document.registration_seq);

    let fetched = store.get_document(&fp(1)).unwrap().unwrap();
    assert_eq!(fetched, first.document);
    assert!(store.get_document(&fp(2)).unwrap().is_none());
}

#[test]
fn test_registration_sequence_increases() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = store.register_document(new_document(1)).unwrap().document;
    let b = store.register_document(new_document(2)).unwrap().document;
    assert!(b.registration_seq > a.registration_seq);
}

#[test]
fn test_profile_first_writer_wins() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.register_document(new_document(1)).unwrap();

    let original = profile(1, &["python", "sql"], 3.0);
    assert_eq!(
        store.upsert_profile(&fp(1), &original, false).unwrap(),
        ProfileWrite::Inserted
    );
    assert_eq!(
        store.upsert_profile(&fp(1), &original, false).unwrap(),
        ProfileWrite::Unchanged
    );

    let different = profile(1, &["rust"], 9.0);
    assert_eq!(
        store.upsert_profile(&fp(1), &different, false).unwrap(),
        ProfileWrite::Conflicting
    );

    let stored = store.get_profile(&fp(1)).unwrap().unwrap();
    assert_eq!(stored, original);
    assert_eq!(store.profile_count().unwrap(), 1);
}

#[test]
fn test_forced_replace_drops_stale_scores() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    seed_candidate(&mut store, 1);
    let req = store.define_requirement(draft("job", &[("python", 1.0)])).unwrap();
    store.upsert_score(&score(1, "job", req.version, 0.9)).unwrap();

    let replacement = profile(1, &["go"], 1.0);
    assert_eq!(
        store.upsert_profile(&fp(1), &replacement, true).unwrap(),
        ProfileWrite::Replaced
    );
    assert_eq!(store.get_profile(&fp(1)).unwrap().unwrap().skills, vec!["go"]);
    assert!(store.get_score(&fp(1), "job", req.version).unwrap().is_none());
}

#[test]
fn test_list_profiles_in_registration_order() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    seed_candidate(&mut store, 3);
    seed_candidate(&mut store, 1);
    store.register_document(new_document(2)).unwrap();

    let listed: Vec<Fingerprint> = store
        .list_profiles()
        .unwrap()
        .into_iter()
        .map(|p| p.fingerprint)
        .collect();
    assert_eq!(listed, vec![fp(3), fp(1)]);
}

#[test]
fn test_profile_is_keyed_by_fingerprint_argument() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.register_document(new_document(5)).unwrap();

    // Profile carries a stale fingerprint; the key wins
    let p = profile(9, &["python"], 2.0);
    store.upsert_profile(&fp(5), &p, false).unwrap();
    assert_eq!(store.get_profile(&fp(5)).unwrap().unwrap().fingerprint, fp(5));
}

#[test]
fn test_profile_requires_registered_document() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let result = store.upsert_profile(&fp(7), &profile(7, &["python"], 1.0), false);
    assert!(matches!(result, Err(StoreError::Database(_))));
}

#[test]
fn test_requirement_versions_increment_per_job() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let v1 = store.define_requirement(draft("a", &[("python", 0.6), ("sql", 0.4)])).unwrap();
    let v2 = store.define_requirement(draft("a", &[("python", 1.0)])).unwrap();
    let other = store.define_requirement(draft("b", &[("rust", 1.0)])).unwrap();

    assert_eq!((v1.version, v2.version, other.version), (1, 2, 1));

    // Old versions stay readable and unchanged
    let fetched = store.get_requirement("a", 1).unwrap().unwrap();
    assert_eq!(fetched.skills, v1.skills);
    assert_eq!(store.latest_requirement("a").unwrap().unwrap().version, 2);
    assert!(store.get_requirement("a", 3).unwrap().is_none());
    assert!(store.latest_requirement("missing").unwrap().is_none());

    let history = store.requirement_history("a").unwrap();
    assert_eq!(history.iter().map(|r| r.version).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_invalid_requirement_is_rejected() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let result = store.define_requirement(draft("", &[("python", 1.0)]));
    assert!(matches!(result, Err(StoreError::InvalidRequirement(_))));
    assert!(store.requirement_history("").unwrap().is_empty());
}

#[test]
fn test_score_upsert_overwrites() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    seed_candidate(&mut store, 1);
    store.define_requirement(draft("job", &[("python", 1.0)])).unwrap();

    store.upsert_score(&score(1, "job", 1, 0.4)).unwrap();
    store.upsert_score(&score(1, "job", 1, 0.8)).unwrap();

    let stored = store.get_score(&fp(1), "job", 1).unwrap().unwrap();
    assert_eq!(stored.score, 0.8);
    assert_eq!(stored.matched, vec!["python"]);
    assert_eq!(store.rank("job", 1).unwrap().len(), 1);
}

#[test]
fn test_score_requires_existing_requirement_version() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    seed_candidate(&mut store, 1);
    assert!(store.upsert_score(&score(1, "nope", 1, 0.5)).is_err());
}

#[test]
fn test_rank_orders_by_score_then_registration() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    for n in 1..=4 {
        seed_candidate(&mut store, n);
    }
    store.define_requirement(draft("job", &[("python", 1.0)])).unwrap();

    store.upsert_score(&score(1, "job", 1, 0.5)).unwrap();
    store.upsert_score(&score(2, "job", 1, 0.9)).unwrap();
    store.upsert_score(&score(3, "job", 1, 0.5)).unwrap();
    store.upsert_score(&score(4, "job", 1, 0.7)).unwrap();

    let ranked = store.rank("job", 1).unwrap();
    let order: Vec<Fingerprint> = ranked.iter().map(|r| r.profile.fingerprint).collect();
    assert_eq!(order, vec![fp(2), fp(4), fp(1), fp(3)]);
    assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

    // Same query, same answer
    assert_eq!(store.rank("job", 1).unwrap(), ranked);
}

#[test]
fn test_rank_is_scoped_to_version() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    seed_candidate(&mut store, 1);
    seed_candidate(&mut store, 2);
    store.define_requirement(draft("job", &[("python", 1.0)])).unwrap();
    store.define_requirement(draft("job", &[("sql", 1.0)])).unwrap();

    store.upsert_score(&score(1, "job", 1, 0.9)).unwrap();
    store.upsert_score(&score(2, "job", 2, 0.3)).unwrap();

    let v1 = store.rank("job", 1).unwrap();
    assert_eq!(v1.len(), 1);
    assert_eq!(v1[0].profile.fingerprint, fp(1));
    assert!(store.rank("job", 3).unwrap().is_empty());
}

#[test]
fn test_submission_log_round_trip() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let ok = SubmissionRecord {
        submission_id: SubmissionId::new(),
        source_name: "a.pdf".to_string(),
        fingerprint: Some(fp(1)),
        job_id: "job".to_string(),
        requirement_version: Some(1),
        state: SubmissionState::Persisted,
        via_duplicate: true,
        score: Some(0.75),
        message: None,
        created_at: 10,
    };
    let failed = SubmissionRecord {
        submission_id: SubmissionId::new(),
        source_name: "b.exe".to_string(),
        fingerprint: None,
        job_id: "other".to_string(),
        requirement_version: None,
        state: SubmissionState::Failed(FailureKind::UnsupportedFormat),
        via_duplicate: false,
        score: None,
        message: Some("unsupported".to_string()),
        created_at: 20,
    };
    store.record_submission(&failed).unwrap();
    store.record_submission(&ok).unwrap();

    let all = store.list_submissions(None).unwrap();
    assert_eq!(all, vec![ok.clone(), failed.clone()]);

    let only_job = store.list_submissions(Some("job")).unwrap();
    assert_eq!(only_job, vec![ok]);
}

#[test]
fn test_on_disk_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smarthire.db");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        seed_candidate(&mut store, 1);
        store.define_requirement(draft("job", &[("python", 1.0)])).unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    assert!(store.get_profile(&fp(1)).unwrap().is_some());
    assert_eq!(store.latest_requirement("job").unwrap().unwrap().version, 1);
}
