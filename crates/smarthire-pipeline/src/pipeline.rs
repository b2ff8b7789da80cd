//! Ingestion pipeline orchestrator
//!
//! ```text
//! RECEIVED → FINGERPRINTED → DUPLICATE_SHORT_CIRCUIT ─────────────→ PERSISTED
//!                          ↘ EXTRACTING_TEXT → PROFILING → SCORING ↗
//! ```
//!
//! Retries live inside the components (text extractor, profile extraction
//! client). The pipeline never retries across transitions; whatever a
//! component gives up on ends the submission in `FAILED(kind)`.

use crate::config::SmartHireConfig;
use crate::error::PipelineError;
use crate::locks::FingerprintLocks;
use smarthire_document::TextExtractor;
use smarthire_domain::{
    now_millis, score, BlobStore, CandidateProfile, Document, FailureKind, Fingerprint,
    JobRequirement, MatchScore, NewDocument, NormalizedText, ProfileExtractor, ProfileStore,
    ProfileWrite, RankedResult, RequirementDraft, ScoringConfig, SubmissionId, SubmissionRecord,
    SubmissionState,
};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, field, info, info_span, warn, Instrument, Span};

/// Limits the pipeline enforces itself
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Largest accepted upload (bytes)
    pub max_document_bytes: usize,
    /// Deadline for one document's profile extraction
    pub extraction_deadline: Duration,
    /// Minimum score for the shortlist
    pub shortlist_threshold: f64,
}

impl PipelineSettings {
    /// Take the pipeline's limits from the configuration file
    pub fn from_config(config: &SmartHireConfig) -> Self {
        Self {
            max_document_bytes: config.ingest.max_document_bytes,
            extraction_deadline: config.extraction_deadline(),
            shortlist_threshold: config.scoring.shortlist_threshold,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&SmartHireConfig::default())
    }
}

/// Final report for one submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    /// Submission identifier
    pub submission_id: SubmissionId,
    /// Name the uploader gave the file
    pub source_name: String,
    /// Job the upload was scored against
    pub job_id: String,
    /// Requirement version used, once resolved
    pub requirement_version: Option<u32>,
    /// Content fingerprint, once computed
    pub fingerprint: Option<Fingerprint>,
    /// Terminal state
    pub state: SubmissionState,
    /// Every state visited, in order
    pub path: Vec<SubmissionState>,
    /// True when the stored profile was reused
    pub via_duplicate: bool,
    /// Score, when persisted
    pub score: Option<MatchScore>,
    /// Failure detail
    pub message: Option<String>,
    /// When the submission was received (milliseconds since epoch)
    pub created_at: u64,
}

impl SubmissionOutcome {
    /// True when the submission reached `PERSISTED`
    pub fn is_persisted(&self) -> bool {
        self.state == SubmissionState::Persisted
    }

    /// Failure kind for a failed submission
    pub fn failure(&self) -> Option<FailureKind> {
        self.state.failure()
    }

    /// The row written to the submission log
    pub fn to_record(&self) -> SubmissionRecord {
        SubmissionRecord {
            submission_id: self.submission_id,
            source_name: self.source_name.clone(),
            fingerprint: self.fingerprint,
            job_id: self.job_id.clone(),
            requirement_version: self.requirement_version,
            state: self.state,
            via_duplicate: self.via_duplicate,
            score: self.score.as_ref().map(|s| s.score),
            message: self.message.clone(),
            created_at: self.created_at,
        }
    }
}

/// Why a step gave up
struct Failure {
    kind: FailureKind,
    message: String,
}

impl Failure {
    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn storage<E: Display>(err: E) -> Self {
        Self::new(FailureKind::Storage, err.to_string())
    }
}

type Step<T> = Result<T, Failure>;

/// One submission's walk through the state machine
struct Tracker {
    outcome: SubmissionOutcome,
}

impl Tracker {
    fn new(source_name: &str, job_id: &str) -> Self {
        Self {
            outcome: SubmissionOutcome {
                submission_id: SubmissionId::new(),
                source_name: source_name.to_string(),
                job_id: job_id.to_string(),
                requirement_version: None,
                fingerprint: None,
                state: SubmissionState::Received,
                path: vec![SubmissionState::Received],
                via_duplicate: false,
                score: None,
                message: None,
                created_at: now_millis(),
            },
        }
    }

    fn advance(&mut self, next: SubmissionState) {
        debug_assert!(
            self.outcome.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.outcome.state,
            next
        );
        self.outcome.state = next;
        self.outcome.path.push(next);
        debug!(state = %next, "Submission advanced");
    }

    fn fingerprinted(&mut self, fingerprint: Fingerprint) {
        self.outcome.fingerprint = Some(fingerprint);
        Span::current().record("fingerprint", field::display(fingerprint.short()));
        self.advance(SubmissionState::Fingerprinted);
    }

    fn fail(&mut self, failure: Failure) {
        self.advance(SubmissionState::Failed(failure.kind));
        self.outcome.message = Some(failure.message);
    }
}

/// Orchestrates submissions against one store, blob store and profile extractor
///
/// Cloning is cheap; clones share the store, the collaborators and the
/// per-fingerprint locks, so one clone per task is the intended use.
///
/// # Examples
///
/// ```no_run
/// use smarthire_document::InMemoryBlobStore;
/// use smarthire_extractor::StubProfileExtractor;
/// use smarthire_pipeline::{IngestionPipeline, SmartHireConfig};
/// use smarthire_store::SqliteStore;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = IngestionPipeline::new(
///     SqliteStore::new(":memory:")?,
///     InMemoryBlobStore::new(),
///     StubProfileExtractor::new(),
///     &SmartHireConfig::default(),
/// );
/// let outcome = pipeline
///     .submit(b"Skills\nPython".to_vec(), "cv.txt", "data-eng", None)
///     .await;
/// println!("{}", outcome.state);
/// # Ok(())
/// # }
/// ```
pub struct IngestionPipeline<S, B, X> {
    store: Arc<Mutex<S>>,
    blobs: Arc<B>,
    extractor: Arc<X>,
    text_extractor: TextExtractor,
    scoring: Arc<ScoringConfig>,
    settings: PipelineSettings,
    locks: Arc<FingerprintLocks>,
}

impl<S, B, X> Clone for IngestionPipeline<S, B, X> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            blobs: Arc::clone(&self.blobs),
            extractor: Arc::clone(&self.extractor),
            text_extractor: self.text_extractor.clone(),
            scoring: Arc::clone(&self.scoring),
            settings: self.settings.clone(),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S, B, X> IngestionPipeline<S, B, X>
where
    S: ProfileStore + Send + 'static,
    B: BlobStore + 'static,
    X: ProfileExtractor + 'static,
{
    /// Create a pipeline owning its collaborators
    pub fn new(store: S, blobs: B, extractor: X, config: &SmartHireConfig) -> Self {
        Self::with_shared(
            Arc::new(Mutex::new(store)),
            Arc::new(blobs),
            Arc::new(extractor),
            config,
        )
    }

    /// Create a pipeline around already shared collaborators
    pub fn with_shared(
        store: Arc<Mutex<S>>,
        blobs: Arc<B>,
        extractor: Arc<X>,
        config: &SmartHireConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            extractor,
            text_extractor: TextExtractor::with_retries(config.ingest.extraction_retries),
            scoring: Arc::new(config.scoring_config()),
            settings: PipelineSettings::from_config(config),
            locks: Arc::new(FingerprintLocks::new()),
        }
    }

    /// Shared handle to the store
    pub fn store(&self) -> &Arc<Mutex<S>> {
        &self.store
    }

    /// Active limits
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Active scoring configuration
    pub fn scoring_config(&self) -> &ScoringConfig {
        &self.scoring
    }

    fn lock_store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one upload through the state machine
    ///
    /// `version` selects a requirement version; `None` uses the job's latest.
    /// Never fails as a call: failures end the submission in `FAILED(kind)`,
    /// and every submission is written to the submission log.
    pub async fn submit(
        &self,
        upload: Vec<u8>,
        source_name: &str,
        job_id: &str,
        version: Option<u32>,
    ) -> SubmissionOutcome {
        let mut tracker = Tracker::new(source_name, job_id);
        let span = info_span!(
            "submission",
            submission_id = %tracker.outcome.submission_id,
            source_name,
            job_id,
            fingerprint = field::Empty,
        );

        async move {
            info!(size = upload.len(), "Submission received");
            if let Err(failure) = self.ingest(&mut tracker, upload, version).await {
                tracker.fail(failure);
            }
            self.finish(tracker)
        }
        .instrument(span)
        .await
    }

    /// Fail an upload on its size alone, before its bytes are read
    ///
    /// Returns the logged `FAILED(DocumentTooLarge)` outcome when `size`
    /// exceeds the limit, or `None` when the upload may go to `submit`.
    pub fn reject_if_oversized(
        &self,
        size: u64,
        source_name: &str,
        job_id: &str,
    ) -> Option<SubmissionOutcome> {
        let failure = self.check_size(size).err()?;
        let mut tracker = Tracker::new(source_name, job_id);
        let span = info_span!(
            "submission",
            submission_id = %tracker.outcome.submission_id,
            source_name,
            job_id,
            fingerprint = field::Empty,
        );
        let _entered = span.enter();
        info!(size, "Submission received");
        tracker.fail(failure);
        Some(self.finish(tracker))
    }

    fn check_size(&self, size: u64) -> Step<()> {
        let limit = self.settings.max_document_bytes as u64;
        if size > limit {
            return Err(Failure::new(
                FailureKind::DocumentTooLarge,
                format!("Upload is {} bytes; the limit is {}", size, limit),
            ));
        }
        Ok(())
    }

    async fn ingest(
        &self,
        tracker: &mut Tracker,
        upload: Vec<u8>,
        version: Option<u32>,
    ) -> Step<()> {
        if upload.is_empty() {
            return Err(Failure::new(FailureKind::EmptyDocument, "Upload is empty"));
        }
        self.check_size(upload.len() as u64)?;

        let requirement = self.resolve_requirement(&tracker.outcome.job_id, version)?;
        tracker.outcome.requirement_version = Some(requirement.version);

        let fingerprint = smarthire_document::fingerprint(&upload);
        tracker.fingerprinted(fingerprint);

        // Held until the score is stored, so identical uploads converge
        let _guard = self.locks.acquire(fingerprint).await;

        let existing = self
            .lock_store()
            .get_profile(&fingerprint)
            .map_err(Failure::storage)?;

        let profile = match existing {
            Some(profile) => {
                tracker.outcome.via_duplicate = true;
                tracker.advance(SubmissionState::DuplicateShortCircuit);
                info!("Known content, reusing stored profile");
                profile
            }
            None => {
                self.ensure_document(fingerprint, &tracker.outcome.source_name, &upload)
                    .await?;
                tracker.advance(SubmissionState::ExtractingText);
                let text = self
                    .extract_text(upload, tracker.outcome.source_name.clone())
                    .await?;
                tracker.advance(SubmissionState::Profiling);
                let profile = self.extract_profile(&fingerprint, &text).await?;
                let profile = self.store_profile(&fingerprint, profile, false)?;
                tracker.advance(SubmissionState::Scoring);
                profile
            }
        };

        tracker.outcome.score = Some(self.score_and_store(&profile, &requirement)?);
        tracker.advance(SubmissionState::Persisted);
        Ok(())
    }

    /// Re-extract a stored document and overwrite its profile
    ///
    /// This is the operator override for `ConflictingProfile`: the profile is
    /// written with `force`, scores of the old profile are dropped, and the
    /// document is rescored against the requested requirement version.
    pub async fn reprocess(
        &self,
        fingerprint: Fingerprint,
        job_id: &str,
        version: Option<u32>,
    ) -> Result<SubmissionOutcome, PipelineError> {
        let document = self
            .lock_store()
            .get_document(&fingerprint)
            .map_err(PipelineError::store)?
            .ok_or_else(|| PipelineError::UnknownDocument(fingerprint.to_hex()))?;

        let mut tracker = Tracker::new(&document.source_name, job_id);
        let span = info_span!(
            "reprocess",
            submission_id = %tracker.outcome.submission_id,
            source_name = %document.source_name,
            job_id,
            fingerprint = field::Empty,
        );

        let outcome = async move {
            info!("Reprocessing stored document");
            if let Err(failure) = self.rerun(&mut tracker, document, version).await {
                tracker.fail(failure);
            }
            self.finish(tracker)
        }
        .instrument(span)
        .await;
        Ok(outcome)
    }

    async fn rerun(
        &self,
        tracker: &mut Tracker,
        document: Document,
        version: Option<u32>,
    ) -> Step<()> {
        let requirement = self.resolve_requirement(&tracker.outcome.job_id, version)?;
        tracker.outcome.requirement_version = Some(requirement.version);
        tracker.fingerprinted(document.fingerprint);

        let _guard = self.locks.acquire(document.fingerprint).await;

        let bytes = self
            .blobs
            .get(&document.storage_locator)
            .await
            .map_err(Failure::storage)?;
        if smarthire_document::fingerprint(&bytes) != document.fingerprint {
            return Err(Failure::new(
                FailureKind::Storage,
                format!("Stored bytes at {} do not match the fingerprint", document.storage_locator),
            ));
        }

        tracker.advance(SubmissionState::ExtractingText);
        let text = self.extract_text(bytes, document.source_name).await?;
        tracker.advance(SubmissionState::Profiling);
        let profile = self.extract_profile(&document.fingerprint, &text).await?;
        let profile = self.store_profile(&document.fingerprint, profile, true)?;
        tracker.advance(SubmissionState::Scoring);
        tracker.outcome.score = Some(self.score_and_store(&profile, &requirement)?);
        tracker.advance(SubmissionState::Persisted);
        Ok(())
    }

    fn finish(&self, tracker: Tracker) -> SubmissionOutcome {
        let outcome = tracker.outcome;
        match (&outcome.score, outcome.state.failure()) {
            (Some(score), None) => info!(
                score = score.score,
                via_duplicate = outcome.via_duplicate,
                "Submission persisted"
            ),
            (_, Some(kind)) => info!(
                %kind,
                message = outcome.message.as_deref().unwrap_or(""),
                "Submission failed"
            ),
            _ => {}
        }

        if let Err(e) = self.lock_store().record_submission(&outcome.to_record()) {
            warn!(error = %e, "Failed to record submission");
        }
        outcome
    }

    fn resolve_requirement(&self, job_id: &str, version: Option<u32>) -> Step<JobRequirement> {
        let store = self.lock_store();
        let found = match version {
            Some(v) => store.get_requirement(job_id, v),
            None => store.latest_requirement(job_id),
        }
        .map_err(Failure::storage)?;

        found.ok_or_else(|| {
            let message = match version {
                Some(v) => format!("Job '{}' has no requirement version {}", job_id, v),
                None => format!("Job '{}' has no requirement", job_id),
            };
            Failure::new(FailureKind::UnknownRequirement, message)
        })
    }

    async fn ensure_document(
        &self,
        fingerprint: Fingerprint,
        source_name: &str,
        bytes: &[u8],
    ) -> Step<()> {
        let known = self
            .lock_store()
            .get_document(&fingerprint)
            .map_err(Failure::storage)?
            .is_some();
        if known {
            return Ok(());
        }

        let locator = self.blobs.put(bytes).await.map_err(Failure::storage)?;
        let registration = self
            .lock_store()
            .register_document(NewDocument {
                fingerprint,
                source_name: source_name.to_string(),
                storage_locator: locator,
                size_bytes: bytes.len() as u64,
            })
            .map_err(Failure::storage)?;
        debug!(seq = registration.document.registration_seq, "Document registered");
        Ok(())
    }

    async fn extract_text(&self, bytes: Vec<u8>, source_name: String) -> Step<NormalizedText> {
        let extractor = self.text_extractor.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&bytes, &source_name))
            .await
            .map_err(|e| {
                Failure::new(
                    FailureKind::ExtractionFailure,
                    format!("Text extraction task failed: {}", e),
                )
            })?
            .map_err(|e| Failure::new(e.kind(), e.to_string()))
    }

    async fn extract_profile(
        &self,
        fingerprint: &Fingerprint,
        text: &NormalizedText,
    ) -> Step<CandidateProfile> {
        let deadline = self.settings.extraction_deadline;
        match timeout(deadline, self.extractor.extract_profile(fingerprint, text)).await {
            Ok(Ok(profile)) => Ok(profile),
            Ok(Err(e)) => Err(Failure::new(e.kind(), e.to_string())),
            Err(_) => Err(Failure::new(
                FailureKind::ModelUnavailable,
                format!("Profile extraction exceeded {} ms", deadline.as_millis()),
            )),
        }
    }

    fn store_profile(
        &self,
        fingerprint: &Fingerprint,
        profile: CandidateProfile,
        force: bool,
    ) -> Step<CandidateProfile> {
        let write = self
            .lock_store()
            .upsert_profile(fingerprint, &profile, force)
            .map_err(Failure::storage)?;
        match write {
            ProfileWrite::Inserted | ProfileWrite::Unchanged | ProfileWrite::Replaced => {
                debug!(?write, "Profile stored");
                Ok(CandidateProfile {
                    fingerprint: *fingerprint,
                    ..profile
                })
            }
            ProfileWrite::Conflicting => Err(Failure::new(
                FailureKind::ConflictingProfile,
                "A different profile is already stored for this document; reprocess to replace it",
            )),
        }
    }

    fn score_and_store(
        &self,
        profile: &CandidateProfile,
        requirement: &JobRequirement,
    ) -> Step<MatchScore> {
        let result = score(profile, requirement, &self.scoring);
        self.lock_store()
            .upsert_score(&result)
            .map_err(Failure::storage)?;
        debug!(score = result.score, gated = result.experience_gated, "Score stored");
        Ok(result)
    }

    /// Mint the next requirement version for a job
    ///
    /// Synonyms count as duplicates: `JS` and `JavaScript` in one draft is rejected.
    pub fn define_requirement(&self, draft: RequirementDraft) -> Result<JobRequirement, PipelineError> {
        draft.validate_with(&self.scoring.synonyms)?;
        self.lock_store()
            .define_requirement(draft)
            .map_err(PipelineError::store)
    }

    /// One requirement version, or the job's latest when `version` is `None`
    pub fn requirement(&self, job_id: &str, version: Option<u32>) -> Result<JobRequirement, PipelineError> {
        let store = self.lock_store();
        match version {
            Some(v) => store
                .get_requirement(job_id, v)
                .map_err(PipelineError::store)?
                .ok_or_else(|| PipelineError::UnknownRequirement {
                    job_id: job_id.to_string(),
                    version: v,
                }),
            None => store
                .latest_requirement(job_id)
                .map_err(PipelineError::store)?
                .ok_or_else(|| PipelineError::NoRequirement(job_id.to_string())),
        }
    }

    /// Every version of a job's requirement, oldest first
    pub fn requirement_history(&self, job_id: &str) -> Result<Vec<JobRequirement>, PipelineError> {
        self.lock_store()
            .requirement_history(job_id)
            .map_err(PipelineError::store)
    }

    /// Candidates scored against a requirement version, best first
    pub fn rank(&self, job_id: &str, version: u32) -> Result<Vec<RankedResult>, PipelineError> {
        self.lock_store()
            .rank(job_id, version)
            .map_err(PipelineError::store)
    }

    /// [`IngestionPipeline::rank`] cut at the shortlist threshold
    pub fn shortlist(&self, job_id: &str, version: u32) -> Result<Vec<RankedResult>, PipelineError> {
        let threshold = self.settings.shortlist_threshold;
        Ok(self
            .rank(job_id, version)?
            .into_iter()
            .filter(|r| r.score.score >= threshold)
            .collect())
    }

    /// Score every stored profile against a requirement version
    ///
    /// No model call is made; this only reruns the scoring engine.
    pub async fn rescore(&self, job_id: &str, version: u32) -> Result<Vec<MatchScore>, PipelineError> {
        let requirement = self.requirement(job_id, Some(version))?;
        let profiles = self
            .lock_store()
            .list_profiles()
            .map_err(PipelineError::store)?;

        let mut scores = Vec::with_capacity(profiles.len());
        for listed in profiles {
            let _guard = self.locks.acquire(listed.fingerprint).await;
            // Re-read under the lock; a reprocess may have replaced it
            let current = self
                .lock_store()
                .get_profile(&listed.fingerprint)
                .map_err(PipelineError::store)?;
            let Some(profile) = current else { continue };

            let result = score(&profile, &requirement, &self.scoring);
            self.lock_store()
                .upsert_score(&result)
                .map_err(PipelineError::store)?;
            scores.push(result);
        }

        info!(job_id, version, candidates = scores.len(), "Requirement rescored");
        Ok(scores)
    }

    /// Submission log, optionally for one job
    pub fn submissions(&self, job_id: Option<&str>) -> Result<Vec<SubmissionRecord>, PipelineError> {
        self.lock_store()
            .list_submissions(job_id)
            .map_err(PipelineError::store)
    }

    /// Stored profile for a fingerprint
    pub fn profile(&self, fingerprint: &Fingerprint) -> Result<Option<CandidateProfile>, PipelineError> {
        self.lock_store()
            .get_profile(fingerprint)
            .map_err(PipelineError::store)
    }
}
