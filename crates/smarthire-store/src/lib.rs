//! SmartHire Storage Layer
//!
//! Implements the `ProfileStore` trait on SQLite: documents, profiles, scores,
//! versioned requirements and the submission log.
//!
//! # Invariants
//!
//! - One document and at most one profile per fingerprint; the first profile
//!   wins unless a write is forced
//! - At most one score per `(fingerprint, job_id, requirement_version)`
//! - Every multi-statement write runs in a transaction
//!
//! # Examples
//!
//! ```no_run
//! use smarthire_store::SqliteStore;
//!
//! let store = SqliteStore::new("smarthire.db").unwrap();
//! // Store is now ready for ingestion
//! ```

#![warn(missing_docs)]

use rusqlite::{params, Connection, OptionalExtension};
use smarthire_domain::{
    now_millis, CandidateProfile, Document, DocumentRegistration, Fingerprint, JobRequirement,
    MatchScore, NewDocument, ProfileStore, ProfileWrite, RankedResult, RequirementDraft,
    RequirementError, RequirementSkill, SubmissionId, SubmissionRecord, SubmissionState,
    BlobLocator,
};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requirement draft rejected
    #[error("Invalid requirement: {0}")]
    InvalidRequirement(#[from] RequirementError),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of `ProfileStore`
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between tasks behind
/// a mutex, or give each thread its own instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Number of stored profiles
    pub fn profile_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query_document(conn: &Connection, fingerprint: &Fingerprint) -> Result<Option<Document>, StoreError> {
        let row = conn
            .query_row(
                "SELECT fingerprint, source_name, storage_locator, size_bytes, registered_at, seq
                 FROM documents WHERE fingerprint = ?1",
                params![fingerprint.as_bytes().as_slice()],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(fp, source_name, locator, size, registered_at, seq)| {
            Ok(Document {
                fingerprint: bytes_to_fingerprint(&fp)?,
                source_name,
                storage_locator: BlobLocator::new(locator),
                size_bytes: size as u64,
                registered_at: registered_at as u64,
                registration_seq: seq as u64,
            })
        })
        .transpose()
    }

    fn query_profile(conn: &Connection, fingerprint: &Fingerprint) -> Result<Option<CandidateProfile>, StoreError> {
        let json: Option<String> = conn
            .query_row(
                "SELECT profile_json FROM profiles WHERE fingerprint = ?1",
                params![fingerprint.as_bytes().as_slice()],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| serde_json::from_str(&j).map_err(StoreError::from))
            .transpose()
    }
}

/// Convert bytes to Fingerprint
fn bytes_to_fingerprint(bytes: &[u8]) -> Result<Fingerprint, StoreError> {
    let arr: [u8; 32] = bytes.try_into().map_err(|_| {
        StoreError::InvalidData(format!(
            "Expected 32 bytes for fingerprint, got {}",
            bytes.len()
        ))
    })?;
    Ok(Fingerprint::from_bytes(arr))
}

/// Convert bytes to SubmissionId
fn text_to_submission_id(text: &str) -> Result<SubmissionId, StoreError> {
    SubmissionId::from_string(text).map_err(StoreError::InvalidData)
}

struct RequirementRow {
    job_id: String,
    version: i64,
    skills_json: String,
    minimum_experience: Option<f64>,
    description: String,
    created_at: i64,
}

impl RequirementRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            job_id: row.get(0)?,
            version: row.get(1)?,
            skills_json: row.get(2)?,
            minimum_experience: row.get(3)?,
            description: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_requirement(self) -> Result<JobRequirement, StoreError> {
        let skills: Vec<RequirementSkill> = serde_json::from_str(&self.skills_json)?;
        Ok(JobRequirement {
            job_id: self.job_id,
            version: self.version as u32,
            skills,
            minimum_experience: self.minimum_experience,
            description: self.description,
            created_at: self.created_at as u64,
        })
    }
}

struct ScoreRow {
    fingerprint: Vec<u8>,
    job_id: String,
    requirement_version: i64,
    score: f64,
    matched_json: String,
    missing_json: String,
    experience_gated: bool,
    rationale: String,
}

impl ScoreRow {
    const COLUMNS: &'static str = "s.fingerprint, s.job_id, s.requirement_version, s.score, \
         s.matched_json, s.missing_json, s.experience_gated, s.rationale";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            fingerprint: row.get(0)?,
            job_id: row.get(1)?,
            requirement_version: row.get(2)?,
            score: row.get(3)?,
            matched_json: row.get(4)?,
            missing_json: row.get(5)?,
            experience_gated: row.get(6)?,
            rationale: row.get(7)?,
        })
    }

    fn into_score(self) -> Result<MatchScore, StoreError> {
        Ok(MatchScore {
            fingerprint: bytes_to_fingerprint(&self.fingerprint)?,
            job_id: self.job_id,
            requirement_version: self.requirement_version as u32,
            score: self.score,
            matched: serde_json::from_str(&self.matched_json)?,
            missing: serde_json::from_str(&self.missing_json)?,
            experience_gated: self.experience_gated,
            rationale: self.rationale,
        })
    }
}

impl ProfileStore for SqliteStore {
    type Error = StoreError;

    fn register_document(&mut self, document: NewDocument) -> Result<DocumentRegistration, Self::Error> {
        let tx = self.conn.transaction()?;

        if let Some(existing) = Self::query_document(&tx, &document.fingerprint)? {
            return Ok(DocumentRegistration {
                document: existing,
                newly_registered: false,
            });
        }

        let registered_at = now_millis();
        tx.execute(
            "INSERT INTO documents (fingerprint, source_name, storage_locator, size_bytes, registered_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                document.fingerprint.as_bytes().as_slice(),
                &document.source_name,
                document.storage_locator.as_str(),
                document.size_bytes as i64,
                registered_at as i64,
            ],
        )?;
        let seq = tx.last_insert_rowid();
        tx.commit()?;

        debug!(fingerprint = %document.fingerprint.short(), seq, "Document registered");
        Ok(DocumentRegistration {
            document: Document {
                fingerprint: document.fingerprint,
                source_name: document.source_name,
                storage_locator: document.storage_locator,
                size_bytes: document.size_bytes,
                registered_at,
                registration_seq: seq as u64,
            },
            newly_registered: true,
        })
    }

    fn get_document(&self, fingerprint: &Fingerprint) -> Result<Option<Document>, Self::Error> {
        Self::query_document(&self.conn, fingerprint)
    }

    fn upsert_profile(
        &mut self,
        fingerprint: &Fingerprint,
        profile: &CandidateProfile,
        force: bool,
    ) -> Result<ProfileWrite, Self::Error> {
        let profile = CandidateProfile {
            fingerprint: *fingerprint,
            ..profile.clone()
        };
        let json = serde_json::to_string(&profile)?;
        let now = now_millis() as i64;
        let key = fingerprint.as_bytes().as_slice();

        let tx = self.conn.transaction()?;
        let outcome = match Self::query_profile(&tx, fingerprint)? {
            None => {
                tx.execute(
                    "INSERT INTO profiles (fingerprint, profile_json, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3)",
                    params![key, &json, now],
                )?;
                ProfileWrite::Inserted
            }
            Some(existing) if existing.same_content(&profile) => ProfileWrite::Unchanged,
            Some(_) if !force => ProfileWrite::Conflicting,
            Some(_) => {
                tx.execute(
                    "UPDATE profiles SET profile_json = ?2, updated_at = ?3 WHERE fingerprint = ?1",
                    params![key, &json, now],
                )?;
                // Scores of the replaced profile no longer describe the stored content
                tx.execute("DELETE FROM scores WHERE fingerprint = ?1", params![key])?;
                ProfileWrite::Replaced
            }
        };
        tx.commit()?;

        if outcome == ProfileWrite::Replaced {
            info!(fingerprint = %fingerprint.short(), "Profile replaced by forced write");
        }
        Ok(outcome)
    }

    fn get_profile(&self, fingerprint: &Fingerprint) -> Result<Option<CandidateProfile>, Self::Error> {
        Self::query_profile(&self.conn, fingerprint)
    }

    fn list_profiles(&self) -> Result<Vec<CandidateProfile>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT p.profile_json FROM profiles p
             JOIN documents d ON d.fingerprint = p.fingerprint
             ORDER BY d.seq ASC",
        )?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(StoreError::from))
            .collect()
    }

    fn upsert_score(&mut self, score: &MatchScore) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO scores (fingerprint, job_id, requirement_version, score, matched_json,
                                 missing_json, experience_gated, rationale, computed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(fingerprint, job_id, requirement_version) DO UPDATE SET
                score = excluded.score,
                matched_json = excluded.matched_json,
                missing_json = excluded.missing_json,
                experience_gated = excluded.experience_gated,
                rationale = excluded.rationale,
                computed_at = excluded.computed_at",
            params![
                score.fingerprint.as_bytes().as_slice(),
                &score.job_id,
                score.requirement_version as i64,
                score.score,
                serde_json::to_string(&score.matched)?,
                serde_json::to_string(&score.missing)?,
                score.experience_gated,
                &score.rationale,
                now_millis() as i64,
            ],
        )?;
        Ok(())
    }

    fn get_score(
        &self,
        fingerprint: &Fingerprint,
        job_id: &str,
        requirement_version: u32,
    ) -> Result<Option<MatchScore>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM scores s
             WHERE s.fingerprint = ?1 AND s.job_id = ?2 AND s.requirement_version = ?3",
            ScoreRow::COLUMNS
        );
        self.conn
            .query_row(
                &sql,
                params![fingerprint.as_bytes().as_slice(), job_id, requirement_version as i64],
                ScoreRow::from_row,
            )
            .optional()?
            .map(ScoreRow::into_score)
            .transpose()
    }

    fn rank(&self, job_id: &str, requirement_version: u32) -> Result<Vec<RankedResult>, Self::Error> {
        let sql = format!(
            "SELECT {}, p.profile_json, d.registered_at
             FROM scores s
             JOIN profiles p ON p.fingerprint = s.fingerprint
             JOIN documents d ON d.fingerprint = s.fingerprint
             WHERE s.job_id = ?1 AND s.requirement_version = ?2
             ORDER BY s.score DESC, d.registered_at ASC, d.seq ASC",
            ScoreRow::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![job_id, requirement_version as i64], |row| {
                Ok((
                    ScoreRow::from_row(row)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, i64>(9)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .enumerate()
            .map(|(idx, (score, profile_json, registered_at))| {
                Ok(RankedResult {
                    rank: idx + 1,
                    profile: serde_json::from_str(&profile_json)?,
                    score: score.into_score()?,
                    registered_at: registered_at as u64,
                })
            })
            .collect()
    }

    fn define_requirement(&mut self, draft: RequirementDraft) -> Result<JobRequirement, Self::Error> {
        draft.validate()?;
        let job_id = draft.job_id.trim().to_string();
        let skills_json = serde_json::to_string(&draft.skills)?;
        let created_at = now_millis();

        let tx = self.conn.transaction()?;
        let version: i64 = tx.query_row(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM requirements WHERE job_id = ?1",
            params![&job_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO requirements (job_id, version, skills_json, minimum_experience, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &job_id,
                version,
                &skills_json,
                draft.minimum_experience,
                &draft.description,
                created_at as i64,
            ],
        )?;
        tx.commit()?;

        info!(job_id = %job_id, version, "Requirement version defined");
        Ok(JobRequirement {
            job_id,
            version: version as u32,
            skills: draft.skills,
            minimum_experience: draft.minimum_experience,
            description: draft.description,
            created_at,
        })
    }

    fn get_requirement(&self, job_id: &str, version: u32) -> Result<Option<JobRequirement>, Self::Error> {
        self.conn
            .query_row(
                "SELECT job_id, version, skills_json, minimum_experience, description, created_at
                 FROM requirements WHERE job_id = ?1 AND version = ?2",
                params![job_id, version as i64],
                RequirementRow::from_row,
            )
            .optional()?
            .map(RequirementRow::into_requirement)
            .transpose()
    }

    fn latest_requirement(&self, job_id: &str) -> Result<Option<JobRequirement>, Self::Error> {
        self.conn
            .query_row(
                "SELECT job_id, version, skills_json, minimum_experience, description, created_at
                 FROM requirements WHERE job_id = ?1 ORDER BY version DESC LIMIT 1",
                params![job_id],
                RequirementRow::from_row,
            )
            .optional()?
            .map(RequirementRow::into_requirement)
            .transpose()
    }

    fn requirement_history(&self, job_id: &str) -> Result<Vec<JobRequirement>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, version, skills_json, minimum_experience, description, created_at
             FROM requirements WHERE job_id = ?1 ORDER BY version ASC",
        )?;
        let rows = stmt
            .query_map(params![job_id], RequirementRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RequirementRow::into_requirement).collect()
    }

    fn record_submission(&mut self, record: &SubmissionRecord) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO submissions
                (id, source_name, fingerprint, job_id, requirement_version, state,
                 via_duplicate, score, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.submission_id.to_string(),
                &record.source_name,
                record.fingerprint.map(|fp| fp.as_bytes().to_vec()),
                &record.job_id,
                record.requirement_version.map(|v| v as i64),
                record.state.label(),
                record.via_duplicate,
                record.score,
                &record.message,
                record.created_at as i64,
            ],
        )?;
        Ok(())
    }

    fn list_submissions(&self, job_id: Option<&str>) -> Result<Vec<SubmissionRecord>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source_name, fingerprint, job_id, requirement_version, state,
                    via_duplicate, score, message, created_at
             FROM submissions
             WHERE ?1 IS NULL OR job_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![job_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<Vec<u8>>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<i64>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, bool>(6)?,
                    row.get::<_, Option<f64>>(7)?,
                    row.get::<_, Option<String>>(8)?,
                    row.get::<_, i64>(9)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, source_name, fp, job_id, version, state, via_duplicate, score, message, created_at)| {
                    let state = SubmissionState::from_label(&state)
                        .ok_or_else(|| StoreError::InvalidData(format!("Unknown submission state: {}", state)))?;
                    Ok(SubmissionRecord {
                        submission_id: text_to_submission_id(&id)?,
                        source_name,
                        fingerprint: fp.as_deref().map(bytes_to_fingerprint).transpose()?,
                        job_id,
                        requirement_version: version.map(|v| v as u32),
                        state,
                        via_duplicate,
                        score,
                        message,
                        created_at: created_at as u64,
                    })
                },
            )
            .collect()
    }
}
