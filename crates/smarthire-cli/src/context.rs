//! Wiring: configuration in, ready-to-use pipeline out.

use crate::error::{CliError, Result};
use crate::output::Formatter;
use async_trait::async_trait;
use smarthire_document::FsBlobStore;
use smarthire_domain::{
    CandidateProfile, Fingerprint, NormalizedText, ProfileExtractionError, ProfileExtractor,
};
use smarthire_extractor::{LlmProfileExtractor, StubProfileExtractor};
use smarthire_llm::{GeminiConfig, GeminiProvider};
use smarthire_pipeline::{IngestionPipeline, SmartHireConfig};
use smarthire_store::SqliteStore;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// The pipeline as the CLI runs it.
pub type Pipeline = IngestionPipeline<SqliteStore, FsBlobStore, CliExtractor>;

/// Profile extractor chosen at startup.
pub enum CliExtractor {
    /// Gemini-backed extraction
    Model(LlmProfileExtractor<GeminiProvider>),
    /// Local, model-free extraction (`--offline`)
    Offline(StubProfileExtractor),
    /// No credential; extraction fails as model unavailable
    Disabled,
}

impl CliExtractor {
    /// Pick an extractor from the configuration.
    pub fn from_config(config: &SmartHireConfig, offline: bool) -> Result<Self> {
        if offline {
            return Ok(Self::Offline(StubProfileExtractor::new()));
        }
        let Some(api_key) = config.model.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            return Ok(Self::Disabled);
        };

        let gemini = GeminiConfig {
            endpoint: config.model.endpoint.clone(),
            model: config.model.model.clone(),
            api_key,
            temperature: config.model.temperature,
            timeout: Duration::from_millis(config.model.request_timeout_ms),
        };
        let provider = GeminiProvider::new(gemini)?;
        Ok(Self::Model(LlmProfileExtractor::new(
            provider,
            config.extractor_config(),
        )?))
    }

    /// Whether extraction can succeed at all.
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

#[async_trait]
impl ProfileExtractor for CliExtractor {
    async fn extract_profile(
        &self,
        fingerprint: &Fingerprint,
        text: &NormalizedText,
    ) -> std::result::Result<CandidateProfile, ProfileExtractionError> {
        match self {
            Self::Model(extractor) => extractor.extract_profile(fingerprint, text).await,
            Self::Offline(extractor) => extractor.extract_profile(fingerprint, text).await,
            Self::Disabled => Err(ProfileExtractionError::ModelUnavailable(
                "no API key configured".to_string(),
            )),
        }
    }
}

/// Everything a command needs.
pub struct Context {
    /// The ingestion pipeline
    pub pipeline: Pipeline,
    /// Effective configuration
    pub config: SmartHireConfig,
    /// Output formatter
    pub formatter: Formatter,
    extraction_available: bool,
}

impl Context {
    /// Open the store and blob directory and build the pipeline.
    pub fn open(
        config: SmartHireConfig,
        base_dir: &Path,
        offline: bool,
        formatter: Formatter,
    ) -> Result<Self> {
        let storage = config.storage.resolve(base_dir);
        if let Some(parent) = storage.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(
            database = %storage.database_path.display(),
            blobs = %storage.blob_dir.display(),
            "Opening storage"
        );

        let store = SqliteStore::new(&storage.database_path)?;
        let blobs = FsBlobStore::open(&storage.blob_dir)?;
        let extractor = CliExtractor::from_config(&config, offline)?;
        let extraction_available = extractor.is_available();
        let pipeline = IngestionPipeline::new(store, blobs, extractor, &config);

        Ok(Self {
            pipeline,
            config,
            formatter,
            extraction_available,
        })
    }

    /// Fail early when a command would need the model but has no credential.
    pub fn require_extraction(&self) -> Result<()> {
        if self.extraction_available {
            Ok(())
        } else {
            Err(CliError::MissingApiKey)
        }
    }
}
