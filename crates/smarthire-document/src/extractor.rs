//! Text extractor

use crate::docx::extract_docx;
use crate::format::{detect_format, DocumentFormat};
use crate::normalize::normalize;
use crate::pdf::extract_pdf;
use crate::DocumentError;
use smarthire_domain::NormalizedText;
use tracing::{debug, warn};

/// Converts uploaded bytes into normalized text
///
/// Unsupported formats fail immediately. Extraction failures of a
/// recognized format are retried `extraction_retries` times before they
/// surface.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    extraction_retries: u32,
}

impl TextExtractor {
    /// Create an extractor that retries extraction failures once
    pub fn new() -> Self {
        Self {
            extraction_retries: 1,
        }
    }

    /// Override the number of retries for extraction failures
    pub fn with_retries(extraction_retries: u32) -> Self {
        Self { extraction_retries }
    }

    /// Detect the format and extract normalized text
    pub fn extract(&self, bytes: &[u8], source_name: &str) -> Result<NormalizedText, DocumentError> {
        self.extract_with(bytes, source_name, extract_raw)
    }

    fn extract_with<F>(
        &self,
        bytes: &[u8],
        source_name: &str,
        mut raw: F,
    ) -> Result<NormalizedText, DocumentError>
    where
        F: FnMut(DocumentFormat, &[u8]) -> Result<String, DocumentError>,
    {
        let format = detect_format(bytes, source_name)?;
        debug!(source_name, %format, size = bytes.len(), "Extracting text");

        let mut attempt = 0;
        loop {
            match raw(format, bytes).and_then(|raw| normalize(&raw)) {
                Ok(text) => {
                    debug!(source_name, chars = text.len(), "Text extracted");
                    return Ok(text);
                }
                Err(DocumentError::ExtractionFailure(reason)) if attempt < self.extraction_retries => {
                    attempt += 1;
                    warn!(source_name, attempt, %reason, "Extraction failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_raw(format: DocumentFormat, bytes: &[u8]) -> Result<String, DocumentError> {
    match format {
        DocumentFormat::Pdf => extract_pdf(bytes),
        DocumentFormat::Docx => extract_docx(bytes),
        DocumentFormat::PlainText => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| DocumentError::ExtractionFailure(format!("text: {}", e)))?;
            Ok(text.trim_start_matches('\u{feff}').to_string())
        }
    }
}
