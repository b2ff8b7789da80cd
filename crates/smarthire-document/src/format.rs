//! Format detection
//!
//! Content decides first, the file extension second.

use crate::DocumentError;
use std::fmt;
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const DOCX_MAIN_PART: &str = "word/document.xml";

/// Document container formats the text extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format
    Pdf,
    /// Office Open XML word-processing document
    Docx,
    /// UTF-8 text
    PlainText,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::PlainText => "text",
        };
        f.write_str(name)
    }
}

/// Detect the format of an upload
///
/// A recognized container that turns out to be corrupt is still reported as
/// that format; the extractor then fails with `ExtractionFailure`.
pub fn detect_format(bytes: &[u8], source_name: &str) -> Result<DocumentFormat, DocumentError> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(DocumentFormat::Pdf);
    }

    let extension = Path::new(source_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    if bytes.starts_with(ZIP_MAGIC) {
        if zip_has_docx_part(bytes) || extension.as_deref() == Some("docx") {
            return Ok(DocumentFormat::Docx);
        }
        return Err(DocumentError::UnsupportedFormat(format!(
            "{}: zip archive without {}",
            source_name, DOCX_MAIN_PART
        )));
    }

    if looks_like_text(bytes) {
        return Ok(DocumentFormat::PlainText);
    }

    match extension.as_deref() {
        Some("pdf") => Ok(DocumentFormat::Pdf),
        Some("docx") => Ok(DocumentFormat::Docx),
        _ => Err(DocumentError::UnsupportedFormat(format!(
            "{}: unrecognized binary content",
            source_name
        ))),
    }
}

fn zip_has_docx_part(bytes: &[u8]) -> bool {
    zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map(|archive| archive.file_names().any(|n| n == DOCX_MAIN_PART))
        .unwrap_or(false)
}

fn looks_like_text(bytes: &[u8]) -> bool {
    !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok()
}
