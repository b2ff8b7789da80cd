//! PDF text extraction

use crate::DocumentError;
use tracing::debug;

/// Extract raw text from PDF bytes
///
/// `pdf-extract` can panic on malformed object streams; a panic is reported
/// as an extraction failure like any other parse error.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, DocumentError> {
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match result {
        Ok(Ok(text)) => {
            debug!(chars = text.len(), "PDF text extracted");
            Ok(text)
        }
        Ok(Err(e)) => Err(DocumentError::ExtractionFailure(format!("PDF: {}", e))),
        Err(_) => Err(DocumentError::ExtractionFailure(
            "PDF: parser aborted on malformed content".to_string(),
        )),
    }
}
