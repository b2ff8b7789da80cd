//! DOCX text extraction
//!
//! Reads `word/document.xml` out of the OOXML container. Paragraphs become
//! lines, runs are concatenated, tabs become spaces and breaks become newlines.

use crate::DocumentError;
use quick_xml::events::Event;
use std::io::Read;

/// Maximum decompressed bytes read from the main document part (zip-bomb protection)
pub const MAX_DOCUMENT_XML_BYTES: u64 = 50 * 1024 * 1024;

const DOCX_MAIN_PART: &str = "word/document.xml";

/// Extract raw text from DOCX bytes
pub fn extract_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    extract_docx_bounded(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn extract_docx_bounded(bytes: &[u8], max_bytes: u64) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| DocumentError::ExtractionFailure(format!("DOCX container: {}", e)))?;
    let entry = archive.by_name(DOCX_MAIN_PART).map_err(|e| {
        DocumentError::ExtractionFailure(format!("DOCX missing {}: {}", DOCX_MAIN_PART, e))
    })?;

    let mut xml = Vec::new();
    entry
        .take(max_bytes)
        .read_to_end(&mut xml)
        .map_err(|e| DocumentError::ExtractionFailure(format!("DOCX read: {}", e)))?;
    if xml.len() as u64 >= max_bytes {
        return Err(DocumentError::ExtractionFailure(format!(
            "{} exceeds size limit ({} bytes)",
            DOCX_MAIN_PART, max_bytes
        )));
    }

    paragraphs_to_text(&xml)
}

fn paragraphs_to_text(xml: &[u8]) -> Result<String, DocumentError> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    // Whitespace inside w:t is significant ("Senior" + " Engineer")
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tab" => out.push(' '),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push(' '),
                b"br" | b"cr" => out.push('\n'),
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(te)) if in_text => {
                let text = te
                    .unescape()
                    .map_err(|e| DocumentError::ExtractionFailure(format!("DOCX text: {}", e)))?;
                out.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::ExtractionFailure(format!(
                    "DOCX xml at {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}
