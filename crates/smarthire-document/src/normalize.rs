//! Text normalization
//!
//! Cleans extracted text while keeping the line structure that section
//! detection depends on.

use crate::DocumentError;
use smarthire_domain::text::section_header;
use smarthire_domain::NormalizedText;

const BULLETS: &[char] = &['•', '◦', '▪', '‣', '⁃', '∙', '●', '○', '■', '□', '►', '–'];

/// Normalize raw extracted text
///
/// Fails with `ExtractionFailure` when nothing readable remains.
///
/// # Examples
///
/// ```
/// use smarthire_document::normalize;
///
/// let text = normalize("  JANE   DOE \r\n\r\n\r\nSkills: Python,\tSQL\n• Rust").unwrap();
/// assert_eq!(text.as_str(), "JANE DOE\n\nSkills\nPython, SQL\n- Rust");
/// ```
pub fn normalize(raw: &str) -> Result<NormalizedText, DocumentError> {
    let cleaned: String = raw
        .replace("\r\n", "\n")
        .chars()
        .filter_map(map_char)
        .collect();

    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;

    for line in cleaned.split('\n') {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            pending_blank = !lines.is_empty();
            continue;
        }
        if pending_blank {
            lines.push(String::new());
            pending_blank = false;
        }
        match split_inline_header(&collapsed) {
            Some((header, rest)) => {
                lines.push(header.to_string());
                lines.push(rest.to_string());
            }
            None => lines.push(collapsed),
        }
    }

    if lines.is_empty() {
        return Err(DocumentError::ExtractionFailure(
            "document contains no readable text".to_string(),
        ));
    }
    Ok(NormalizedText::from_normalized(lines.join("\n")))
}

fn map_char(c: char) -> Option<char> {
    match c {
        '\n' => Some('\n'),
        '\r' | '\u{0b}' | '\u{0c}' | '\u{2028}' | '\u{2029}' => Some('\n'),
        '\t' | '\u{a0}' => Some(' '),
        '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' | '\u{ad}' => None,
        '‘' | '’' | '‚' | '‛' => Some('\''),
        '“' | '”' | '„' | '‟' => Some('"'),
        c if BULLETS.contains(&c) => Some('-'),
        c if c.is_control() => None,
        c => Some(c),
    }
}

/// Split `Skills: Python, SQL` into `Skills` and `Python, SQL`
fn split_inline_header(line: &str) -> Option<(&str, &str)> {
    let (head, rest) = line.split_once(':')?;
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    section_header(head)?;
    Some((head.trim(), rest))
}
