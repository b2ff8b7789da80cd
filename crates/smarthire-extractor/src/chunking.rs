//! Text chunking for long résumés
//!
//! Splits on section headers first, then paragraphs, then lines, and only
//! hard-splits a single line that is still too long.

use smarthire_domain::text::section_header;

/// Chunks normalized text to a maximum size (bytes)
pub struct TextChunker {
    max_chunk_size: usize,
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(max_chunk_size: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Chunk the given text; every chunk is at most `max_chunk_size` bytes
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.len() <= self.max_chunk_size {
            return vec![text.to_string()];
        }
        let sections = split_sections(text);
        self.combine_until_limit(sections, "\n")
    }

    /// Combine elements until they reach the size limit, breaking up oversize ones
    fn combine_until_limit(&self, elements: Vec<String>, separator: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for element in elements {
            let element = element.trim();
            if element.is_empty() {
                continue;
            }

            if element.len() > self.max_chunk_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                chunks.extend(self.split_oversize(element));
                continue;
            }

            let needed = if current.is_empty() {
                element.len()
            } else {
                current.len() + separator.len() + element.len()
            };
            if needed > self.max_chunk_size {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str(separator);
            }
            current.push_str(element);
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    fn split_oversize(&self, element: &str) -> Vec<String> {
        let paragraphs: Vec<String> = element.split("\n\n").map(str::to_string).collect();
        if paragraphs.len() > 1 {
            return self.combine_until_limit(paragraphs, "\n\n");
        }
        let lines: Vec<String> = element.lines().map(str::to_string).collect();
        if lines.len() > 1 {
            return self.combine_until_limit(lines, "\n");
        }
        split_at_char_limit(element, self.max_chunk_size)
    }
}

/// Split before every recognized section header line
fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if section_header(line).is_some() && !current.trim().is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        sections.push(current);
    }
    sections
}

/// Split on char boundaries so no piece exceeds `limit` bytes
fn split_at_char_limit(text: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if current.len() + c.len_utf8() > limit && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = TextChunker::new(100);
        assert_eq!(chunker.chunk("Skills\nRust"), vec!["Skills\nRust"]);
    }

    #[test]
    fn test_splits_on_section_headers() {
        let text = "Jane Doe\nExperience\nAcme 2019-2024\nEducation\nMIT BSc\nSkills\nRust, Go";
        let chunks = TextChunker::new(40).chunk(text);
        assert_eq!(
            chunks,
            vec!["Jane Doe\nExperience\nAcme 2019-2024", "Education\nMIT BSc\nSkills\nRust, Go"]
        );
    }

    #[test]
    fn test_oversize_section_falls_back_to_lines() {
        let text = format!("Experience\n{}\n{}", "a".repeat(20), "b".repeat(20));
        let chunks = TextChunker::new(25).chunk(&text);
        assert_eq!(chunks, vec!["Experience".to_string(), "a".repeat(20), "b".repeat(20)]);
    }

    #[test]
    fn test_hard_split_respects_char_boundaries() {
        let pieces = split_at_char_limit("ééééé", 4);
        assert_eq!(pieces, vec!["éé", "éé", "é"]);
    }

    proptest! {
        /// Property: no chunk exceeds the limit and no text is lost
        #[test]
        fn test_chunks_bounded_and_complete(text in "[a-zé \n]{0,400}", limit in 5usize..80) {
            let chunks = TextChunker::new(limit).chunk(&text);
            for chunk in &chunks {
                prop_assert!(chunk.len() <= limit || text.len() <= limit);
            }
            let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            let rejoined: String = chunks.concat().chars().filter(|c| !c.is_whitespace()).collect();
            prop_assert_eq!(original, rejoined);
        }
    }
}
