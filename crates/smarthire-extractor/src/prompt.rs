//! Prompts for profile extraction

/// JSON shape the model must produce, passed to structured generation
pub const PROFILE_SCHEMA: &str = r#"{
  "skills": ["string"],
  "years_experience": 0.0,
  "education": [{"degree": "string", "institution": "string", "year": "string or null"}],
  "experience": [{"title": "string", "company": "string", "duration": "string or null"}],
  "contact_info": {"name": "string or null", "email": "string or null", "phone": "string or null"}
}"#;

const EXTRACTION_INSTRUCTIONS: &str = r#"You extract structured candidate data from résumé text.

Return a single JSON object with EXACTLY these fields:
- "skills" (required): array of individual technical or soft skills, as written
- "years_experience" (required): total professional experience in years, a non-negative number
- "education" (required): array of objects with "degree", "institution" and optional "year"
- "experience" (optional): array of objects with "title", "company" and optional "duration"
- "contact_info" (optional): object with optional "name", "email", "phone"

Rules:
1. Only include information that appears in the text
2. Keep names, titles and skills exactly as written
3. Use empty arrays for missing sections and 0 when no experience is stated
4. Do not fabricate or infer missing details"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Respond with the JSON object only. No markdown, no commentary.";

const REPAIR_INSTRUCTIONS: &str = r#"Your previous answer could not be accepted. Return a corrected JSON object that follows the schema exactly.
All of "skills" (array of strings), "years_experience" (number) and "education" (array of objects with string "degree" and "institution") MUST be present with the correct types."#;

/// Builds extraction prompts for one chunk of résumé text
pub struct PromptBuilder<'a> {
    text: &'a str,
    part: Option<(usize, usize)>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a str) -> Self {
        Self { text, part: None }
    }

    /// Mark the text as part `index` (0-based) of `total` chunks
    pub fn part(mut self, index: usize, total: usize) -> Self {
        if total > 1 {
            self.part = Some((index, total));
        }
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(self.text.len() + 1_500);
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\nSchema:\n");
        prompt.push_str(PROFILE_SCHEMA);
        prompt.push_str("\n\n");

        match self.part {
            Some((index, total)) => prompt.push_str(&format!(
                "Résumé section (part {} of {}):\n",
                index + 1,
                total
            )),
            None => prompt.push_str("Résumé:\n"),
        }
        prompt.push_str("---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }

    /// Build the stricter repair prompt sent after a rejected answer
    pub fn build_repair(&self, previous_response: &str, problem: &str) -> String {
        let mut prompt = String::with_capacity(self.text.len() + previous_response.len() + 2_000);
        prompt.push_str(REPAIR_INSTRUCTIONS);
        prompt.push_str("\n\nProblem: ");
        prompt.push_str(problem);
        prompt.push_str("\n\nPrevious answer:\n---\n");
        prompt.push_str(previous_response);
        prompt.push_str("\n---\n\nSchema:\n");
        prompt.push_str(PROFILE_SCHEMA);
        prompt.push_str("\n\nRésumé:\n---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");
        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}
