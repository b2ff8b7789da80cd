//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use smarthire_domain::{JobRequirement, MatchScore, RankedResult, SubmissionRecord};
use smarthire_pipeline::SubmissionOutcome;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
    highlight_threshold: f64,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
            highlight_threshold: 0.7,
        }
    }

    /// Scores at or above this are shown in green.
    pub fn with_highlight_threshold(mut self, threshold: f64) -> Self {
        self.highlight_threshold = threshold;
        self
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format one requirement version.
    pub fn format_requirement(&self, requirement: &JobRequirement) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(requirement)?),
            OutputFormat::Quiet => Ok(format!("{}@{}", requirement.job_id, requirement.version)),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Skill", "Weight"]);
                for skill in &requirement.skills {
                    builder.push_record([skill.name.clone(), format!("{:.2}", skill.weight)]);
                }
                let mut out = format!(
                    "{} version {}\n",
                    self.colorize(&requirement.job_id, "cyan"),
                    requirement.version
                );
                if let Some(min) = requirement.minimum_experience {
                    out.push_str(&format!("Minimum experience: {} years\n", min));
                }
                if !requirement.description.is_empty() {
                    out.push_str(&format!("{}\n", requirement.description));
                }
                out.push_str(&self.render(builder));
                Ok(out)
            }
        }
    }

    /// Format every version of a job.
    pub fn format_requirements(&self, requirements: &[JobRequirement]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(requirements)?),
            OutputFormat::Quiet => Ok(requirements
                .iter()
                .map(|r| r.version.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if requirements.is_empty() {
                    return Ok(self.colorize("No requirement versions found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Version", "Skills", "Min. years", "Description"]);
                for r in requirements {
                    let skills = r
                        .skills
                        .iter()
                        .map(|s| format!("{}:{}", s.name, s.weight))
                        .collect::<Vec<_>>()
                        .join(", ");
                    builder.push_record([
                        r.version.to_string(),
                        skills,
                        r.minimum_experience.map(|m| m.to_string()).unwrap_or_default(),
                        r.description.clone(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format ingestion results.
    pub fn format_outcomes(&self, outcomes: &[SubmissionOutcome]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = outcomes
                    .iter()
                    .map(|o| {
                        serde_json::json!({
                            "submission_id": o.submission_id.to_string(),
                            "source_name": o.source_name,
                            "job_id": o.job_id,
                            "requirement_version": o.requirement_version,
                            "fingerprint": o.fingerprint.map(|fp| fp.to_hex()),
                            "state": o.state.label(),
                            "path": o.path.iter().map(|s| s.label()).collect::<Vec<_>>(),
                            "via_duplicate": o.via_duplicate,
                            "score": o.score,
                            "message": o.message,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(outcomes
                .iter()
                .map(|o| format!("{}\t{}", o.source_name, o.state))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if outcomes.is_empty() {
                    return Ok(self.colorize("Nothing ingested.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["File", "Fingerprint", "State", "Score", "Detail"]);
                for o in outcomes {
                    let detail = if o.via_duplicate {
                        "duplicate".to_string()
                    } else {
                        o.message.clone().unwrap_or_default()
                    };
                    builder.push_record([
                        o.source_name.clone(),
                        o.fingerprint.map(|fp| fp.short()).unwrap_or_default(),
                        self.state_cell(&o.state.label(), o.is_persisted()),
                        o.score.as_ref().map(|s| self.score_cell(s.score)).unwrap_or_default(),
                        detail,
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a ranking (or shortlist).
    pub fn format_ranking(&self, requirement: &JobRequirement, ranked: &[RankedResult]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "job_id": requirement.job_id,
                "requirement_version": requirement.version,
                "results": ranked,
            }))?),
            OutputFormat::Quiet => Ok(ranked
                .iter()
                .map(|r| r.profile.fingerprint.to_hex())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if ranked.is_empty() {
                    return Ok(self.colorize("No candidates found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["#", "Candidate", "Score", "Years", "Matched", "Missing"]);
                for r in ranked {
                    let years = if r.score.experience_gated {
                        format!("{} (gated)", r.profile.years_experience)
                    } else {
                        r.profile.years_experience.to_string()
                    };
                    builder.push_record([
                        r.rank.to_string(),
                        r.profile.display_name(),
                        self.score_cell(r.score.score),
                        years,
                        r.score.matched.join(", "),
                        r.score.missing.join(", "),
                    ]);
                }
                Ok(format!(
                    "{} version {}\n{}",
                    self.colorize(&requirement.job_id, "cyan"),
                    requirement.version,
                    self.render(builder)
                ))
            }
        }
    }

    /// Format rescoring results.
    pub fn format_scores(&self, scores: &[MatchScore]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(scores)?),
            OutputFormat::Quiet => Ok(scores.len().to_string()),
            OutputFormat::Table => Ok(self.success(&format!("Rescored {} candidate(s)", scores.len()))),
        }
    }

    /// Format the submission log.
    pub fn format_submissions(&self, records: &[SubmissionRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = records
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "submission_id": r.submission_id.to_string(),
                            "source_name": r.source_name,
                            "fingerprint": r.fingerprint.map(|fp| fp.to_hex()),
                            "job_id": r.job_id,
                            "requirement_version": r.requirement_version,
                            "state": r.state.label(),
                            "via_duplicate": r.via_duplicate,
                            "score": r.score,
                            "message": r.message,
                            "created_at": r.created_at,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|r| r.submission_id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No submissions found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "File", "Job", "State", "Score", "Message"]);
                for r in records {
                    let job = match r.requirement_version {
                        Some(v) => format!("{}@{}", r.job_id, v),
                        None => r.job_id.clone(),
                    };
                    let persisted = r.state.is_terminal() && r.state.failure().is_none();
                    builder.push_record([
                        r.submission_id.to_string()[..8].to_string(), // Truncate ID for readability
                        r.source_name.clone(),
                        job,
                        self.state_cell(&r.state.label(), persisted),
                        r.score.map(|s| self.score_cell(s)).unwrap_or_default(),
                        r.message.clone().unwrap_or_default(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn score_cell(&self, score: f64) -> String {
        let text = format!("{:.3}", score);
        if score >= self.highlight_threshold {
            self.colorize(&text, "green")
        } else if score >= self.highlight_threshold / 2.0 {
            self.colorize(&text, "yellow")
        } else {
            self.colorize(&text, "red")
        }
    }

    fn state_cell(&self, label: &str, ok: bool) -> String {
        self.colorize(label, if ok { "green" } else { "red" })
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
