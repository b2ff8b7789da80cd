//! Job command implementation.

use crate::cli::{JobAction, JobArgs};
use crate::context::Context;
use crate::error::{CliError, Result};
use crate::output::OutputFormat;
use smarthire_domain::{RequirementDraft, RequirementSkill};
use smarthire_pipeline::PipelineError;

/// Execute the job command.
pub fn execute_job(args: JobArgs, ctx: &Context) -> Result<()> {
    match args.action {
        JobAction::Define {
            job_id,
            skills,
            min_experience,
            description,
        } => {
            let draft = RequirementDraft {
                job_id,
                skills: parse_skills(&skills)?,
                minimum_experience: min_experience,
                description,
            };
            let requirement = ctx.pipeline.define_requirement(draft)?;
            if ctx.formatter.format() == OutputFormat::Table {
                println!(
                    "{}",
                    ctx.formatter.success(&format!(
                        "Defined {} version {}",
                        requirement.job_id, requirement.version
                    ))
                );
            }
            println!("{}", ctx.formatter.format_requirement(&requirement)?);
        }
        JobAction::Show { job_id, version } => {
            let requirement = ctx.pipeline.requirement(&job_id, version)?;
            println!("{}", ctx.formatter.format_requirement(&requirement)?);
        }
        JobAction::History { job_id } => {
            let history = ctx.pipeline.requirement_history(&job_id)?;
            if history.is_empty() {
                return Err(PipelineError::NoRequirement(job_id).into());
            }
            println!("{}", ctx.formatter.format_requirements(&history)?);
        }
    }

    Ok(())
}

/// Parse `name` or `name:weight` skill arguments.
fn parse_skills(raw: &[String]) -> Result<Vec<RequirementSkill>> {
    raw.iter()
        .map(|s| RequirementSkill::parse(s).map_err(CliError::InvalidInput))
        .collect()
}
