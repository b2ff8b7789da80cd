//! Rescore command implementation.

use crate::cli::RescoreArgs;
use crate::context::Context;
use crate::error::Result;

/// Execute the rescore command.
pub async fn execute_rescore(args: RescoreArgs, ctx: &Context) -> Result<()> {
    let requirement = ctx.pipeline.requirement(&args.job, args.version)?;
    let scores = ctx
        .pipeline
        .rescore(&requirement.job_id, requirement.version)
        .await?;

    println!("{}", ctx.formatter.format_scores(&scores)?);
    Ok(())
}
