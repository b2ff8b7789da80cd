//! Rank and shortlist command implementations.

use crate::cli::RankArgs;
use crate::context::Context;
use crate::error::Result;

/// Execute the rank command.
pub fn execute_rank(args: RankArgs, ctx: &Context) -> Result<()> {
    let requirement = ctx.pipeline.requirement(&args.job, args.version)?;
    let mut ranked = ctx.pipeline.rank(&requirement.job_id, requirement.version)?;
    if let Some(limit) = args.limit {
        ranked.truncate(limit);
    }

    println!("{}", ctx.formatter.format_ranking(&requirement, &ranked)?);
    Ok(())
}

/// Execute the shortlist command.
pub fn execute_shortlist(args: RankArgs, ctx: &Context) -> Result<()> {
    let requirement = ctx.pipeline.requirement(&args.job, args.version)?;
    let mut shortlisted = ctx
        .pipeline
        .shortlist(&requirement.job_id, requirement.version)?;
    if let Some(limit) = args.limit {
        shortlisted.truncate(limit);
    }

    println!("{}", ctx.formatter.format_ranking(&requirement, &shortlisted)?);
    Ok(())
}
