//! Submissions command implementation.

use crate::cli::SubmissionsArgs;
use crate::context::Context;
use crate::error::Result;

/// Execute the submissions command.
pub fn execute_submissions(args: SubmissionsArgs, ctx: &Context) -> Result<()> {
    let mut records = ctx.pipeline.submissions(args.job.as_deref())?;
    if args.failed {
        records.retain(|r| r.state.failure().is_some());
    }

    println!("{}", ctx.formatter.format_submissions(&records)?);
    Ok(())
}
