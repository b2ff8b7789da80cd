//! Reprocess command implementation.

use crate::cli::ReprocessArgs;
use crate::context::Context;
use crate::error::{CliError, Result};
use smarthire_domain::Fingerprint;

/// Execute the reprocess command.
pub async fn execute_reprocess(args: ReprocessArgs, ctx: &Context) -> Result<()> {
    let fingerprint = Fingerprint::from_hex(&args.fingerprint).map_err(CliError::InvalidInput)?;
    ctx.require_extraction()?;

    let outcome = ctx
        .pipeline
        .reprocess(fingerprint, &args.job, args.version)
        .await?;

    println!("{}", ctx.formatter.format_outcomes(std::slice::from_ref(&outcome))?);
    Ok(())
}
