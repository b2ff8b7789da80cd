//! Ingest command implementation.

use crate::cli::IngestArgs;
use crate::context::Context;
use crate::error::Result;
use crate::output::OutputFormat;
use smarthire_pipeline::SubmissionOutcome;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Execute the ingest command.
///
/// Files are submitted concurrently, at most `ingest.max_concurrent` at a
/// time, and reported in the order they were given. Files over the size
/// limit are rejected from their metadata without being read.
pub async fn execute_ingest(args: IngestArgs, ctx: &Context) -> Result<()> {
    ctx.require_extraction()?;

    let permits = Arc::new(Semaphore::new(ctx.config.ingest.max_concurrent));
    let mut handles = Vec::with_capacity(args.files.len());

    for path in args.files {
        let pipeline = ctx.pipeline.clone();
        let permits = Arc::clone(&permits);
        let job_id = args.job.clone();
        let version = args.version;

        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            let name = source_name(&path);
            let size = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata.len(),
                Err(e) => return Err((path, e)),
            };
            if let Some(outcome) = pipeline.reject_if_oversized(size, &name, &job_id) {
                return Ok(outcome);
            }
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!(file = %path.display(), bytes = bytes.len(), "Submitting");
                    Ok(pipeline.submit(bytes, &name, &job_id, version).await)
                }
                Err(e) => Err((path, e)),
            }
        }));
    }

    let mut outcomes: Vec<SubmissionOutcome> = Vec::with_capacity(handles.len());
    let mut unreadable: Vec<(PathBuf, std::io::Error)> = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(outcome) => outcomes.push(outcome),
            Err(failure) => unreadable.push(failure),
        }
    }

    for (path, e) in &unreadable {
        warn!(file = %path.display(), error = %e, "Could not read file");
        eprintln!(
            "{}",
            ctx.formatter
                .error(&format!("Could not read {}: {}", path.display(), e))
        );
    }

    println!("{}", ctx.formatter.format_outcomes(&outcomes)?);

    if ctx.formatter.format() == OutputFormat::Table {
        let persisted = outcomes.iter().filter(|o| o.is_persisted()).count();
        let failed = outcomes.len() - persisted + unreadable.len();
        let summary = format!("{} persisted, {} failed for {}", persisted, failed, args.job);
        if failed == 0 {
            println!("{}", ctx.formatter.success(&summary));
        } else {
            println!("{}", ctx.formatter.warning(&summary));
        }
    }

    Ok(())
}

/// File name as the uploader would see it.
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
