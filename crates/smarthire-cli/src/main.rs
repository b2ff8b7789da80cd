//! SmartHire CLI - rank résumés against versioned job requirements.

use anyhow::Context as _;
use clap::Parser;
use smarthire_cli::commands;
use smarthire_cli::{Cli, Command, ConfigLocation, Context, Formatter, OutputFormat};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smarthire=info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let location = ConfigLocation::resolve(cli.config)?;
    let mut config = location
        .load()
        .with_context(|| format!("loading {}", location.path().display()))?;
    if cli.api_key.is_some() {
        config.model.api_key = cli.api_key;
    }

    let format = cli.format.map(OutputFormat::from).unwrap_or(OutputFormat::Table);
    let formatter = Formatter::new(format, !cli.no_color)
        .with_highlight_threshold(config.scoring.shortlist_threshold);

    // Config commands run without opening storage
    let command = match cli.command {
        Command::Config(args) => {
            commands::execute_config(args, &location, &config, &formatter)?;
            return Ok(());
        }
        command => command,
    };

    let ctx = Context::open(config, &location.base_dir(), cli.offline, formatter)?;

    match command {
        Command::Job(args) => commands::execute_job(args, &ctx)?,
        Command::Ingest(args) => commands::execute_ingest(args, &ctx).await?,
        Command::Rank(args) => commands::execute_rank(args, &ctx)?,
        Command::Shortlist(args) => commands::execute_shortlist(args, &ctx)?,
        Command::Rescore(args) => commands::execute_rescore(args, &ctx).await?,
        Command::Submissions(args) => commands::execute_submissions(args, &ctx)?,
        Command::Reprocess(args) => commands::execute_reprocess(args, &ctx).await?,
        Command::Config(_) => unreachable!(),
    }

    Ok(())
}
