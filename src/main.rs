use anyhow::{Context, Result};
use clap::Parser;
use locale_translator::{
    client::TranslationClient,
    config::Config,
    export::{write_archive, DEFAULT_ARCHIVE_NAME},
    pipeline::{Pipeline, RunReport, Translator},
    provider::DirectTranslator,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Translate a JSON locale file into every supported language and bundle
/// the results into a zip archive.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source locale file (JSON, comments and trailing commas allowed)
    input: PathBuf,

    /// Where to write the archive
    #[arg(short, long, default_value = DEFAULT_ARCHIVE_NAME)]
    output: PathBuf,

    /// Call the translation provider directly instead of the translate function
    #[arg(long)]
    direct: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_translator=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let policy = config.language_policy()?;

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    info!("Translating {}", cli.input.display());

    let report = if cli.direct {
        let translator = DirectTranslator::from_config(&config)?;
        run(Pipeline::with_policy(translator, policy), &content).await?
    } else {
        let client = TranslationClient::new(&config)?;
        run(Pipeline::with_policy(client, policy), &content).await?
    };

    if let Some(summary) = report.summary() {
        warn!("{}", summary);
        for message in report.errors.values() {
            error!("{}", message);
        }
    }

    write_archive(&report.translations, &cli.output)
        .with_context(|| format!("Failed to export translations to {}", cli.output.display()))?;

    info!(
        "Done: {} files written to {}",
        report.translations.len(),
        cli.output.display()
    );
    Ok(())
}

async fn run<T: Translator>(pipeline: Pipeline<T>, content: &str) -> Result<RunReport> {
    let report = pipeline
        .run_with_progress(content, |progress| {
            info!("Progress: {}/{} languages", progress.completed, progress.total);
        })
        .await?;
    Ok(report)
}
