//! quill: Command-line tool that turns handwriting photos into markdown notes.
//!
//! Notes and images are written into a vault directory using the folders
//! from the configuration file (or `QUILL_*` environment variables).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use quill_core::QuillConfig;
use quill_pipeline::{NoteSynthesizer, VaultStore};

#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version, about = "Turn handwriting photos into markdown notes")]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: <config dir>/quill/config.toml, then environment)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create one note per image
    Process {
        /// Vault directory notes and images are written to
        #[arg(short, long, default_value = ".")]
        vault: PathBuf,

        /// Transcribe with the configured vision provider instead of tesseract
        #[arg(long)]
        vision: bool,

        /// Ask the vision provider for a summary
        #[arg(long)]
        summarize: bool,

        /// Image files to process
        #[arg(required = true, num_args = 1..)]
        images: Vec<PathBuf>,
    },

    /// Print the effective configuration as TOML (API keys redacted)
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the tracing subscriber.
///
/// Environment variables:
///   LOG_FORMAT - "json" or "text" (default: "text")
///   RUST_LOG   - standard env filter (default: "quill=info")
fn init_logging() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quill=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr; stdout carries the created note ids.
    if log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<QuillConfig> {
    let config = match path {
        Some(path) => QuillConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => QuillConfig::load().context("Failed to load config")?,
    };
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Process {
            vault,
            vision,
            summarize,
            images,
        } => {
            config.use_vision_for_ocr |= vision;
            config.summarize |= summarize;
            cmd_process(config, vault, &images).await
        }
        Commands::Config => cmd_config(config),
    }
}

async fn cmd_process(
    config: QuillConfig,
    vault: PathBuf,
    images: &[PathBuf],
) -> anyhow::Result<()> {
    info!(vault = %vault.display(), images = images.len(), "Processing images");

    let store = Arc::new(VaultStore::new(vault));
    let synthesizer = NoteSynthesizer::from_config(config, store)
        .await
        .context("Failed to start pipeline")?;

    let mut failed = 0usize;
    for image in images {
        match synthesizer.process_file(image).await {
            Ok(note) => println!("{}", note.id),
            Err(e) => {
                failed += 1;
                warn!(image = %image.display(), error = %e, "Skipping image");
            }
        }
    }

    synthesizer.shutdown().await?;

    if failed > 0 {
        anyhow::bail!("{} of {} images failed", failed, images.len());
    }
    Ok(())
}

fn cmd_config(mut config: QuillConfig) -> anyhow::Result<()> {
    for settings in [&mut config.openai, &mut config.anthropic] {
        if settings.has_api_key() {
            settings.api_key = Some("<redacted>".to_string());
        }
    }
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
