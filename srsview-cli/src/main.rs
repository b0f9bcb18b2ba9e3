//! srsview CLI - renders Site Risk Score payloads as interactive HTML reports

#![deny(warnings)]

// Global invariants enforced:
// - Identical payload yields byte-for-byte identical report output

use anyhow::Context;
use clap::{Parser, Subcommand};
use srsview_core::config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "srsview")]
#[command(about = "Renders clinical-trial Site Risk Score (SRS) payloads as self-contained interactive HTML reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (payload keys, filter recomputation)
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON payload into a self-contained HTML report
    Render {
        /// Path to the JSON payload file
        payload: PathBuf,

        /// Output file path (default: payload path with .html extension)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report title (overrides config file)
        #[arg(long)]
        title: Option<String>,
    },
    /// Validate a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without rendering
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            payload,
            output,
            config: config_path,
            title,
        } => render(payload, output, config_path, title, cli.debug),
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => validate_config(path),
            ConfigAction::Show { path } => show_config(path),
        },
    }
}

fn render(
    payload_path: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    title: Option<String>,
    debug: bool,
) -> anyhow::Result<()> {
    if !payload_path.exists() {
        anyhow::bail!("Payload file does not exist: {}", payload_path.display());
    }

    let content = std::fs::read_to_string(&payload_path)
        .with_context(|| format!("failed to read payload: {}", payload_path.display()))?;
    let mut payload: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse payload: {}", payload_path.display()))?;
    tracing::debug!(path = %payload_path.display(), bytes = content.len(), "payload loaded");

    // the widget's own debug logging is gated by the payload flag
    if debug {
        if let Some(map) = payload.as_object_mut() {
            map.insert("debug".to_string(), serde_json::Value::Bool(true));
        }
    }

    let root = std::env::current_dir().context("failed to resolve working directory")?;
    let mut options = config::load_and_resolve(&root, config_path.as_deref())
        .context("failed to load configuration")?;
    if let Some(config_path) = &options.config_path {
        eprintln!("Using config: {}", config_path.display());
    }

    // CLI flags override config file values
    if let Some(title) = title {
        options.title = title;
    }

    let report = srsview_core::render_report(&payload, &options);

    let output_path = output.unwrap_or_else(|| payload_path.with_extension("html"));
    std::fs::write(&output_path, report)
        .with_context(|| format!("failed to write report: {}", output_path.display()))?;
    eprintln!("Wrote report: {}", output_path.display());
    Ok(())
}

fn validate_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let root = std::env::current_dir().context("failed to resolve working directory")?;
    let options = config::load_and_resolve(&root, path.as_deref())?;
    match &options.config_path {
        Some(path) => eprintln!("Config is valid: {}", path.display()),
        None => eprintln!("No config file found; defaults apply"),
    }
    Ok(())
}

fn show_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let root = std::env::current_dir().context("failed to resolve working directory")?;
    let options = config::load_and_resolve(&root, path.as_deref())?;

    println!("title: {}", options.title);
    println!(
        "initial range: [{}, {}]",
        options.initial.score_range.0, options.initial.score_range.1
    );
    println!("minimum studies: {}", options.initial.min_studies);
    println!(
        "outcome: {}",
        options.outcome.as_deref().unwrap_or("(none)")
    );
    match &options.config_path {
        Some(path) => println!("source: {}", path.display()),
        None => println!("source: defaults"),
    }
    Ok(())
}
