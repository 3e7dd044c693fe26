use std::path::PathBuf;

use analysis::MatchRules;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use config::Config;
use pipeline::{Archiver, Outcome, Pipeline};
use retry::RetryPolicy;
use storage::BlobClient;
use telegram::TelegramClient;
use vision::VisionClient;

mod analysis;
mod config;
mod error;
mod locate;
mod logging;
mod pipeline;
mod retry;
mod statics;
mod storage;
mod telegram;
#[cfg(test)]
mod test_server;
mod utils;
mod vision;

#[derive(Parser)]
#[command(version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<SubCommand>,
    #[command(flatten)]
    run: RunInfo,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Analyzes a single image and prints the result, without notifying anyone
    Analyze(AnalyzeInfo),
}

#[derive(Args)]
struct RunInfo {
    /// The image to check. Defaults to the newest snapshot in the watched directory
    image: Option<PathBuf>,
    /// Log what would be sent, but send nothing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct AnalyzeInfo {
    /// The image to check. Defaults to the newest snapshot in the watched directory
    image: Option<PathBuf>,
}

fn analyze_single(config: &Config, args: AnalyzeInfo) -> anyhow::Result<()> {
    let image = locate::locate(args.image, &config.snapshots)?;
    let vision = VisionClient::new(
        &config.vision,
        config.timeout_secs,
        RetryPolicy::from_config(&config.retry),
    )?;

    let (analysis, raw) = vision.analyze_raw(&image)?;
    let raw: serde_json::Value = serde_json::from_str(&raw)?;
    println!("{}", serde_json::to_string_pretty(&raw)?);

    match MatchRules::new(&config.rules).evaluate(&analysis) {
        Some(detection) => println!("{}", detection.summary()),
        None => println!("Nothing detected"),
    }

    Ok(())
}

fn run(config: &Config, args: RunInfo) -> anyhow::Result<()> {
    let retry = RetryPolicy::from_config(&config.retry);

    let image = locate::locate(args.image, &config.snapshots).context("locating image")?;

    let vision = VisionClient::new(&config.vision, config.timeout_secs, retry.clone())?;
    let telegram = TelegramClient::new(&config.telegram, config.timeout_secs, retry.clone())?;
    let blob = config
        .blob
        .as_ref()
        .map(|blob| BlobClient::new(blob, config.timeout_secs, retry.clone()))
        .transpose()?;
    let rules = MatchRules::new(&config.rules);

    let pipeline = Pipeline {
        analyzer: &vision,
        rules: &rules,
        notifier: &telegram,
        archiver: blob.as_ref().map(|b| b as &dyn Archiver),
        message: &config.telegram.message,
        dry_run: args.dry_run,
    };

    match pipeline.run(&image)? {
        Outcome::NoMatch | Outcome::Matched(_) => {}
        Outcome::Notified { archived, .. } => {
            tracing::info!("Matching object found, notification sent");
            if let Some(url) = archived {
                tracing::info!("Image archived at {url}");
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Some(SubCommand::Analyze(args)) => {
            logging::init(None)?;
            analyze_single(&config, args)
        }
        None => {
            logging::init(config.logfile.as_deref())?;
            run(&config, cli.run).inspect_err(|err| tracing::error!("{err:#}"))
        }
    }
}
