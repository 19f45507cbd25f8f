mod config;
mod diff;
mod fetch;
mod filter;
mod models;
mod normalize;
mod pipeline;
mod store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use models::NormalizedListing;
use pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "ashwatch")]
#[command(about = "Watch Ashby job boards, classify listings, and sync changes to a jobs API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every configured company once
    Run,

    /// Process every configured company repeatedly at the configured interval
    Watch,

    /// Diff two snapshot files and print the change set (no network)
    Diff {
        /// Previous snapshot file
        previous: PathBuf,

        /// Current snapshot file
        current: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let config = Config::from_env()?;
            let pipeline = Pipeline::from_config(&config)?;
            run_once(&pipeline, &config);
        }

        Commands::Watch => {
            let config = Config::from_env()?;
            let pipeline = Pipeline::from_config(&config)?;
            loop {
                run_once(&pipeline, &config);
                info!(secs = config.interval.as_secs(), "sleeping until next run");
                std::thread::sleep(config.interval);
            }
        }

        Commands::Diff { previous, current } => {
            let previous = read_snapshot(&previous)?;
            let current = read_snapshot(&current)?;
            let result = diff::diff(&previous, &current);
            if result.is_unchanged {
                println!("No changes.");
            } else {
                for change in &result.changes {
                    println!(
                        "{:<8} {:<10} {:<16} {}",
                        change.action.to_string(),
                        change.listing.seniority_level.to_string(),
                        change.listing.field.to_string(),
                        change.listing.url
                    );
                }
                println!("\n{} change(s).", result.changes.len());
            }
        }
    }

    Ok(())
}

fn run_once(pipeline: &Pipeline, config: &Config) {
    let report = pipeline.run_all(&config.companies, config.pause);

    println!(
        "Run finished at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("{:<24} {}", "COMPANY", "OUTCOME");
    println!("{}", "-".repeat(56));
    for (company, outcome) in &report {
        match outcome {
            Ok(outcome) => println!("{:<24} {}", company, outcome),
            Err(err) => println!("{:<24} error: {:#}", company, err),
        }
    }
}

fn read_snapshot(path: &Path) -> Result<Vec<NormalizedListing>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse snapshot file: {}", path.display()))
}
