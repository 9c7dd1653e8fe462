mod cli;
mod config;
mod table;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};
use webcheck::{
    CheckKind, CheckRecord, CheckSettings, ConsoleNotifier, HttpFetcher, LibsqlStore,
    Orchestrator, Snapshot, unix_now,
};

use crate::cli::{AddCommands, Cli, Commands};
use crate::config::{Config, DATABASE_ENV};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logger::init_with_level(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO });

    let mut config = Config::from_config(cli.config.as_ref()).context("Failed to load config")?;
    config.apply_overrides(env::var(DATABASE_ENV).ok(), cli.database.clone());
    debug!("{config}");

    let store = LibsqlStore::open(&config.database.path).await.with_context(|| {
        format!("Failed to open database {}", config.database.path.display())
    })?;
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    let orchestrator = Orchestrator::with_policy(
        Arc::new(store),
        Arc::new(fetcher),
        Arc::new(ConsoleNotifier),
        config.monitoring.recovery,
    );

    run(cli.command, &orchestrator, &config).await
}

async fn run(command: Commands, orchestrator: &Orchestrator, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Check => {
            orchestrator.run_pass(unix_now()).await;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Watch { interval } => {
            let period = Duration::from_secs(interval.unwrap_or(config.watch.interval_seconds).max(1));
            info!(seconds = period.as_secs(), "Watching checks, press Ctrl-C to stop");

            orchestrator
                .run_forever(period, async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for Ctrl-C: {}", e);
                    }
                })
                .await;
            Ok(ExitCode::SUCCESS)
        }
        Commands::List { kind, json } => list(orchestrator, kind, json).await,
        Commands::Add { check } => add(orchestrator, check, &config.defaults).await,
        Commands::Delete { kind, url } => match orchestrator.delete(kind, &url).await {
            Ok(()) => {
                println!("{} check for {} removed", kind, url);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                println!("{}", e);
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Import { file } => {
            let contents = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read import file {}", file.display()))?;
            let report = orchestrator.import(&contents, &config.defaults).await;

            for outcome in &report.outcomes {
                match &outcome.result {
                    Ok(record) => added_messages(record).iter().for_each(|m| println!("{m}")),
                    Err(e) => println!("Error: {}", e),
                }
            }

            match report.aborted {
                Some(e) => {
                    println!("{}", e);
                    Ok(ExitCode::FAILURE)
                }
                None => Ok(ExitCode::SUCCESS),
            }
        }
    }
}

async fn list(orchestrator: &Orchestrator, kind: Option<CheckKind>, json: bool) -> Result<ExitCode> {
    let kinds = kind.map(|k| vec![k]).unwrap_or_else(|| CheckKind::ALL.to_vec());

    let mut tables = Vec::new();
    let mut records = Vec::new();
    for kind in kinds {
        let checks = orchestrator.list(kind).await?;
        tables.push(table::render(kind, &checks));
        records.extend(checks);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        println!("{}", tables.join("\n\n"));
    }
    Ok(ExitCode::SUCCESS)
}

async fn add(orchestrator: &Orchestrator, check: AddCommands, defaults: &CheckSettings) -> Result<ExitCode> {
    let settings = match &check {
        AddCommands::Hash { settings, .. }
        | AddCommands::String { settings, .. }
        | AddCommands::Diff { settings, .. } => settings.resolve(defaults),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            println!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let result = match &check {
        AddCommands::Hash { url, .. } => orchestrator.add_hash(url, &settings).await,
        AddCommands::String { target, url, .. } => orchestrator.add_string(url, target, &settings).await,
        AddCommands::Diff { url, .. } => orchestrator.add_diff(url, &settings).await,
    };

    match result {
        Ok(record) => {
            added_messages(&record).iter().for_each(|m| println!("{m}"));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Lines printed after a check is added
fn added_messages(record: &CheckRecord) -> Vec<String> {
    let mut messages = Vec::new();
    if let Snapshot::Presence(state) = &record.snapshot {
        let status = if state.present { "currently present" } else { "currently not present" };
        messages.push(format!("{} is {}, will alert if this changes", state.target, status));
    }
    messages.push(format!("Added {} check for {}", record.kind(), record.url));
    messages
}
