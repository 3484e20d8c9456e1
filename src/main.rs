//! quake-risk runner: loads config and model once, then classifies
//! newline-delimited JSON requests from stdin (or a single `--input`),
//! writing one JSON line per request to stdout.

use clap::{Parser, Subcommand};
use quake_risk::{
    config::ServiceConfig, logging::StructuredLogger, model::ModelSlot, RiskService,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "quake-risk", version, about = "Classify earthquake significance risk")]
struct Cli {
    /// Config file (default: $QUAKE_RISK_CONFIG, then ./config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured model artifact path
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify requests (default)
    Classify {
        /// One JSON request, e.g. '{"magnitude":7,"depth":50,"cdi":8,"mmi":9,"sig":700}'
        #[arg(long)]
        input: Option<String>,
    },
    /// Load config and model, report status, exit
    Check,
}

fn load_config(cli: &Cli) -> Result<ServiceConfig, BoxError> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("QUAKE_RISK_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let mut config = ServiceConfig::load(&path)?;
    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    Ok(config)
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(model_path = %config.model_path.display(), "quake-risk starting");

    let slot = ModelSlot::new();
    let service = match RiskService::start(&config, &slot) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, status = ?slot.status(), "refusing to start");
            return Err(e.into());
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command.unwrap_or(Command::Classify { input: None }) {
        Command::Check => {
            info!(status = ?slot.status(), model = service.classifier().model_name(), "model check ok");
        }
        Command::Classify { input: Some(json) } => {
            StructuredLogger::emit_json(&service.respond(&json), &mut out)?;
        }
        Command::Classify { input: None } => {
            let mut count: u64 = 0;
            for line in std::io::stdin().lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                StructuredLogger::emit_json(&service.respond(&line), &mut out)?;
                count += 1;
            }
            out.flush()?;
            info!(count, "requests processed");
        }
    }

    Ok(())
}
