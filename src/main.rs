//! Stock Prediction Decision Engine
//!
//! CLI for evaluating batches of model outputs into trading
//! recommendations, and for the offline calibration-temperature search.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use stock_predictor::{
    config::EngineConfig,
    engine::{
        calibration::{self, FittedTemperature},
        DecisionEngine, DecisionRequest,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stock-predictor")]
#[command(about = "Calibrated stock prediction decision engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a batch of prediction requests, one worker per symbol
    Predict {
        /// JSON file containing an array of decision requests
        #[arg(short, long)]
        input: PathBuf,
        /// Emit flat records instead of nested result objects
        #[arg(long)]
        flat: bool,
    },
    /// Fit calibration temperatures from validation data
    Calibrate {
        /// JSON file with raw probabilities and realized outcomes per horizon
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print the effective engine configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::load(&cli.config)?;

    match cli.command {
        Commands::Predict { input, flat } => predict(config, &input, flat).await,
        Commands::Calibrate { input } => calibrate(config, &input),
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn predict(config: EngineConfig, input: &PathBuf, flat: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let requests: Vec<DecisionRequest> =
        serde_json::from_str(&raw).context("parsing decision requests")?;

    tracing::info!(count = requests.len(), "evaluating prediction requests");

    let engine = Arc::new(DecisionEngine::new(config)?);

    let mut handles = Vec::with_capacity(requests.len());
    for request in requests {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let symbol = request.symbol.clone();
            (symbol, engine.decide(&request))
        }));
    }

    let mut failures = 0usize;
    for handle in handles {
        let (symbol, outcome) = handle.await?;
        match outcome {
            Ok(result) => {
                let line = if flat {
                    serde_json::to_string(&result.to_record())?
                } else {
                    serde_json::to_string(&result)?
                };
                println!("{line}");
            }
            Err(e) => {
                failures += 1;
                tracing::error!(%symbol, error = %e, "prediction failed");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} prediction request(s) failed");
    }
    Ok(())
}

/// Validation samples for one horizon.
#[derive(Debug, Deserialize)]
struct HorizonSamples {
    raw_probs: Vec<f64>,
    /// Realized outcomes, 1.0 for an upward move, 0.0 otherwise.
    outcomes: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct CalibrationInput {
    tomorrow: HorizonSamples,
    week: HorizonSamples,
}

fn calibrate(config: EngineConfig, input: &PathBuf) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let samples: CalibrationInput =
        serde_json::from_str(&raw).context("parsing calibration samples")?;

    let report = |horizon: &str, fitted: &FittedTemperature| {
        println!(
            "{horizon}: temperature = {:.3} (brier {:.4}, uncalibrated {:.4})",
            fitted.temperature, fitted.brier, fitted.uncalibrated_brier
        );
    };

    let tomorrow = calibration::fit_temperature(
        &samples.tomorrow.raw_probs,
        &samples.tomorrow.outcomes,
        &config.calibration,
    )?;
    report("tomorrow", &tomorrow);

    let week = calibration::fit_temperature(
        &samples.week.raw_probs,
        &samples.week.outcomes,
        &config.calibration,
    )?;
    report("week", &week);

    println!(
        "\n[calibration]\ntemp_tomorrow = {:.3}\ntemp_week = {:.3}",
        tomorrow.temperature, week.temperature
    );
    Ok(())
}
