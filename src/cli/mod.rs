//! Housing CLI Module
//!
//! Command-line interface for training, serving, batch prediction and
//! registry lookups.

use clap::{Parser, Subcommand};
use polars::prelude::NamedFrom;
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::inference::{load_artifacts, predict_raw};
use crate::pipeline::run_training;
use crate::registry::{
    LocalModelRegistry, ModelRegistry, DEFAULT_ALIAS, DEFAULT_MODEL_NAME, DEFAULT_REGISTRY_DIR,
};
use crate::utils::{load_csv, sample_rows, save_csv};

pub const DEFAULT_SAMPLE_PATH: &str = "data/inference/sample_input.csv";

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "housing")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Housing price training pipeline and prediction service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train on the raw CSV and write model, imputer, encoder and metrics
    Train,

    /// Serve /health and /predict from the trained artifacts
    Serve {
        /// Bind address (defaults to API_HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port (defaults to API_PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Predict every row of a raw CSV with the trained artifacts
    Predict {
        /// Input CSV without the target column
        #[arg(short, long, default_value = DEFAULT_SAMPLE_PATH)]
        data: PathBuf,

        /// Artifact directory (defaults to HOUSING_ARTIFACT_DIR or artifacts/production)
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Write the input rows plus a `prediction` column here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Draw a small inference sample from the raw data, target removed
    Sample {
        /// Output CSV
        #[arg(short, long, default_value = DEFAULT_SAMPLE_PATH)]
        output: PathBuf,

        /// Number of rows
        #[arg(short, long, default_value = "10")]
        n: usize,

        /// Sampling seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Record an artifact directory as a new model version
    Register {
        /// Artifact directory (defaults to HOUSING_ARTIFACT_DIR or artifacts/production)
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Registered model name
        #[arg(long, default_value = DEFAULT_MODEL_NAME)]
        name: String,

        /// Point this alias at the new version
        #[arg(long)]
        alias: Option<String>,

        /// Registry directory
        #[arg(long, env = "HOUSING_REGISTRY_DIR", default_value = DEFAULT_REGISTRY_DIR)]
        registry: PathBuf,
    },

    /// Resolve `name@alias` or `name/version` to an artifact URI
    ResolveUri {
        /// Model reference
        #[arg(default_value_t = format!("{}@{}", DEFAULT_MODEL_NAME, DEFAULT_ALIAS))]
        reference: String,

        /// Registry directory
        #[arg(long, env = "HOUSING_REGISTRY_DIR", default_value = DEFAULT_REGISTRY_DIR)]
        registry: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(config: &PipelineConfig) -> anyhow::Result<()> {
    section("Train");

    step_run(&format!("Training on {}", config.data_path.display()));
    let start = Instant::now();
    let outcome = run_training(config)?;
    step_done(&format!(
        "{} train / {} test rows in {:?}",
        outcome.n_train,
        outcome.n_test,
        start.elapsed()
    ));

    println!();
    println!("  {:<10} {:>14} {:>14}", muted("Metric"), muted("Train"), muted("Test"));
    let holdout = &outcome.metrics.holdout;
    for (name, train, test) in [
        ("MAE", holdout.train.mae, holdout.test.mae),
        ("RMSE", holdout.train.rmse, holdout.test.rmse),
        ("R²", holdout.train.r2, holdout.test.r2),
    ] {
        println!(
            "  {:<10} {:>14} {:>14}",
            name,
            format!("{:.4}", train).white(),
            format!("{:.4}", test).white().bold()
        );
    }
    println!();
    println!("  {} {}", muted("Artifacts"), config.artifact_dir.display());
    println!();

    Ok(())
}

pub async fn cmd_serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: host.unwrap_or(defaults.host),
        port: port.unwrap_or(defaults.port),
        ..defaults
    };

    println!();
    println!("  {}", "Housing prediction server".white().bold());
    println!("  {} http://{}:{}/health", muted("Health "), config.host, config.port);
    println!("  {} http://{}:{}/predict", muted("Predict"), config.host, config.port);
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    run_server(config).await
}

pub fn cmd_predict(
    data_path: &Path,
    artifact_dir: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading artifacts");
    let bundle = load_artifacts(artifact_dir)?;
    step_done(&artifact_dir.display().to_string());

    step_run("Loading data");
    let mut df = load_csv(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    let predictions = predict_raw(&df, &bundle)?;

    println!();
    for (i, p) in predictions.iter().enumerate() {
        println!("  {:<6} {}", muted(&format!("#{}", i)), format!("{:.2}", p).white());
    }
    println!();

    if let Some(path) = output {
        df.with_column(polars::prelude::Series::new("prediction".into(), predictions))?;
        save_csv(&mut df, path)?;
        println!("  {} {}", ok("✓"), format!("Saved → {}", path.display()));
        println!();
    }

    Ok(())
}

pub fn cmd_sample(config: &PipelineConfig, output: &Path, n: usize, seed: u64) -> anyhow::Result<()> {
    section("Sample");

    let df = load_csv(&config.data_path)?;
    let features = df.drop(&config.target_column)?;
    let mut sample = sample_rows(&features, n, seed)?;
    save_csv(&mut sample, output)?;

    println!("  {} {} rows → {}", ok("✓"), sample.height(), output.display());
    println!();
    Ok(())
}

pub fn cmd_register(
    registry_dir: &Path,
    name: &str,
    artifact_dir: &Path,
    alias: Option<&str>,
) -> anyhow::Result<()> {
    let mut registry = LocalModelRegistry::open(registry_dir)?;
    let version = registry.register_version(name, artifact_dir)?;
    println!("Registered {} version {} ({})", name, version.version, version.source);

    if let Some(alias) = alias {
        registry.set_alias(name, alias, version.version)?;
        println!("Alias {}@{} → version {}", name, alias, version.version);
    }
    Ok(())
}

pub fn cmd_resolve_uri(registry_dir: &Path, reference: &str) -> anyhow::Result<()> {
    let registry = LocalModelRegistry::open(registry_dir)?;
    let uri = registry.resolve(reference)?;
    println!("Resolved artifact URI: {}", uri);
    Ok(())
}
