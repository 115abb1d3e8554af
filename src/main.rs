//! Housing price pipeline - Main Entry Point

use clap::Parser;
use housing_ml::cli::{
    cmd_predict, cmd_register, cmd_resolve_uri, cmd_sample, cmd_serve, cmd_train, Cli, Commands,
};
use housing_ml::config::PipelineConfig;
use housing_ml::server::ServerConfig;
use housing_ml::utils::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = PipelineConfig::from_env();

    // Long-running commands also log to a file
    match &cli.command {
        Commands::Train => init_logging(Some(&config.train_log_path()))?,
        Commands::Serve { .. } => init_logging(Some(&ServerConfig::default().api_log_path()))?,
        _ => init_logging(None)?,
    }

    match cli.command {
        Commands::Train => cmd_train(&config)?,
        Commands::Serve { host, port } => cmd_serve(host, port).await?,
        Commands::Predict { data, artifacts, output } => {
            let artifacts = artifacts.unwrap_or_else(|| config.artifact_dir.clone());
            cmd_predict(&data, &artifacts, output.as_deref())?;
        }
        Commands::Sample { output, n, seed } => cmd_sample(&config, &output, n, seed)?,
        Commands::Register { artifacts, name, alias, registry } => {
            let artifacts = artifacts.unwrap_or_else(|| config.artifact_dir.clone());
            cmd_register(&registry, &name, &artifacts, alias.as_deref())?;
        }
        Commands::ResolveUri { reference, registry } => cmd_resolve_uri(&registry, &reference)?,
    }

    Ok(())
}
