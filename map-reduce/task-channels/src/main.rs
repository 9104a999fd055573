// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use map_reduce_task_channels::{run_simulation, Config};
use std::path::PathBuf;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Runs a map-reduce job on simulated, crash-prone in-process workers
#[derive(Debug, Parser)]
struct Args {
    /// JSON configuration file, defaults are used when it is missing
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Overrides the configured crash percentage
    #[arg(long)]
    failure_rate: Option<f32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("map_reduce_core=info,map_reduce_task_channels=info")),
        )
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        warn!(path = %args.config.display(), "config file not found, using defaults");
        Config::default()
    };
    if let Some(failure_rate) = args.failure_rate {
        config.failure_rate = failure_rate;
        config.validate()?;
    }

    info!(
        job = %config.job.name,
        inputs = config.job.inputs.len(),
        n_reduce = config.job.n_reduce,
        initial_workers = config.initial_workers,
        failure_rate = config.failure_rate,
        "starting simulation"
    );

    let cancellation_token = CancellationToken::new();
    let ctrl_c_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("ctrl+c received, initiating shutdown");
            ctrl_c_token.cancel();
        }
    });

    let summary = run_simulation(&config, cancellation_token).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    info!(
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "job complete"
    );
    Ok(())
}
