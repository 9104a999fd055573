// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::{Parser, Subcommand};
use map_reduce_core::JobConfig;
use map_reduce_process_rpc::{Master, SimulatedHandler, WorkerServer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Fault tolerant map-reduce over TCP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Accept worker registrations and schedule a job on them
    Master {
        /// Address workers register with
        #[arg(long, default_value = "127.0.0.1:7777")]
        listen: String,

        /// JSON job description (name, inputs, n_reduce)
        #[arg(long, default_value = "job.json")]
        job: PathBuf,

        /// Upper bound on a single task invocation
        #[arg(long, default_value_t = 10_000)]
        invoke_timeout_ms: u64,
    },
    /// Serve tasks for a master
    Worker {
        /// Master registration address
        #[arg(long, default_value = "127.0.0.1:7777")]
        master: String,

        /// Address this worker listens on, port 0 picks a free one
        #[arg(long, default_value = "127.0.0.1:0")]
        listen: String,

        /// Simulated time spent on each task
        #[arg(long, default_value_t = 100)]
        work_ms: u64,

        /// Percentage of tasks that fail
        #[arg(long, default_value_t = 0.0)]
        failure_rate: f32,

        #[arg(long, default_value_t = 20)]
        register_attempts: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("map_reduce_core=info,map_reduce_process_rpc=info")
            }),
        )
        .init();

    match Cli::parse().command {
        Command::Master {
            listen,
            job,
            invoke_timeout_ms,
        } => run_master(&listen, &job, Duration::from_millis(invoke_timeout_ms)).await,
        Command::Worker {
            master,
            listen,
            work_ms,
            failure_rate,
            register_attempts,
        } => {
            let handler = SimulatedHandler::new(Duration::from_millis(work_ms), failure_rate);
            run_worker(&master, &listen, handler, register_attempts).await
        }
    }
}

async fn run_master(listen: &str, job_path: &Path, invoke_timeout: Duration) -> anyhow::Result<()> {
    let job = JobConfig::load(job_path)?;
    let master = Master::start(listen, invoke_timeout).await?;

    let cancellation_token = master.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("ctrl+c received, cancelling job");
            cancellation_token.cancel();
        }
    });

    let result = master.run_job(&job).await;
    master.shutdown().await;

    let summary = result?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_worker(
    master: &str,
    listen: &str,
    handler: SimulatedHandler,
    register_attempts: u32,
) -> anyhow::Result<()> {
    let server = WorkerServer::bind(listen, handler).await?;
    info!(address = %server.local_addr()?, "worker listening");

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    server
        .register(master, register_attempts, Duration::from_millis(500))
        .await?;
    let completed = server.run().await;
    info!(completed, "worker exiting");
    Ok(())
}
