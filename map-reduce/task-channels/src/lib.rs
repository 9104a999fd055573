// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod config;
pub use config::Config;

pub mod simulated_invoker;
pub use simulated_invoker::{SimulatedInvoker, SimulatedWorker, SimulationProfile};

pub mod registration_feed;
pub use registration_feed::RegistrationFeed;

use map_reduce_core::{ChannelWorkerStream, DispatchError, JobSummary, Orchestrator, Scheduler};
use tokio_util::sync::CancellationToken;

/// Runs a whole job against simulated workers
///
/// Workers keep registering until the job finishes or `cancellation_token`
/// fires, so crashed workers are eventually replaced.
pub async fn run_simulation(
    config: &Config,
    cancellation_token: CancellationToken,
) -> Result<JobSummary, DispatchError> {
    let stream = ChannelWorkerStream::new();
    let feed_token = cancellation_token.child_token();
    let feed = RegistrationFeed::new(0, config.registration_interval()).start(
        stream.clone(),
        config.initial_workers,
        feed_token.clone(),
    );

    let scheduler = Scheduler::new(stream, SimulatedInvoker::new(config.profile()))
        .with_cancellation(cancellation_token);
    let result = Orchestrator::new(scheduler).run(&config.job).await;

    feed_token.cancel();
    let _ = feed.await;
    result
}
