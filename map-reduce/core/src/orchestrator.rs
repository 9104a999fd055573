// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::batch::Batch;
use crate::error::DispatchError;
use crate::job_config::JobConfig;
use crate::phase::Phase;
use crate::phase_executor::PhaseExecutor;
use crate::summary::JobSummary;
use tracing::info;

/// Orchestrator coordinates the map-reduce workflow
/// Both phases run on the same executor, so workers freed by the map phase
/// serve the reduce phase
pub struct Orchestrator<E: PhaseExecutor> {
    executor: E,
}

impl<E: PhaseExecutor> Orchestrator<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs the map phase to completion, then the reduce phase
    pub async fn run(&self, job: &JobConfig) -> Result<JobSummary, DispatchError> {
        info!(
            job = %job.name,
            inputs = job.inputs.len(),
            n_reduce = job.n_reduce,
            "orchestrator started"
        );

        let map = self
            .executor
            .execute(Batch::new(&job.name, Phase::Map, &job.inputs, job.n_reduce))
            .await?;

        let reduce = self
            .executor
            .execute(Batch::new(
                &job.name,
                Phase::Reduce,
                &job.inputs,
                job.n_reduce,
            ))
            .await?;

        info!(job = %job.name, "orchestrator finished");
        Ok(JobSummary {
            job_name: job.name.clone(),
            map,
            reduce,
        })
    }
}
