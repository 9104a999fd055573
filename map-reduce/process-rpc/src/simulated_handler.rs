// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::worker_server::TaskHandler;
use async_trait::async_trait;
use map_reduce_core::Task;
use rand::Rng;
use std::time::Duration;
use tracing::info;

/// Stand-in for real map/reduce functions: sleeps, then fails at a given rate
pub struct SimulatedHandler {
    work_time: Duration,
    /// Percentage (0-100) of tasks that fail
    failure_rate: f32,
}

impl SimulatedHandler {
    pub fn new(work_time: Duration, failure_rate: f32) -> Self {
        Self {
            work_time,
            failure_rate,
        }
    }
}

#[async_trait]
impl TaskHandler for SimulatedHandler {
    async fn handle(&self, task: &Task) -> Result<(), String> {
        tokio::time::sleep(self.work_time).await;

        let fails = rand::rng().random::<f32>() < self.failure_rate / 100.0;
        if fails {
            return Err(format!(
                "simulated failure in {} task {} of job {}",
                task.phase, task.index, task.job_name
            ));
        }

        match &task.input {
            Some(input) => info!(
                job = %task.job_name,
                task = task.index,
                %input,
                partitions = task.other_phase_count,
                "map task done"
            ),
            None => info!(
                job = %task.job_name,
                task = task.index,
                map_outputs = task.other_phase_count,
                "reduce task done"
            ),
        }
        Ok(())
    }
}
