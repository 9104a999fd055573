// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use map_reduce_core::{InvocationFailure, Task, TaskInvoker};
use rand::Rng;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-process stand-in for a remote worker address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimulatedWorker(pub usize);

impl fmt::Display for SimulatedWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Timing and crash behaviour of simulated workers
#[derive(Debug, Clone)]
pub struct SimulationProfile {
    /// Percentage (0-100) of invocations on which the worker crashes
    pub failure_rate: f32,
    pub min_work_ms: u64,
    pub max_work_ms: u64,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            failure_rate: 0.0,
            min_work_ms: 1,
            max_work_ms: 5,
        }
    }
}

/// Runs tasks by sleeping for a random work time
/// A worker that crashes stays dead
#[derive(Clone)]
pub struct SimulatedInvoker {
    profile: SimulationProfile,
    crashed: Arc<Mutex<HashSet<SimulatedWorker>>>,
    completed: Arc<AtomicUsize>,
}

impl SimulatedInvoker {
    pub fn new(profile: SimulationProfile) -> Self {
        Self {
            profile,
            crashed: Arc::new(Mutex::new(HashSet::new())),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn crashed_workers(&self) -> usize {
        self.crashed.lock().map(|crashed| crashed.len()).unwrap_or(0)
    }

    pub fn completed_tasks(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn is_crashed(&self, worker: &SimulatedWorker) -> bool {
        self.crashed
            .lock()
            .map(|crashed| crashed.contains(worker))
            .unwrap_or(true)
    }

    fn mark_crashed(&self, worker: SimulatedWorker) {
        if let Ok(mut crashed) = self.crashed.lock() {
            crashed.insert(worker);
        }
    }
}

#[async_trait]
impl TaskInvoker<SimulatedWorker> for SimulatedInvoker {
    async fn invoke(&self, worker: &SimulatedWorker, task: &Task) -> Result<(), InvocationFailure> {
        if self.is_crashed(worker) {
            return Err(InvocationFailure::new(format!("{} is unreachable", worker)));
        }

        let (work_time, crashes) = {
            let mut rng = rand::rng();
            let low = self.profile.min_work_ms;
            let high = self.profile.max_work_ms.max(low);
            let work_time = Duration::from_millis(rng.random_range(low..=high));
            let crashes = rng.random::<f32>() < self.profile.failure_rate / 100.0;
            (work_time, crashes)
        };

        tokio::time::sleep(work_time).await;

        if crashes {
            self.mark_crashed(*worker);
            return Err(InvocationFailure::new(format!(
                "{} crashed during {} task {}",
                worker, task.phase, task.index
            )));
        }

        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
