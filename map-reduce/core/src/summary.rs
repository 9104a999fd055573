// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::phase::Phase;
use serde::Serialize;

/// Result of running a single task to success
#[derive(Debug, Clone)]
pub struct TaskOutcome<W> {
    pub index: usize,
    pub worker: W,
    pub attempts: usize,
}

/// Counters for one finished phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub tasks: usize,
    pub attempts: usize,
    pub failures: usize,
}

impl PhaseSummary {
    pub fn new(phase: Phase, tasks: usize) -> Self {
        Self {
            phase,
            tasks,
            attempts: 0,
            failures: 0,
        }
    }

    pub fn record<W>(&mut self, outcome: &TaskOutcome<W>) {
        self.attempts += outcome.attempts;
        self.failures += outcome.attempts - 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub job_name: String,
    pub map: PhaseSummary,
    pub reduce: PhaseSummary,
}
