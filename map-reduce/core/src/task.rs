// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::phase::Phase;
use serde::{Deserialize, Serialize};

/// One unit of work within a phase, identified by its index
///
/// `input` is only present for map tasks. `other_phase_count` is the number of
/// reduce partitions for a map task, or the number of map outputs a reduce task
/// has to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub job_name: String,
    pub phase: Phase,
    pub index: usize,
    pub input: Option<String>,
    pub other_phase_count: usize,
}

impl Task {
    pub fn map(job_name: &str, index: usize, input: &str, n_reduce: usize) -> Self {
        Self {
            job_name: job_name.to_string(),
            phase: Phase::Map,
            index,
            input: Some(input.to_string()),
            other_phase_count: n_reduce,
        }
    }

    pub fn reduce(job_name: &str, index: usize, n_map: usize) -> Self {
        Self {
            job_name: job_name.to_string(),
            phase: Phase::Reduce,
            index,
            input: None,
            other_phase_count: n_map,
        }
    }
}
