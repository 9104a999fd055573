// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::phase::Phase;
use thiserror::Error;

/// A worker did not complete a task, for whatever reason
///
/// Absorbed by the scheduler, which retries the task on another worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct InvocationFailure {
    pub reason: String,
}

impl InvocationFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{phase} phase cancelled with {remaining} of {total} tasks outstanding")]
    Cancelled {
        phase: Phase,
        remaining: usize,
        total: usize,
    },

    #[error("worker stream closed while {phase} task {index} was waiting for a worker")]
    WorkerStreamClosed { phase: Phase, index: usize },

    #[error("task runner failed: {0}")]
    Runner(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid job config: {0}")]
    Invalid(String),
}
