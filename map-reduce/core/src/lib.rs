// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod phase;
pub use phase::Phase;

pub mod task;
pub use task::Task;

pub mod batch;
pub use batch::Batch;

pub mod error;
pub use error::{ConfigError, DispatchError, InvocationFailure};

pub mod worker_stream;
pub use worker_stream::{ChannelWorkerStream, WorkerHandle, WorkerStream};

pub mod task_invoker;
pub use task_invoker::TaskInvoker;

pub mod completion_barrier;
pub use completion_barrier::CompletionBarrier;

pub mod summary;
pub use summary::{JobSummary, PhaseSummary, TaskOutcome};

pub mod phase_executor;
pub use phase_executor::PhaseExecutor;

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod job_config;
pub use job_config::JobConfig;

pub mod orchestrator;
pub use orchestrator::Orchestrator;
