// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::batch::Batch;
use crate::completion_barrier::CompletionBarrier;
use crate::error::DispatchError;
use crate::phase::Phase;
use crate::phase_executor::PhaseExecutor;
use crate::summary::{PhaseSummary, TaskOutcome};
use crate::task::Task;
use crate::task_invoker::TaskInvoker;
use crate::worker_stream::{WorkerHandle, WorkerStream};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where a single task is in its retry loop
///
/// A task is pending until its runner is spawned, then cycles between waiting
/// for a worker and invoking one until an invocation succeeds.
#[derive(Debug)]
enum TaskState<W> {
    AwaitingWorker,
    Invoking(W),
    Succeeded(W),
}

/// Fault tolerant dispatcher for one batch at a time
///
/// Every task runs in its own tokio task. A failed worker is dropped and never
/// offered back; only a fresh registration can bring it back into the stream.
pub struct Scheduler<W, S, I> {
    workers: S,
    invoker: Arc<I>,
    cancellation_token: CancellationToken,
    _worker: PhantomData<fn() -> W>,
}

impl<W, S, I> Scheduler<W, S, I>
where
    W: WorkerHandle,
    S: WorkerStream<W>,
    I: TaskInvoker<W>,
{
    pub fn new(workers: S, invoker: I) -> Self {
        Self {
            workers,
            invoker: Arc::new(invoker),
            cancellation_token: CancellationToken::new(),
            _worker: PhantomData,
        }
    }

    /// Replaces the stop signal observed while waiting for workers and results
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Returns a clone of the cancellation token for external control
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Runs every task of `batch` to success
    ///
    /// Blocks until each task index has succeeded once. Invocation failures are
    /// retried forever on other workers; the only errors are cancellation, a
    /// closed worker stream, or a crashed task runner.
    pub async fn dispatch(&self, batch: Batch) -> Result<PhaseSummary, DispatchError> {
        let phase = batch.phase();
        let total = batch.len();
        info!(
            %phase,
            tasks = total,
            other_phase_count = batch.other_phase_count(),
            "scheduling phase"
        );

        let barrier = Arc::new(CompletionBarrier::new(total));
        let mut runners = JoinSet::new();
        for task in batch.into_tasks() {
            let runner = TaskRunner {
                task,
                workers: self.workers.clone(),
                invoker: self.invoker.clone(),
                barrier: barrier.clone(),
                _worker: PhantomData,
            };
            runners.spawn(runner.run());
        }

        let mut summary = PhaseSummary::new(phase, total);
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    runners.shutdown().await;
                    let remaining = barrier.remaining();
                    warn!(%phase, remaining, total, "phase cancelled");
                    return Err(DispatchError::Cancelled { phase, remaining, total });
                }
                _ = barrier.wait() => break,
                Some(joined) = runners.join_next() => match joined? {
                    Ok(outcome) => summary.record(&outcome),
                    Err(error) => {
                        runners.shutdown().await;
                        return Err(error);
                    }
                },
            }
        }

        // Every task has succeeded, collect the runners still handing back workers
        while let Some(joined) = runners.join_next().await {
            summary.record(&joined??);
        }

        info!(
            %phase,
            tasks = summary.tasks,
            attempts = summary.attempts,
            failures = summary.failures,
            "phase done"
        );
        Ok(summary)
    }
}

impl<W, S, I> PhaseExecutor for Scheduler<W, S, I>
where
    W: WorkerHandle,
    S: WorkerStream<W>,
    I: TaskInvoker<W>,
{
    async fn execute(&self, batch: Batch) -> Result<PhaseSummary, DispatchError> {
        self.dispatch(batch).await
    }
}

/// Retry loop owned by exactly one task
struct TaskRunner<W, S, I> {
    task: Task,
    workers: S,
    invoker: Arc<I>,
    barrier: Arc<CompletionBarrier>,
    _worker: PhantomData<fn() -> W>,
}

impl<W, S, I> TaskRunner<W, S, I>
where
    W: WorkerHandle,
    S: WorkerStream<W>,
    I: TaskInvoker<W>,
{
    async fn run(self) -> Result<TaskOutcome<W>, DispatchError> {
        let phase: Phase = self.task.phase;
        let index = self.task.index;
        let mut attempts = 0;
        let mut state = TaskState::AwaitingWorker;

        loop {
            state = match state {
                TaskState::AwaitingWorker => match self.workers.next().await {
                    Some(worker) => TaskState::Invoking(worker),
                    None => return Err(DispatchError::WorkerStreamClosed { phase, index }),
                },
                TaskState::Invoking(worker) => {
                    attempts += 1;
                    debug!(%phase, task = index, %worker, attempt = attempts, "invoking");
                    match self.invoker.invoke(&worker, &self.task).await {
                        Ok(()) => TaskState::Succeeded(worker),
                        Err(failure) => {
                            warn!(
                                %phase,
                                task = index,
                                %worker,
                                attempt = attempts,
                                %failure,
                                "invocation failed, dropping worker"
                            );
                            TaskState::AwaitingWorker
                        }
                    }
                }
                TaskState::Succeeded(worker) => {
                    self.barrier.complete(index);
                    self.workers.offer(worker.clone());
                    debug!(%phase, task = index, %worker, attempts, "task done");
                    return Ok(TaskOutcome {
                        index,
                        worker,
                        attempts,
                    });
                }
            };
        }
    }
}
