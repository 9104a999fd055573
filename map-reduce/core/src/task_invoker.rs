// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::InvocationFailure;
use crate::task::Task;
use async_trait::async_trait;

/// Trait for abstracting how a task reaches a worker
/// Different implementations for in-process simulation, TCP, etc.
#[async_trait]
pub trait TaskInvoker<W>: Send + Sync + 'static {
    /// Has `worker` perform `task`
    /// Ok only if the worker received and completed the task
    async fn invoke(&self, worker: &W, task: &Task) -> Result<(), InvocationFailure>;
}
