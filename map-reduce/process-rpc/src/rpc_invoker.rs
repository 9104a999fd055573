// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::framing;
use crate::rpc::{WorkerRequest, WorkerResponse};
use async_trait::async_trait;
use map_reduce_core::{InvocationFailure, Task, TaskInvoker};
use std::time::Duration;

/// Sends tasks to workers over TCP
///
/// Connection errors, malformed replies, timeouts and worker-reported errors
/// all collapse into an invocation failure.
#[derive(Debug, Clone)]
pub struct RpcInvoker {
    timeout: Duration,
}

impl RpcInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl TaskInvoker<String> for RpcInvoker {
    async fn invoke(&self, worker: &String, task: &Task) -> Result<(), InvocationFailure> {
        let request = WorkerRequest::DoTask(task.clone());
        match framing::call::<_, WorkerResponse>(worker, &request, self.timeout).await {
            Ok(WorkerResponse::TaskDone { ok: true, .. }) => Ok(()),
            Ok(WorkerResponse::TaskDone { ok: false, error }) => Err(InvocationFailure::new(
                error.unwrap_or_else(|| "worker reported failure".to_string()),
            )),
            Ok(other) => Err(InvocationFailure::new(format!(
                "unexpected reply {:?}",
                other
            ))),
            Err(e) => Err(InvocationFailure::new(e.to_string())),
        }
    }
}
