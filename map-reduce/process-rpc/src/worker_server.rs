// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::RpcError;
use crate::framing;
use crate::rpc::{MasterRequest, MasterResponse, WorkerRequest, WorkerResponse};
use async_trait::async_trait;
use futures::StreamExt;
use map_reduce_core::Task;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Trait for the task execution logic living on a worker
#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    /// Runs one task, an Err is reported back to the master as a failure
    async fn handle(&self, task: &Task) -> Result<(), String>;
}

/// Worker process endpoint
///
/// Runs at most one task at a time. Stops when a Shutdown request arrives or
/// the shutdown token is cancelled.
pub struct WorkerServer<H> {
    listener: TcpListener,
    handler: Arc<H>,
    shutdown: CancellationToken,
}

impl<H: TaskHandler> WorkerServer<H> {
    pub async fn bind(addr: &str, handler: H) -> Result<Self, RpcError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            handler: Arc::new(handler),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RpcError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Announces this worker to the master, retrying with a fixed delay
    pub async fn register(
        &self,
        master: &str,
        attempts: u32,
        delay: Duration,
    ) -> Result<(), RpcError> {
        let request = MasterRequest::Register {
            address: self.local_addr()?.to_string(),
        };

        let mut last = RpcError::ConnectionClosed;
        for attempt in 1..=attempts {
            match framing::call::<_, MasterResponse>(master, &request, delay * 10).await {
                Ok(MasterResponse::Registered) => {
                    info!(%master, attempt, "registered with master");
                    return Ok(());
                }
                Err(e) => {
                    debug!(%master, attempt, error = %e, "registration attempt failed");
                    last = e;
                }
            }
            tokio::time::sleep(delay).await;
        }

        Err(RpcError::RegistrationFailed {
            master: master.to_string(),
            attempts,
            last: Box::new(last),
        })
    }

    /// Serves requests until shut down
    /// Returns the number of tasks completed successfully
    pub async fn run(self) -> usize {
        let completed = Arc::new(AtomicUsize::new(0));
        let busy = Arc::new(Mutex::new(()));
        let mut incoming = TcpListenerStream::new(self.listener);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                next = incoming.next() => match next {
                    Some(Ok(stream)) => {
                        let session = Session {
                            handler: self.handler.clone(),
                            busy: busy.clone(),
                            completed: completed.clone(),
                            shutdown: self.shutdown.clone(),
                        };
                        tokio::spawn(async move {
                            if let Err(e) = session.serve(stream).await {
                                warn!(error = %e, "worker connection failed");
                            }
                        });
                    }
                    Some(Err(e)) => warn!(error = %e, "failed to accept connection"),
                    None => break,
                },
            }
        }

        let completed = completed.load(Ordering::SeqCst);
        info!(completed, "worker stopped");
        completed
    }
}

struct Session<H> {
    handler: Arc<H>,
    busy: Arc<Mutex<()>>,
    completed: Arc<AtomicUsize>,
    shutdown: CancellationToken,
}

impl<H: TaskHandler> Session<H> {
    async fn serve(self, stream: TcpStream) -> Result<(), RpcError> {
        let mut conn = framing::accept(stream);
        loop {
            let request = match framing::recv::<WorkerRequest>(&mut conn).await {
                Ok(request) => request,
                Err(RpcError::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(e),
            };

            let response = match request {
                WorkerRequest::DoTask(task) => {
                    let _running = self.busy.lock().await;
                    debug!(phase = %task.phase, task = task.index, "running task");
                    match self.handler.handle(&task).await {
                        Ok(()) => {
                            self.completed.fetch_add(1, Ordering::SeqCst);
                            WorkerResponse::TaskDone {
                                ok: true,
                                error: None,
                            }
                        }
                        Err(error) => {
                            warn!(phase = %task.phase, task = task.index, %error, "task failed");
                            WorkerResponse::TaskDone {
                                ok: false,
                                error: Some(error),
                            }
                        }
                    }
                }
                WorkerRequest::Shutdown => {
                    self.shutdown.cancel();
                    WorkerResponse::ShuttingDown
                }
            };

            framing::send(&mut conn, &response).await?;
        }
    }
}
