// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::RpcError;
use crate::framing;
use crate::registration_server::{RegisteredWorkers, RegistrationServer};
use crate::rpc::{WorkerRequest, WorkerResponse};
use crate::rpc_invoker::RpcInvoker;
use futures::future::join_all;
use map_reduce_core::{
    ChannelWorkerStream, DispatchError, JobConfig, JobSummary, Orchestrator, Scheduler,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

type RpcScheduler = Scheduler<String, ChannelWorkerStream<String>, RpcInvoker>;

/// Registration endpoint plus scheduler over registered workers
pub struct Master {
    address: SocketAddr,
    workers: ChannelWorkerStream<String>,
    registered: RegisteredWorkers,
    orchestrator: Orchestrator<RpcScheduler>,
    registration_token: CancellationToken,
    registration: JoinHandle<()>,
    invoke_timeout: Duration,
}

impl Master {
    pub async fn start(listen: &str, invoke_timeout: Duration) -> Result<Self, RpcError> {
        let server = RegistrationServer::bind(listen).await?;
        let address = server.local_addr()?;
        let workers = ChannelWorkerStream::new();
        let registration_token = CancellationToken::new();
        let registered = server.registered();

        let registration = tokio::spawn(server.run(workers.clone(), registration_token.clone()));
        info!(%address, "master listening for workers");

        let scheduler = Scheduler::new(workers.clone(), RpcInvoker::new(invoke_timeout));
        Ok(Self {
            address,
            workers,
            registered,
            orchestrator: Orchestrator::new(scheduler),
            registration_token,
            registration,
            invoke_timeout,
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Cancels a running job
    pub fn cancellation_token(&self) -> CancellationToken {
        self.orchestrator.executor().cancellation_token()
    }

    pub async fn run_job(&self, job: &JobConfig) -> Result<JobSummary, DispatchError> {
        self.orchestrator.run(job).await
    }

    /// Stops accepting registrations and tells every registered worker to exit
    ///
    /// Workers dropped after a failure are contacted too; unreachable ones
    /// are skipped. Returns how many workers acknowledged the shutdown.
    pub async fn shutdown(self) -> usize {
        self.registration_token.cancel();
        let _ = self.registration.await;
        self.workers.close();

        let addresses = self.registered.addresses().await;
        let timeout = self.invoke_timeout;
        let replies = join_all(addresses.iter().map(|worker| async move {
            let reply =
                framing::call::<_, WorkerResponse>(worker, &WorkerRequest::Shutdown, timeout)
                    .await;
            match reply {
                Ok(WorkerResponse::ShuttingDown) => true,
                Ok(other) => {
                    debug!(%worker, ?other, "unexpected shutdown reply");
                    false
                }
                Err(e) => {
                    debug!(%worker, error = %e, "worker did not acknowledge shutdown");
                    false
                }
            }
        }))
        .await;
        let stopped = replies.into_iter().filter(|acknowledged| *acknowledged).count();

        info!(stopped, registered = addresses.len(), "master shut down");
        stopped
    }
}
