// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::RpcError;
use crate::framing;
use crate::rpc::{MasterRequest, MasterResponse};
use futures::StreamExt;
use map_reduce_core::WorkerStream;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Master endpoint where workers announce themselves
/// Every registered address is offered onto the worker stream
pub struct RegistrationServer {
    listener: TcpListener,
    registered: RegisteredWorkers,
}

/// Every address that ever registered, whether or not it is still schedulable
#[derive(Debug, Clone, Default)]
pub struct RegisteredWorkers {
    addresses: Arc<Mutex<Vec<String>>>,
}

impl RegisteredWorkers {
    async fn record(&self, address: &str) {
        let mut addresses = self.addresses.lock().await;
        if !addresses.iter().any(|known| known == address) {
            addresses.push(address.to_string());
        }
    }

    /// Addresses in registration order
    pub async fn addresses(&self) -> Vec<String> {
        self.addresses.lock().await.clone()
    }
}

impl RegistrationServer {
    pub async fn bind(addr: &str) -> Result<Self, RpcError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            registered: RegisteredWorkers::default(),
        })
    }

    pub fn registered(&self) -> RegisteredWorkers {
        self.registered.clone()
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RpcError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts registrations until cancelled
    pub async fn run<S>(self, workers: S, cancellation_token: CancellationToken)
    where
        S: WorkerStream<String>,
    {
        let mut incoming = TcpListenerStream::new(self.listener);
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => break,
                next = incoming.next() => match next {
                    Some(Ok(stream)) => {
                        let workers = workers.clone();
                        let registered = self.registered.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_registration(stream, workers, registered).await {
                                warn!(error = %e, "registration failed");
                            }
                        });
                    }
                    Some(Err(e)) => warn!(error = %e, "failed to accept registration"),
                    None => break,
                },
            }
        }
        info!("registration server stopped");
    }
}

async fn handle_registration<S>(
    stream: TcpStream,
    workers: S,
    registered: RegisteredWorkers,
) -> Result<(), RpcError>
where
    S: WorkerStream<String>,
{
    let mut conn = framing::accept(stream);
    match framing::recv::<MasterRequest>(&mut conn).await? {
        MasterRequest::Register { address } => {
            info!(worker = %address, "worker registered");
            registered.record(&address).await;
            workers.offer(address);
            framing::send(&mut conn, &MasterResponse::Registered).await
        }
    }
}
