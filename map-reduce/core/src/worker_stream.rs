// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Address of a remote worker as seen by the scheduler
///
/// The scheduler only ever holds a handle between pulling it from the stream
/// and either offering it back or dropping it.
pub trait WorkerHandle: Clone + fmt::Display + Send + Sync + 'static {}

impl<T> WorkerHandle for T where T: Clone + fmt::Display + Send + Sync + 'static {}

/// Unbounded multi-producer/multi-consumer source of available workers
///
/// Fed by the registration mechanism and by the scheduler itself when a
/// worker finishes a task. No ordering among available workers is implied.
#[async_trait]
pub trait WorkerStream<W: Send + 'static>: Clone + Send + Sync + 'static {
    /// Waits until a worker is available
    /// Returns None once the stream has been closed and drained
    async fn next(&self) -> Option<W>;

    /// Makes a worker available, never blocks
    fn offer(&self, worker: W);
}

/// Worker stream backed by a tokio unbounded channel
///
/// Consumers queue fairly on the receiver. The stream holds its own sender, so
/// it only ends when `close` is called.
pub struct ChannelWorkerStream<W> {
    tx: mpsc::UnboundedSender<W>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<W>>>,
    closed: CancellationToken,
}

impl<W> ChannelWorkerStream<W> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            closed: CancellationToken::new(),
        }
    }

    /// Creates a stream pre-loaded with already registered workers
    pub fn with_workers(workers: impl IntoIterator<Item = W>) -> Self {
        let stream = Self::new();
        for worker in workers {
            let _ = stream.tx.send(worker);
        }
        stream
    }

    /// Ends the stream, pending and future consumers receive None
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl<W> Default for ChannelWorkerStream<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Clone for ChannelWorkerStream<W> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
            closed: self.closed.clone(),
        }
    }
}

#[async_trait]
impl<W: Send + 'static> WorkerStream<W> for ChannelWorkerStream<W> {
    async fn next(&self) -> Option<W> {
        let mut rx = tokio::select! {
            _ = self.closed.cancelled() => return None,
            rx = self.rx.lock() => rx,
        };

        tokio::select! {
            _ = self.closed.cancelled() => None,
            worker = rx.recv() => worker,
        }
    }

    fn offer(&self, worker: W) {
        if self.closed.is_cancelled() {
            return;
        }
        // The receiver lives as long as any clone of the stream
        let _ = self.tx.send(worker);
    }
}
