// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::simulated_invoker::SimulatedWorker;
use map_reduce_core::WorkerStream;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Simulates workers joining the cluster over time
pub struct RegistrationFeed {
    next_id: usize,
    interval: Duration,
    limit: Option<usize>,
}

impl RegistrationFeed {
    /// New workers get ids starting at `first_id`, one per `interval`
    pub fn new(first_id: usize, interval: Duration) -> Self {
        Self {
            next_id: first_id,
            interval,
            limit: None,
        }
    }

    /// Stops after `limit` registrations instead of running until cancelled
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Offers the initial workers immediately and spawns the live feed
    pub fn start<S>(
        mut self,
        stream: S,
        initial_workers: usize,
        cancellation_token: CancellationToken,
    ) -> JoinHandle<usize>
    where
        S: WorkerStream<SimulatedWorker>,
    {
        for _ in 0..initial_workers {
            stream.offer(self.allocate());
        }
        info!(initial_workers, "registered initial workers");

        tokio::spawn(async move {
            let mut registered = 0;
            while self.limit.map_or(true, |limit| registered < limit) {
                tokio::select! {
                    _ = cancellation_token.cancelled() => break,
                    _ = tokio::time::sleep(self.interval) => {
                        let worker = self.allocate();
                        info!(%worker, "worker registered");
                        stream.offer(worker);
                        registered += 1;
                    }
                }
            }
            registered
        })
    }

    fn allocate(&mut self) -> SimulatedWorker {
        let worker = SimulatedWorker(self.next_id);
        self.next_id += 1;
        worker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_reduce_core::ChannelWorkerStream;

    #[tokio::test]
    async fn test_initial_then_live_registrations() {
        let stream = ChannelWorkerStream::new();
        let token = CancellationToken::new();

        let feed = RegistrationFeed::new(0, Duration::from_millis(5))
            .with_limit(2)
            .start(stream.clone(), 3, token);

        assert_eq!(feed.await.unwrap(), 2);

        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(stream.next().await.unwrap());
        }
        seen.sort();
        assert_eq!(seen, (0..5).map(SimulatedWorker).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_feed_stops_on_cancel() {
        let stream = ChannelWorkerStream::new();
        let token = CancellationToken::new();

        let feed = RegistrationFeed::new(10, Duration::from_secs(60)).start(
            stream.clone(),
            0,
            token.clone(),
        );
        token.cancel();

        assert_eq!(feed.await.unwrap(), 0);
    }
}
