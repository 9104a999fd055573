// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::ClerkError;
use crate::get_operation::GetOperation;
use crate::operation::{Attempt, ShardOperation};
use crate::put_append_operation::PutAppendOperation;
use crate::random::Random;
use crate::rpc::PutAppendOp;
use crate::server_end::{Connector, ShardMaster};
use crate::shard::{ShardConfig, LATEST_CONFIG};
use crate::timer::Timer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const RETRY_INTERVAL: Duration = Duration::from_millis(300);

const CLIENT_ID_BOUND: i64 = 1 << 62;

/// Client of the sharded key/value service.
///
/// Every call keeps retrying until the group that owns the key accepts it,
/// refreshing the shard configuration between passes. Retries of one call
/// reuse its request id so servers can drop duplicates.
pub struct Clerk<M, C, T> {
    master: M,
    connector: C,
    timer: T,
    config: Mutex<ShardConfig>,
    client_id: i64,
    next_request: AtomicU64,
    retry_interval: Duration,
    cancellation_token: CancellationToken,
}

impl<M, C, T> Clerk<M, C, T>
where
    M: ShardMaster,
    C: Connector,
    T: Timer,
{
    pub fn new<R: Random>(master: M, connector: C, timer: T, random: &R) -> Self {
        Self {
            master,
            connector,
            timer,
            config: Mutex::new(ShardConfig::default()),
            client_id: random.i64(0..CLIENT_ID_BOUND),
            next_request: AtomicU64::new(0),
            retry_interval: RETRY_INTERVAL,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Gives up pending calls with ClerkError::Cancelled once the token fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    /// Last configuration fetched from the shard master
    pub async fn config(&self) -> ShardConfig {
        self.config.lock().await.clone()
    }

    /// Current value of `key`, empty when the key does not exist
    pub async fn get(&self, key: &str) -> Result<String, ClerkError> {
        let op = GetOperation::new(key, self.client_id, self.next_request_id());
        self.execute(op).await
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<(), ClerkError> {
        self.put_append(PutAppendOp::Put, key, value).await
    }

    pub async fn append(&self, key: &str, value: &str) -> Result<(), ClerkError> {
        self.put_append(PutAppendOp::Append, key, value).await
    }

    async fn put_append(&self, op: PutAppendOp, key: &str, value: &str) -> Result<(), ClerkError> {
        let op = PutAppendOperation::new(op, key, value, self.client_id, self.next_request_id());
        self.execute(op).await
    }

    fn next_request_id(&self) -> u64 {
        self.next_request.fetch_add(1, Ordering::SeqCst)
    }

    async fn execute<O: ShardOperation>(&self, op: O) -> Result<O::Output, ClerkError> {
        if self.config.lock().await.num == 0 {
            self.refresh_config().await;
        }

        let mut passes = 0u32;
        loop {
            if self.cancellation_token.is_cancelled() {
                return Err(self.cancelled(&op, passes));
            }

            let config = self.config().await;
            if let Some((gid, servers)) = config.servers_for(op.key()) {
                for server in servers {
                    let end = self.connector.connect(server);
                    match op.attempt(&end).await {
                        Attempt::Done(output) => {
                            debug!(op = op.name(), key = op.key(), server = %server, "accepted");
                            return Ok(output);
                        }
                        Attempt::WrongGroup => {
                            debug!(op = op.name(), key = op.key(), gid, "wrong group");
                            break;
                        }
                        Attempt::Retry => {
                            debug!(op = op.name(), key = op.key(), server = %server, "no usable reply");
                        }
                    }
                }
            }

            passes += 1;
            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    return Err(self.cancelled(&op, passes));
                }
                _ = self.timer.sleep(self.retry_interval) => {}
            }
            self.refresh_config().await;
        }
    }

    async fn refresh_config(&self) {
        let latest = self.master.query(LATEST_CONFIG).await;
        let mut config = self.config.lock().await;
        if latest.num != config.num {
            info!(client = self.client_id, from = config.num, to = latest.num, "shard configuration changed");
        }
        *config = latest;
    }

    fn cancelled<O: ShardOperation>(&self, op: &O, passes: u32) -> ClerkError {
        ClerkError::Cancelled {
            op: op.name(),
            key: op.key().to_string(),
            passes,
        }
    }
}
