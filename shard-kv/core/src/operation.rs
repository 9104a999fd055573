// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::server_end::ServerEnd;
use async_trait::async_trait;

/// Result of sending one request to one server
#[derive(Debug, PartialEq, Eq)]
pub enum Attempt<T> {
    Done(T),
    /// The group no longer owns the shard, skip its other servers
    WrongGroup,
    /// Lost, wrong leader, or otherwise unusable reply
    Retry,
}

/// A client request that is retried against shard owners until it lands
#[async_trait]
pub trait ShardOperation: Send + Sync {
    type Output: Send;

    fn name(&self) -> &'static str;

    fn key(&self) -> &str;

    async fn attempt<E: ServerEnd>(&self, end: &E) -> Attempt<Self::Output>;
}
