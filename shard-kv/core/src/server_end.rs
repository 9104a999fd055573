// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::rpc::{GetArgs, GetReply, PutAppendArgs, PutAppendReply};
use crate::shard::ShardConfig;
use async_trait::async_trait;

/// One replica of a group, as reached over the network
/// None means the request or its reply was lost
#[async_trait]
pub trait ServerEnd: Send + Sync {
    async fn get(&self, args: &GetArgs) -> Option<GetReply>;
    async fn put_append(&self, args: &PutAppendArgs) -> Option<PutAppendReply>;
}

/// Turns a server name from a configuration into an endpoint
pub trait Connector: Send + Sync {
    type End: ServerEnd;

    fn connect(&self, server: &str) -> Self::End;
}

#[async_trait]
pub trait ShardMaster: Send + Sync {
    /// Configuration number `num`, or the newest one for LATEST_CONFIG
    async fn query(&self, num: i64) -> ShardConfig;
}
