// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod shard;
pub use shard::{key_to_shard, Gid, ShardConfig, LATEST_CONFIG, N_SHARDS};

mod rpc;
pub use rpc::{GetArgs, GetReply, KvErr, PutAppendArgs, PutAppendOp, PutAppendReply};

mod server_end;
pub use server_end::{Connector, ServerEnd, ShardMaster};

mod operation;
pub use operation::{Attempt, ShardOperation};

mod get_operation;
pub use get_operation::GetOperation;

mod put_append_operation;
pub use put_append_operation::PutAppendOperation;

mod error;
pub use error::ClerkError;

mod clerk;
pub use clerk::{Clerk, RETRY_INTERVAL};

pub mod random;
pub use random::{FastrandRandom, Random};

pub mod timer;
pub use timer::{Timer, TokioTimer};
