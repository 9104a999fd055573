// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::operation::{Attempt, ShardOperation};
use crate::rpc::{KvErr, PutAppendArgs, PutAppendOp};
use crate::server_end::ServerEnd;
use async_trait::async_trait;

pub struct PutAppendOperation {
    args: PutAppendArgs,
}

impl PutAppendOperation {
    pub fn new(op: PutAppendOp, key: &str, value: &str, client_id: i64, request_id: u64) -> Self {
        Self {
            args: PutAppendArgs {
                key: key.to_string(),
                value: value.to_string(),
                op,
                client_id,
                request_id,
            },
        }
    }

    pub fn args(&self) -> &PutAppendArgs {
        &self.args
    }
}

#[async_trait]
impl ShardOperation for PutAppendOperation {
    type Output = ();

    fn name(&self) -> &'static str {
        self.args.op.name()
    }

    fn key(&self) -> &str {
        &self.args.key
    }

    async fn attempt<E: ServerEnd>(&self, end: &E) -> Attempt<()> {
        match end.put_append(&self.args).await {
            Some(reply) if reply.err == KvErr::WrongGroup => Attempt::WrongGroup,
            Some(reply) if reply.wrong_leader => Attempt::Retry,
            // Outdated: an earlier try with this request id was applied
            Some(reply) => match reply.err {
                KvErr::Ok | KvErr::Outdated => Attempt::Done(()),
                _ => Attempt::Retry,
            },
            None => Attempt::Retry,
        }
    }
}
