// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::operation::{Attempt, ShardOperation};
use crate::rpc::{GetArgs, KvErr};
use crate::server_end::ServerEnd;
use async_trait::async_trait;

pub struct GetOperation {
    args: GetArgs,
}

impl GetOperation {
    pub fn new(key: &str, client_id: i64, request_id: u64) -> Self {
        Self {
            args: GetArgs {
                key: key.to_string(),
                client_id,
                request_id,
            },
        }
    }

    pub fn args(&self) -> &GetArgs {
        &self.args
    }
}

#[async_trait]
impl ShardOperation for GetOperation {
    type Output = String;

    fn name(&self) -> &'static str {
        "GET"
    }

    fn key(&self) -> &str {
        &self.args.key
    }

    async fn attempt<E: ServerEnd>(&self, end: &E) -> Attempt<String> {
        match end.get(&self.args).await {
            Some(reply) if reply.err == KvErr::WrongGroup => Attempt::WrongGroup,
            Some(reply) if reply.wrong_leader => Attempt::Retry,
            Some(reply) => match reply.err {
                KvErr::Ok => Attempt::Done(reply.value),
                KvErr::NoKey => Attempt::Done(String::new()),
                _ => Attempt::Retry,
            },
            None => Attempt::Retry,
        }
    }
}
