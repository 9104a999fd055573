// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::RpcError;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Length-prefixed JSON messages over TCP
pub type Connection = Framed<TcpStream, LengthDelimitedCodec>;

pub async fn connect(addr: &str) -> Result<Connection, RpcError> {
    let stream = TcpStream::connect(addr).await?;
    Ok(Framed::new(stream, LengthDelimitedCodec::new()))
}

pub fn accept(stream: TcpStream) -> Connection {
    Framed::new(stream, LengthDelimitedCodec::new())
}

pub async fn send<T: Serialize>(conn: &mut Connection, message: &T) -> Result<(), RpcError> {
    let body = serde_json::to_vec(message)?;
    conn.send(Bytes::from(body)).await?;
    Ok(())
}

pub async fn recv<T: DeserializeOwned>(conn: &mut Connection) -> Result<T, RpcError> {
    match conn.next().await {
        Some(frame) => Ok(serde_json::from_slice(&frame?)?),
        None => Err(RpcError::ConnectionClosed),
    }
}

/// One request/reply exchange on a fresh connection, bounded by `timeout`
pub async fn call<Req, Resp>(addr: &str, request: &Req, timeout: Duration) -> Result<Resp, RpcError>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    tokio::time::timeout(timeout, async {
        let mut conn = connect(addr).await?;
        send(&mut conn, request).await?;
        recv(&mut conn).await
    })
    .await
    .map_err(|_| RpcError::Timeout(timeout))?
}
