// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("connection closed before a reply arrived")]
    ConnectionClosed,

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("registration with {master} failed after {attempts} attempts: {last}")]
    RegistrationFailed {
        master: String,
        attempts: u32,
        #[source]
        last: Box<RpcError>,
    },
}
