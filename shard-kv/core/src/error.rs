// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClerkError {
    #[error("{op} on key '{key}' cancelled after {passes} passes")]
    Cancelled {
        op: &'static str,
        key: String,
        passes: u32,
    },
}
