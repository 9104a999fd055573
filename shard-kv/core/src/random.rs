// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::ops::Range;

pub trait Random: Send + Sync {
    fn i64(&self, range: Range<i64>) -> i64;
}

pub struct FastrandRandom;

impl Random for FastrandRandom {
    fn i64(&self, range: Range<i64>) -> i64 {
        fastrand::i64(range)
    }
}
