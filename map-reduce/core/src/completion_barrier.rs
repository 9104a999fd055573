// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Latch that opens once every task of a phase has completed
///
/// Each task index counts at most once, no matter how often it is reported.
pub struct CompletionBarrier {
    completed: Vec<AtomicBool>,
    remaining: watch::Sender<usize>,
}

impl CompletionBarrier {
    pub fn new(tasks: usize) -> Self {
        let (remaining, _) = watch::channel(tasks);
        Self {
            completed: (0..tasks).map(|_| AtomicBool::new(false)).collect(),
            remaining,
        }
    }

    /// Marks `index` done
    /// Returns false if the index was already done or is out of range
    pub fn complete(&self, index: usize) -> bool {
        let Some(flag) = self.completed.get(index) else {
            return false;
        };
        if flag.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.remaining.send_modify(|remaining| *remaining -= 1);
        true
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.borrow()
    }

    /// Waits until no task is outstanding
    pub async fn wait(&self) {
        let mut rx = self.remaining.subscribe();
        // The sender lives in self, so the channel cannot close here
        let _ = rx.wait_for(|remaining| *remaining == 0).await;
    }
}
