// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::batch::Batch;
use crate::error::DispatchError;
use crate::summary::PhaseSummary;

/// Trait for executing a phase (map or reduce) with fault tolerance
/// This abstracts the entire work distribution pattern:
/// - Pulling available workers
/// - Retrying failed tasks on other workers
/// - Returning finished workers for reuse
/// - Waiting until every task has succeeded
pub trait PhaseExecutor: Send + Sync {
    /// Execute every task of the batch
    /// Resolves only once each task has succeeded exactly once
    fn execute(
        &self,
        batch: Batch,
    ) -> impl std::future::Future<Output = Result<PhaseSummary, DispatchError>> + Send;
}
