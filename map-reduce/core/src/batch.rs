// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::phase::Phase;
use crate::task::Task;

/// Immutable description of every task in one phase of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    phase: Phase,
    tasks: Vec<Task>,
    other_phase_count: usize,
}

impl Batch {
    /// Builds the batch for `phase`
    ///
    /// Map produces one task per input with `n_reduce` output partitions each.
    /// Reduce produces `n_reduce` tasks, each reading `map_inputs.len()` map
    /// outputs; the input locators themselves are ignored.
    pub fn new(job_name: &str, phase: Phase, map_inputs: &[String], n_reduce: usize) -> Self {
        let (tasks, other_phase_count) = match phase {
            Phase::Map => (
                map_inputs
                    .iter()
                    .enumerate()
                    .map(|(index, input)| Task::map(job_name, index, input, n_reduce))
                    .collect(),
                n_reduce,
            ),
            Phase::Reduce => (
                (0..n_reduce)
                    .map(|index| Task::reduce(job_name, index, map_inputs.len()))
                    .collect(),
                map_inputs.len(),
            ),
        };

        Self {
            phase,
            tasks,
            other_phase_count,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn other_phase_count(&self) -> usize {
        self.other_phase_count
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> Vec<String> {
        vec!["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()]
    }

    #[test]
    fn test_map_batch_has_one_task_per_input() {
        let batch = Batch::new("wc", Phase::Map, &inputs(), 2);

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.other_phase_count(), 2);
        for (i, task) in batch.tasks().iter().enumerate() {
            assert_eq!(task.index, i);
            assert_eq!(task.phase, Phase::Map);
            assert_eq!(task.other_phase_count, 2);
            assert_eq!(task.input.as_deref(), Some(inputs()[i].as_str()));
            assert_eq!(task.job_name, "wc");
        }
    }

    #[test]
    fn test_reduce_batch_has_one_task_per_partition() {
        let batch = Batch::new("wc", Phase::Reduce, &inputs(), 2);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.other_phase_count(), 3);
        for (i, task) in batch.tasks().iter().enumerate() {
            assert_eq!(task.index, i);
            assert_eq!(task.phase, Phase::Reduce);
            assert_eq!(task.other_phase_count, 3);
            assert!(task.input.is_none(), "Reduce tasks carry no input locator");
        }
    }

    #[test]
    fn test_empty_batches() {
        assert!(Batch::new("wc", Phase::Map, &[], 4).is_empty());
        assert!(Batch::new("wc", Phase::Reduce, &inputs(), 0).is_empty());
    }
}
