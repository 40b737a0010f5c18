//! # Aggregated task outcome.
//!
//! Every registered task reports its result here from its own tokio task, so
//! the fold is guarded by a mutex. [`Outcome::snapshot`] sorts failures into a
//! canonical order, which makes the fold commutative: the same set of task
//! results gives the same aggregate regardless of completion order.

use std::sync::{Mutex, PoisonError};

use crate::error::{Failures, RuntimeError, TaskError, TaskFailure};

/// Thread-safe collector of task failures.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    failures: Mutex<Vec<TaskFailure>>,
}

impl Outcome {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Folds one task result. `Ok` and `Canceled` contribute nothing.
    pub(crate) fn record(&self, task: &str, res: Result<(), TaskError>) {
        match res {
            Ok(()) | Err(TaskError::Canceled) => {}
            Err(error) => self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(TaskFailure {
                    task: task.to_string(),
                    error,
                }),
        }
    }

    /// Returns the aggregate folded so far.
    pub(crate) fn snapshot(&self) -> Result<(), RuntimeError> {
        let items = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if items.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::TaskFailures(Failures::from_unordered(items)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn successes_and_cancellations_fold_to_ok() {
        let o = Outcome::new();
        o.record("a", Ok(()));
        o.record("b", Err(TaskError::Canceled));
        assert_eq!(o.snapshot(), Ok(()));
    }

    #[test]
    fn one_error_among_successes_is_kept_alone() {
        let o = Outcome::new();
        o.record("ok", Ok(()));
        o.record("bad", Err(TaskError::fail("boom")));
        let err = o.snapshot().unwrap_err();
        let failures = err.failures();
        assert_eq!(failures.len(), 1);
        let only = failures.iter().next().unwrap();
        assert_eq!(only.task, "bad");
        assert_eq!(only.error, TaskError::fail("boom"));
    }

    #[test]
    fn concurrent_records_are_all_kept_in_canonical_order() {
        let o = Arc::new(Outcome::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let o = Arc::clone(&o);
                std::thread::spawn(move || o.record(&format!("t{i:02}"), Err(TaskError::fail(i))))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let err = o.snapshot().unwrap_err();
        let names: Vec<_> = err.failures().iter().map(|f| f.task.clone()).collect();
        let expected: Vec<_> = (0..16).map(|i| format!("t{i:02}")).collect();
        assert_eq!(names, expected);
    }
}
