//! # Registered-but-unfinished tasks.
//!
//! The supervisor marks a task alive when it is registered and finished when its
//! run returns (or panics). After a drain timeout, [`AliveTracker::snapshot`]
//! names the tasks that are still running so the leak can be logged.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Count of running instances per task name.
#[derive(Debug, Default)]
pub(crate) struct AliveTracker {
    state: Mutex<BTreeMap<String, usize>>,
}

impl AliveTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks one instance of `name` alive; the returned guard marks it finished on drop.
    pub(crate) fn enter(self: &Arc<Self>, name: &str) -> AliveGuard {
        *self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default() += 1;
        AliveGuard {
            tracker: Arc::clone(self),
            name: name.to_string(),
        }
    }

    fn leave(&self, name: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(n) = state.get_mut(name) {
            *n -= 1;
            if *n == 0 {
                state.remove(name);
            }
        }
    }

    /// Sorted names of running tasks; a name registered twice appears twice.
    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .flat_map(|(name, n)| std::iter::repeat_n(name.clone(), *n))
            .collect()
    }
}

/// Marks a task instance finished when dropped.
#[derive(Debug)]
pub(crate) struct AliveGuard {
    tracker: Arc<AliveTracker>,
    name: String,
}

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.tracker.leave(&self.name);
    }
}
