//! # Exponential backoff.
//!
//! The delay for step `n` is `first × factor^n`, clamped to `max`, then jittered.
//! The base is derived from the step number alone, so jitter output never feeds
//! back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(250),
//!     max: Duration::from_secs(2),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(250));
//! assert_eq!(backoff.next(2), Duration::from_secs(1));
//! assert_eq!(backoff.next(8), Duration::from_secs(2));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Delay growth between consecutive failed fetches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay at step 0.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 250ms`, `factor = 2.0`, `max = 30s`, `jitter = Equal`.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(250),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::Equal,
        }
    }
}

impl BackoffPolicy {
    /// A policy that never waits.
    pub fn none() -> Self {
        Self {
            first: Duration::ZERO,
            max: Duration::ZERO,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay for step `step` (0-indexed).
    ///
    /// Non-finite or negative intermediate values clamp to `max`.
    pub fn next(&self, step: u32) -> Duration {
        let exp = step.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(first_ms: u64, max_ms: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max: Duration::from_millis(max_ms),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn doubles_until_cap() {
        let p = exact(100, 1_000, 2.0);
        let got: Vec<_> = (0..6).map(|n| p.next(n).as_millis()).collect();
        assert_eq!(got, vec![100, 200, 400, 800, 1_000, 1_000]);
    }

    #[test]
    fn first_above_max_is_clamped() {
        assert_eq!(exact(10_000, 5_000, 2.0).next(0), Duration::from_secs(5));
    }

    #[test]
    fn overflow_clamps_to_max() {
        assert_eq!(exact(100, 10_000, 2.0).next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn none_never_waits() {
        let p = BackoffPolicy::none();
        assert_eq!(p.next(0), Duration::ZERO);
        assert_eq!(p.next(40), Duration::ZERO);
    }

    #[test]
    fn default_equal_jitter_stays_within_half_and_base() {
        let p = BackoffPolicy::default();
        for step in 0..12 {
            let base = (250.0 * 2.0f64.powi(step as i32)).min(30_000.0) as u64;
            let d = p.next(step);
            assert!(d >= Duration::from_millis(base / 2), "step {step}: {d:?}");
            assert!(d <= Duration::from_millis(base), "step {step}: {d:?}");
        }
    }

    #[test]
    fn decorrelated_respects_floor_and_cap() {
        let p = BackoffPolicy {
            jitter: JitterPolicy::Decorrelated,
            ..exact(100, 5_000, 2.0)
        };
        for _ in 0..50 {
            let d = p.next(6);
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_secs(5));
        }
    }
}
