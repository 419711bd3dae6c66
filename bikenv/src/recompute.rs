//! Recomputing distance indices that fail a sanity bound.
//!
//! This is a heuristic: a provider occasionally returns a network
//! that yields an absurd detour factor, and a fresh fetch usually
//! fixes it. Passing the bound says nothing about correctness.

use crate::BikenvError;
use log::warn;

/// Limits for accepting a distance index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexBounds {
    /// Largest plausible absolute index.
    pub max_abs: f64,

    /// Computations attempted before giving up (at least one is
    /// always made).
    pub max_attempts: u32,
}

impl Default for IndexBounds {
    fn default() -> Self {
        Self {
            max_abs: 10.0,
            max_attempts: 3,
        }
    }
}

impl IndexBounds {
    pub fn is_plausible(&self, index: f64) -> bool {
        index.is_finite() && index.abs() <= self.max_abs
    }
}

/// A plausible index along with whatever produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Plausible<T> {
    pub index: f64,
    pub attempts: u32,
    pub output: T,
}

/// Calls `compute(attempt)` until it returns a plausible index.
///
/// Errors from `compute` abort immediately. Running out of attempts
/// yields [`BikenvError::ImplausibleIndex`] with the last index seen.
pub fn recompute_until_plausible<T, F>(
    bounds: &IndexBounds,
    mut compute: F,
) -> Result<Plausible<T>, BikenvError>
where
    F: FnMut(u32) -> Result<(f64, T), BikenvError>,
{
    let max_attempts = bounds.max_attempts.max(1);
    let mut last = f64::NAN;
    for attempt in 1..=max_attempts {
        let (index, output) = compute(attempt)?;
        if bounds.is_plausible(index) {
            return Ok(Plausible {
                index,
                attempts: attempt,
                output,
            });
        }
        warn!(
            "implausible distance index; value: {index}, attempt: {attempt}/{max_attempts}, bound: {}",
            bounds.max_abs
        );
        last = index;
    }
    Err(BikenvError::ImplausibleIndex {
        value: last,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::{recompute_until_plausible, IndexBounds, Plausible};
    use crate::BikenvError;

    #[test]
    fn test_plausible_first_time() {
        let result = recompute_until_plausible(&IndexBounds::default(), |_| Ok((1.3, "a")));
        assert_eq!(
            result.unwrap(),
            Plausible {
                index: 1.3,
                attempts: 1,
                output: "a",
            }
        );
    }

    #[test]
    fn test_recovers_after_implausible() {
        let mut calls = 0;
        let result = recompute_until_plausible(&IndexBounds::default(), |attempt| {
            calls += 1;
            Ok((if attempt == 1 { 42.0 } else { 1.4 }, attempt))
        })
        .unwrap();
        assert_eq!(calls, 2);
        assert_eq!(result.index, 1.4);
        assert_eq!(result.output, 2);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let bounds = IndexBounds {
            max_abs: 10.0,
            max_attempts: 4,
        };
        let mut calls = 0;
        let err = recompute_until_plausible(&bounds, |_| {
            calls += 1;
            Ok((-11.0, ()))
        })
        .unwrap_err();
        assert_eq!(calls, 4);
        assert!(matches!(
            err,
            BikenvError::ImplausibleIndex {
                value,
                attempts: 4
            } if value == -11.0
        ));
    }

    #[test]
    fn test_errors_are_not_retried() {
        let mut calls = 0;
        let err = recompute_until_plausible::<(), _>(&IndexBounds::default(), |_| {
            calls += 1;
            Err(BikenvError::EmptyRegion)
        })
        .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, BikenvError::EmptyRegion));
    }

    #[test]
    fn test_bound_edges() {
        let bounds = IndexBounds::default();
        assert!(bounds.is_plausible(10.0));
        assert!(bounds.is_plausible(-10.0));
        assert!(!bounds.is_plausible(10.01));
        assert!(!bounds.is_plausible(f64::NAN));
        assert!(!bounds.is_plausible(f64::INFINITY));
    }

    #[test]
    fn test_zero_attempts_still_computes_once() {
        let bounds = IndexBounds {
            max_abs: 10.0,
            max_attempts: 0,
        };
        let result = recompute_until_plausible(&bounds, |_| Ok((2.0, ()))).unwrap();
        assert_eq!(result.attempts, 1);
    }
}
