//! Statistical collectors: `Summarizing`

use super::Collector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Count, sum, minimum, maximum and mean of a stream of integers.
///
/// The sum is accumulated as `i128` so it cannot overflow for any realistic
/// number of `i64` inputs. `min`/`max` are `None` for an empty input and the
/// mean of an empty input is `0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: u64,
    pub sum: i128,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl SummaryStatistics {
    /// Record one value.
    pub fn accept(&mut self, value: i64) {
        self.count += 1;
        self.sum += i128::from(value);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Fold another summary into this one.
    pub fn combine(&mut self, other: &SummaryStatistics) {
        self.count += other.count;
        self.sum += other.sum;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    /// Arithmetic mean, `0.0` when empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<i64>| v.map_or_else(|| "none".to_string(), |v| v.to_string());
        write!(
            f,
            "SummaryStatistics{{count={}, sum={}, min={}, average={:.6}, max={}}}",
            self.count,
            self.sum,
            show(self.min),
            self.mean(),
            show(self.max)
        )
    }
}

/* ===================== Summarizing<T> ===================== */

/// Summarize integer elements into [`SummaryStatistics`].
///
/// - Accumulator / output: `SummaryStatistics`
///
/// Requires `T: Copy + Into<i64>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Summarizing<T>(pub PhantomData<fn(T)>);

impl<T> Summarizing<T> {
    /// Convenience constructor (same as `Default`).
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Collector<T, SummaryStatistics, SummaryStatistics> for Summarizing<T>
where
    T: Copy + Into<i64>,
{
    fn create(&self) -> SummaryStatistics {
        SummaryStatistics::default()
    }

    fn add_input(&self, acc: &mut SummaryStatistics, value: T) {
        acc.accept(value.into());
    }

    fn merge(&self, acc: &mut SummaryStatistics, other: SummaryStatistics) {
        acc.combine(&other);
    }

    fn finish(&self, acc: SummaryStatistics) -> SummaryStatistics {
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_has_no_extremes() {
        let s = SummaryStatistics::default();
        assert_eq!(s.count, 0);
        assert_eq!(s.sum, 0);
        assert_eq!(s.min, None);
        assert_eq!(s.max, None);
        assert_eq!(s.mean(), 0.0);
    }

    #[test]
    fn combine_matches_sequential_accept() {
        let mut a = SummaryStatistics::default();
        let mut b = SummaryStatistics::default();
        let mut all = SummaryStatistics::default();
        for v in [5, -3, 9] {
            a.accept(v);
            all.accept(v);
        }
        for v in [12, 0] {
            b.accept(v);
            all.accept(v);
        }
        a.combine(&b);
        assert_eq!(a, all);
        assert_eq!(a.min, Some(-3));
        assert_eq!(a.max, Some(12));
    }

    #[test]
    fn sum_does_not_overflow_i64() {
        let mut s = SummaryStatistics::default();
        s.accept(i64::MAX);
        s.accept(i64::MAX);
        assert_eq!(s.sum, 2 * i128::from(i64::MAX));
    }
}
