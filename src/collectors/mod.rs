//! Collectors: reusable reductions for [`Pipeline::collect_with`](crate::Pipeline::collect_with).
//!
//! A [`Collector`] folds elements into an accumulator and finishes it into an
//! output value. During parallel evaluation each partition gets its own
//! accumulator (`create` + `add_input`), and the runner merges accumulators
//! **in partition order**, so order-sensitive collectors such as [`ToVec`] or
//! [`GroupingBy`] preserve encounter order.
//!
//! Built-in collectors:
//!
//! - [`ToVec`] -- all elements, in order.
//! - [`Counting`] -- number of elements.
//! - [`GroupingBy`] -- `HashMap<K, Vec<T>>` keyed by a classifier.
//! - [`PartitioningBy`] -- `HashMap<bool, Vec<T>>` with both keys present.
//! - [`Summarizing`] -- [`SummaryStatistics`] over integer elements.
//!
//! # Example
//! ```
//! use ironstream::*;
//!
//! let groups = from_vec(vec!["apple", "avocado", "banana"])
//!     .collect_with(GroupingBy::new(|s: &&str| s.chars().next()))
//!     .unwrap();
//! assert_eq!(groups[&Some('a')], vec!["apple", "avocado"]);
//! ```

mod basic;
mod grouping;
mod statistics;

pub use basic::{Counting, ToVec};
pub use grouping::{GroupingBy, PartitioningBy};
pub use statistics::{Summarizing, SummaryStatistics};

/// A mutable reduction from elements `T` through accumulator `A` to output `O`.
///
/// `merge` must combine two accumulators as if the elements of `other` had
/// been added after those already in `acc`.
pub trait Collector<T, A, O>: Send + Sync {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, value: T);
    fn merge(&self, acc: &mut A, other: A);
    fn finish(&self, acc: A) -> O;
}
