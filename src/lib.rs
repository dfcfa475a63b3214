//! # ironstream
//!
//! A **lazy, single-use data pipeline** library for Rust. Build a chain of
//! transformations over an in-memory sequence, then run it once with a
//! terminal operation, sequentially or in parallel.
//!
//! ## Key Features
//!
//! - **Lazy evaluation** - nothing runs until a terminal operation is invoked
//! - **Pull-based traversal** - `limit`, `take_while`, `find_first` and the
//!   `*_match` terminals stop pulling as soon as the answer is known
//! - **Stateless and stateful stages** - map, filter, flat_map, peek, sorted,
//!   distinct, limit, skip, take_while, drop_while, concat
//! - **Collectors** - to-vec, counting, grouping, partitioning and summary
//!   statistics, plus custom collectors via the [`Collector`] trait
//! - **Sequential and parallel execution** - same results, in the same order,
//!   for every order-sensitive operation
//! - **Fallible stages** - `try_*` variants propagate caller errors as
//!   [`StreamError::OperationFailure`]
//!
//! ## Quick Start
//!
//! ```
//! use ironstream::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let words = from_vec(vec!["apple", "bob", "cat", "avocado", "banana"]);
//!
//! let a_words = words
//!     .filter(|w| w.starts_with('a'))
//!     .map(|w| w.to_uppercase())
//!     .sorted()
//!     .collect_vec()?;
//!
//! assert_eq!(a_words, vec!["APPLE", "AVOCADO"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Pipeline
//!
//! A [`Pipeline<T>`] is an immutable description of work: a source plus an
//! ordered chain of stages. Intermediate operations return a new pipeline and
//! leave the original untouched, so a shared prefix can be branched.
//!
//! A pipeline *value* is single-use. The first terminal operation consumes it;
//! any further terminal call on that value returns
//! [`StreamError::AlreadyConsumed`].
//!
//! ### Stages
//!
//! #### Element-wise
//! - [`filter`](Pipeline::filter), [`map`](Pipeline::map),
//!   [`flat_map`](Pipeline::flat_map), [`peek`](Pipeline::peek)
//!
//! #### Order-sensitive
//! - [`sorted`](Pipeline::sorted) / [`sorted_by`](Pipeline::sorted_by) - stable, buffers the upstream
//! - [`distinct`](Pipeline::distinct) / [`distinct_by`](Pipeline::distinct_by) - keeps first occurrences
//! - [`limit`](Pipeline::limit), [`skip`](Pipeline::skip)
//! - [`take_while`](Pipeline::take_while), [`drop_while`](Pipeline::drop_while)
//! - [`concat`](Pipeline::concat)
//!
//! ### Terminals
//!
//! - Collection: [`collect_vec`](Pipeline::collect_vec), [`to_array`](Pipeline::to_array),
//!   [`collect_with`](Pipeline::collect_with), [`grouping_by`](Pipeline::grouping_by),
//!   [`partitioning_by`](Pipeline::partitioning_by)
//! - Reduction: [`reduce`](Pipeline::reduce), [`reduce_with`](Pipeline::reduce_with),
//!   [`count`](Pipeline::count), [`min`](Pipeline::min), [`max`](Pipeline::max),
//!   [`summary_statistics`](Pipeline::summary_statistics)
//! - Search: [`any_match`](Pipeline::any_match), [`all_match`](Pipeline::all_match),
//!   [`none_match`](Pipeline::none_match), [`find_first`](Pipeline::find_first),
//!   [`find_any`](Pipeline::find_any)
//! - Side effects: [`for_each`](Pipeline::for_each), [`for_each_ordered`](Pipeline::for_each_ordered)
//!
//! ### Execution Modes
//!
//! ```
//! use ironstream::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let total = from_iter(1..=1_000i64)
//!     .parallel_with(Some(4), Some(8))
//!     .map(|x| x * x)
//!     .reduce_with(0, |a, b| a + b)?;
//! assert_eq!(total, 333_833_500);
//! # Ok(())
//! # }
//! ```
//!
//! The default is sequential. A [`Runner`] can also be loaded from JSON with
//! [`Runner::from_json`] and attached with [`with_runner`](Pipeline::with_runner).
//! [`explain`](Pipeline::explain) shows which stages run per partition and
//! where the barrier sits.
//!
//! ## Logging
//!
//! Evaluation emits `tracing` events at `debug` (terminal start, partitioning)
//! and `trace` (buffering stages). Install any `tracing` subscriber to see them.
//!
//! ## Module Overview
//!
//! - [`pipeline`] - the `Pipeline` handle and intermediate operations
//! - [`source`] - pipeline entry points
//! - [`terminal`] - terminal operations
//! - [`collectors`] - the `Collector` trait and built-in collectors
//! - [`ordering`] - comparator combinators
//! - [`runner`] - execution engine (sequential and parallel modes)
//! - [`planner`] - plan linearization and `explain`
//! - [`helpers`] - fallible stage variants and sorted collection
//! - [`testing`] - assertions and fixtures for pipeline tests

pub mod collectors;
pub(crate) mod cursor;
pub mod error;
pub mod helpers;
pub(crate) mod node;
pub mod ordering;
pub mod pipeline;
pub mod planner;
pub mod runner;
pub mod source;
pub mod terminal;
pub mod testing;
pub mod type_token;

// General re-exports
pub use collectors::{
    Collector, Counting, GroupingBy, PartitioningBy, Summarizing, SummaryStatistics, ToVec,
};
pub use error::{Result, StreamError};
pub use pipeline::{Element, Pipeline};
pub use planner::{ExecutionExplanation, ExplainStep};
pub use runner::{ExecMode, Runner};
pub use source::{concat, empty, from_iter, from_vec};
