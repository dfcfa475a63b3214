//! The [`Pipeline`] handle and its intermediate (stage-building) operations.
//!
//! A pipeline is an immutable chain of [`Stage`] descriptors anchored to a
//! source. Every intermediate call returns a *new* pipeline that references
//! the previous chain plus one stage, so two pipelines built from a shared
//! prefix evaluate independently:
//!
//! ```
//! use ironstream::*;
//!
//! let evens = from_vec((1..=10).collect::<Vec<i32>>()).filter(|x| x % 2 == 0);
//! let small = evens.limit(2);
//! let squares = evens.map(|x| x * x);
//!
//! assert_eq!(small.collect_vec().unwrap(), vec![2, 4]);
//! assert_eq!(squares.collect_vec().unwrap(), vec![4, 16, 36, 64, 100]);
//! ```
//!
//! A pipeline value is single-use: once a terminal operation has started on
//! it, every further terminal call on that value (or its clones, or the
//! handles returned by its runner switches) fails with
//! [`StreamError::AlreadyConsumed`].

use crate::error::{Result, StreamError};
use crate::node::{
    CompareFn, ExpandFn, Link, ObserveFn, PredicateFn, SeenSet, SourceNode, Stage, TransformFn,
};
use crate::planner::{ExecutionExplanation, Plan};
use crate::runner::{ExecMode, Runner};
use crate::type_token::{Item, downcast_ref};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// Bound for values flowing through a pipeline.
///
/// Elements must be cloneable (sources are re-traversable) and shareable
/// across worker threads for parallel evaluation.
pub trait Element: 'static + Send + Sync + Clone {}
impl<T> Element for T where T: 'static + Send + Sync + Clone {}

/// A lazy chain of transformations over elements of type `T`.
///
/// Cloning a pipeline yields another handle to the *same* pipeline value: the
/// clones share consumption state. Use the intermediate operations to branch.
pub struct Pipeline<T> {
    pub(crate) tail: Arc<Link>,
    pub(crate) runner: Runner,
    consumed: Arc<AtomicBool>,
    _t: PhantomData<T>,
}

impl<T> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            tail: Arc::clone(&self.tail),
            runner: self.runner,
            consumed: Arc::clone(&self.consumed),
            _t: PhantomData,
        }
    }
}

impl<T: Element> Pipeline<T> {
    pub(crate) fn from_source(source: SourceNode) -> Self {
        Self {
            tail: Arc::new(Link::Source(source)),
            runner: Runner::default(),
            consumed: Arc::new(AtomicBool::new(false)),
            _t: PhantomData,
        }
    }

    pub(crate) fn append<O: Element>(&self, stage: Stage) -> Pipeline<O> {
        Pipeline {
            tail: Arc::new(Link::Stage {
                upstream: Arc::clone(&self.tail),
                stage,
            }),
            runner: self.runner,
            consumed: Arc::new(AtomicBool::new(false)),
            _t: PhantomData,
        }
    }

    /// Same pipeline value under another runner; shares the consumed flag.
    fn with_mode(&self, runner: Runner) -> Self {
        Self {
            tail: Arc::clone(&self.tail),
            runner,
            consumed: Arc::clone(&self.consumed),
            _t: PhantomData,
        }
    }

    /// Mark this pipeline value consumed and linearize its chain for a run.
    pub(crate) fn begin_terminal(&self, op: &'static str) -> Result<Plan> {
        if self.consumed.swap(true, AtomicOrdering::SeqCst) {
            return Err(StreamError::AlreadyConsumed);
        }
        self.runner.validate()?;
        let plan = Plan::from_link(&self.tail);
        tracing::debug!(
            terminal = op,
            stages = plan.stages.len(),
            buffering = plan.stages.iter().filter(|s| s.is_buffering()).count(),
            mode = ?self.runner.mode,
            "starting evaluation"
        );
        Ok(plan)
    }

    /// `true` once a terminal operation has started on this pipeline value.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed.load(AtomicOrdering::SeqCst)
    }

    /// The runner configuration terminal operations will use.
    #[must_use]
    pub fn runner(&self) -> Runner {
        self.runner
    }

    /// Same chain, evaluated with `runner`.
    ///
    /// Switching the runner does not create a new pipeline value: the result
    /// shares consumption state with `self`, so a consumed pipeline cannot be
    /// re-run under another mode.
    #[must_use]
    pub fn with_runner(&self, runner: Runner) -> Self {
        self.with_mode(runner)
    }

    /// Same chain, evaluated single-threaded (the default).
    #[must_use]
    pub fn sequential(&self) -> Self {
        self.with_mode(Runner {
            mode: ExecMode::Sequential,
            ..self.runner
        })
    }

    /// Same chain, evaluated on the global worker pool with default partitioning.
    #[must_use]
    pub fn parallel(&self) -> Self {
        self.parallel_with(None, None)
    }

    /// Same chain, evaluated in parallel with an explicit thread and partition count.
    ///
    /// `threads: Some(n)` runs on a dedicated pool of `n` workers.
    #[must_use]
    pub fn parallel_with(&self, threads: Option<usize>, partitions: Option<usize>) -> Self {
        self.with_mode(Runner {
            mode: ExecMode::Parallel {
                threads,
                partitions,
            },
            ..self.runner
        })
    }

    /// Describe how this pipeline would be evaluated, without running it.
    #[must_use]
    pub fn explain(&self) -> ExecutionExplanation {
        Plan::from_link(&self.tail).explain(&self.runner)
    }

    /// Keep elements for which `pred` returns `true`.
    #[must_use]
    pub fn filter<F>(&self, pred: F) -> Pipeline<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.append(Stage::Filter(erase_predicate::<T, _>("filter", move |t| {
            Ok(pred(t))
        })))
    }

    /// Transform each element 1:1.
    #[must_use]
    pub fn map<O, F>(&self, f: F) -> Pipeline<O>
    where
        O: Element,
        F: Fn(&T) -> O + Send + Sync + 'static,
    {
        self.append(Stage::Map(erase_transform::<T, O, _>("map", move |t| Ok(f(t)))))
    }

    /// Expand each element into zero or more elements, in order.
    #[must_use]
    pub fn flat_map<O, I, F>(&self, f: F) -> Pipeline<O>
    where
        O: Element,
        I: IntoIterator<Item = O>,
        F: Fn(&T) -> I + Send + Sync + 'static,
    {
        self.append(Stage::FlatMap(erase_expand::<T, O, I, _>("flat_map", move |t| {
            Ok(f(t))
        })))
    }

    /// Stable sort by `cmp`. Buffers the entire upstream before emitting.
    #[must_use]
    pub fn sorted_by<C>(&self, cmp: C) -> Pipeline<T>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.append(Stage::Sorted(erase_comparator::<T, _>("sorted", move |a, b| {
            Ok(cmp(a, b))
        })))
    }

    /// Stable sort by a derived key.
    #[must_use]
    pub fn sorted_by_key<K, F>(&self, key: F) -> Pipeline<T>
    where
        K: Ord + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sorted_by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Drop elements equal (per `eq`) to one already emitted.
    ///
    /// Uses a linear scan over the retained elements; prefer
    /// [`distinct`](Pipeline::distinct) when `T: Eq + Hash`.
    #[must_use]
    pub fn distinct_by<E>(&self, eq: E) -> Pipeline<T>
    where
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let eq = Arc::new(eq);
        self.append(Stage::Distinct(Arc::new(move || {
            Box::new(ScanSeen {
                kept: Vec::new(),
                eq: Arc::clone(&eq),
            }) as Box<dyn SeenSet>
        })))
    }

    /// Emit at most the first `n` elements, then stop pulling from upstream.
    #[must_use]
    pub fn limit(&self, n: usize) -> Pipeline<T> {
        self.append(Stage::Limit(n))
    }

    /// Drop the first `n` elements.
    #[must_use]
    pub fn skip(&self, n: usize) -> Pipeline<T> {
        self.append(Stage::Skip(n))
    }

    /// Emit elements while `pred` holds; stop permanently at the first failure.
    #[must_use]
    pub fn take_while<F>(&self, pred: F) -> Pipeline<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.append(Stage::TakeWhile(erase_predicate::<T, _>(
            "take_while",
            move |t| Ok(pred(t)),
        )))
    }

    /// Drop elements while `pred` holds; emit the first failing element and everything after it.
    #[must_use]
    pub fn drop_while<F>(&self, pred: F) -> Pipeline<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.append(Stage::DropWhile(erase_predicate::<T, _>(
            "drop_while",
            move |t| Ok(pred(t)),
        )))
    }

    /// Observe each passing element without altering the sequence.
    #[must_use]
    pub fn peek<F>(&self, observer: F) -> Pipeline<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.append(Stage::Peek(erase_observer::<T, _>("peek", move |t| {
            observer(t);
            Ok(())
        })))
    }

    /// Emit all of `self`, then all of `other`.
    ///
    /// Like every intermediate operation this builds a new pipeline value and
    /// consumes neither input. Both stay usable as branches, and each later
    /// evaluation of them (or of the concatenation) runs their stages again,
    /// `peek` observers included. `other` is only opened once `self` is
    /// exhausted.
    #[must_use]
    pub fn concat(&self, other: &Pipeline<T>) -> Pipeline<T> {
        self.append(Stage::Concat(Arc::new(Plan::from_link(&other.tail))))
    }
}

impl<T: Element + Ord> Pipeline<T> {
    /// Stable sort in natural order.
    #[must_use]
    pub fn sorted(&self) -> Pipeline<T> {
        self.sorted_by(T::cmp)
    }
}

impl<T: Element + Eq + Hash> Pipeline<T> {
    /// Keep the first occurrence of each element. Buffers the entire upstream.
    #[must_use]
    pub fn distinct(&self) -> Pipeline<T> {
        self.append(Stage::Distinct(Arc::new(|| {
            Box::new(HashSeen::<T>(HashSet::new())) as Box<dyn SeenSet>
        })))
    }
}

/* ---------- typed -> erased adapters ---------- */

pub(crate) fn erase_predicate<T, F>(stage: &'static str, f: F) -> PredicateFn
where
    T: Element,
    F: Fn(&T) -> anyhow::Result<bool> + Send + Sync + 'static,
{
    Arc::new(move |item: &Item| {
        f(downcast_ref::<T>(item)?).map_err(|e| StreamError::failure(stage, e))
    })
}

pub(crate) fn erase_transform<T, O, F>(stage: &'static str, f: F) -> TransformFn
where
    T: Element,
    O: Element,
    F: Fn(&T) -> anyhow::Result<O> + Send + Sync + 'static,
{
    Arc::new(move |item: &Item| {
        let out = f(downcast_ref::<T>(item)?).map_err(|e| StreamError::failure(stage, e))?;
        Ok(Box::new(out) as Item)
    })
}

pub(crate) fn erase_expand<T, O, I, F>(stage: &'static str, f: F) -> ExpandFn
where
    T: Element,
    O: Element,
    I: IntoIterator<Item = O>,
    F: Fn(&T) -> anyhow::Result<I> + Send + Sync + 'static,
{
    Arc::new(move |item: &Item| {
        let out = f(downcast_ref::<T>(item)?).map_err(|e| StreamError::failure(stage, e))?;
        Ok(out.into_iter().map(|o| Box::new(o) as Item).collect())
    })
}

pub(crate) fn erase_observer<T, F>(stage: &'static str, f: F) -> ObserveFn
where
    T: Element,
    F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(move |item: &Item| {
        f(downcast_ref::<T>(item)?).map_err(|e| StreamError::failure(stage, e))
    })
}

pub(crate) fn erase_comparator<T, C>(stage: &'static str, cmp: C) -> CompareFn
where
    T: Element,
    C: Fn(&T, &T) -> anyhow::Result<Ordering> + Send + Sync + 'static,
{
    Arc::new(move |a: &Item, b: &Item| {
        cmp(downcast_ref::<T>(a)?, downcast_ref::<T>(b)?)
            .map_err(|e| StreamError::failure(stage, e))
    })
}

/* ---------- distinct membership ---------- */

struct HashSeen<T>(HashSet<T>);

impl<T: Element + Eq + Hash> SeenSet for HashSeen<T> {
    fn insert(&mut self, item: &Item) -> Result<bool> {
        let t = downcast_ref::<T>(item)?;
        if self.0.contains(t) {
            return Ok(false);
        }
        self.0.insert(t.clone());
        Ok(true)
    }
}

struct ScanSeen<T, E> {
    kept: Vec<T>,
    eq: Arc<E>,
}

impl<T, E> SeenSet for ScanSeen<T, E>
where
    T: Element,
    E: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    fn insert(&mut self, item: &Item) -> Result<bool> {
        let t = downcast_ref::<T>(item)?;
        if self.kept.iter().any(|k| (self.eq)(k, t)) {
            return Ok(false);
        }
        self.kept.push(t.clone());
        Ok(true)
    }
}
