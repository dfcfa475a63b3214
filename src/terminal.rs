//! Terminal operations: trigger evaluation and shape the result.
//!
//! Every terminal marks its pipeline value consumed before pulling the first
//! element. Short-circuiting terminals (`any_match`, `all_match`,
//! `none_match`, `find_first`, `find_any`) stop pulling as soon as the answer
//! is known and, in parallel mode, cancel partitions that have not started.

use crate::collectors::{
    Collector, Counting, GroupingBy, PartitioningBy, Summarizing, SummaryStatistics, ToVec,
};
use crate::cursor::{self, Cursor};
use crate::error::Result;
use crate::pipeline::{Element, Pipeline};
use crate::runner::{Cancellation, ExecMode};
use crate::type_token::downcast;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Pull the next typed element unless this partition has been cancelled.
fn next_typed<T: Element>(
    idx: usize,
    cursor: &mut dyn Cursor,
    cancel: &Cancellation,
) -> Result<Option<T>> {
    if cancel.is_stopped(idx) {
        return Ok(None);
    }
    cursor.next()?.map(downcast::<T>).transpose()
}

impl<T: Element> Pipeline<T> {
    /// Fold every element through `collector`.
    ///
    /// In parallel mode each partition is folded separately and the
    /// accumulators are merged in partition order.
    pub fn collect_with<C, A, O>(&self, collector: C) -> Result<O>
    where
        C: Collector<T, A, O>,
        A: Send,
    {
        self.collect_as("collect", collector)
    }

    /// [`collect_with`](Pipeline::collect_with) under the name of the terminal that asked for it.
    pub(crate) fn collect_as<C, A, O>(&self, op: &'static str, collector: C) -> Result<O>
    where
        C: Collector<T, A, O>,
        A: Send,
    {
        let plan = self.begin_terminal(op)?;
        let accs = self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            let mut acc = collector.create();
            while let Some(t) = next_typed::<T>(idx, cursor, cancel)? {
                collector.add_input(&mut acc, t);
            }
            Ok(acc)
        })?;
        let mut accs = accs.into_iter();
        let mut acc = accs.next().unwrap_or_else(|| collector.create());
        for other in accs {
            collector.merge(&mut acc, other);
        }
        Ok(collector.finish(acc))
    }

    /// Materialize every element into a `Vec`, in pipeline order.
    pub fn collect_vec(&self) -> Result<Vec<T>> {
        self.collect_with(ToVec)
    }

    /// Materialize into a fixed-length slice, in pipeline order.
    pub fn to_array(&self) -> Result<Box<[T]>> {
        Ok(self.collect_as("to_array", ToVec)?.into_boxed_slice())
    }

    /// Number of elements that survive every stage. Always drains the pipeline.
    pub fn count(&self) -> Result<u64> {
        self.collect_as("count", Counting)
    }

    /// Left-fold with `combine`; `None` for an empty pipeline.
    ///
    /// In parallel mode `combine` must be associative.
    pub fn reduce<F>(&self, combine: F) -> Result<Option<T>>
    where
        F: Fn(T, T) -> T + Send + Sync,
    {
        let plan = self.begin_terminal("reduce")?;
        let partials = self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            fold_partition(idx, cursor, cancel, None, &combine)
        })?;
        Ok(partials.into_iter().flatten().reduce(&combine))
    }

    /// Left-fold starting from `identity`; returns `identity` for an empty pipeline.
    ///
    /// In parallel mode `combine` must be associative and `identity` a true
    /// identity for it.
    pub fn reduce_with<F>(&self, identity: T, combine: F) -> Result<T>
    where
        F: Fn(T, T) -> T + Send + Sync,
    {
        let plan = self.begin_terminal("reduce")?;
        let partials = self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            // Only the first partition starts from the identity.
            let init = (idx == 0).then(|| identity.clone());
            fold_partition(idx, cursor, cancel, init, &combine)
        })?;
        Ok(partials
            .into_iter()
            .flatten()
            .reduce(&combine)
            .unwrap_or(identity))
    }

    /// Smallest element per `cmp`; ties keep the first encountered.
    pub fn min_by<C>(&self, cmp: C) -> Result<Option<T>>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        self.extreme("min", move |cand, cur| cmp(cand, cur) == Ordering::Less)
    }

    /// Largest element per `cmp`; ties keep the first encountered.
    pub fn max_by<C>(&self, cmp: C) -> Result<Option<T>>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        self.extreme("max", move |cand, cur| cmp(cand, cur) == Ordering::Greater)
    }

    /// Smallest element by a derived key; ties keep the first encountered.
    pub fn min_by_key<K, F>(&self, key: F) -> Result<Option<T>>
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync,
    {
        self.min_by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Largest element by a derived key; ties keep the first encountered.
    pub fn max_by_key<K, F>(&self, key: F) -> Result<Option<T>>
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync,
    {
        self.max_by(move |a, b| key(a).cmp(&key(b)))
    }

    fn extreme<B>(&self, op: &'static str, better: B) -> Result<Option<T>>
    where
        B: Fn(&T, &T) -> bool + Send + Sync,
    {
        let plan = self.begin_terminal(op)?;
        let pick = |best: Option<T>, cand: T| match best {
            Some(cur) if !better(&cand, &cur) => Some(cur),
            _ => Some(cand),
        };
        let partials = self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            let mut best = None;
            while let Some(t) = next_typed::<T>(idx, cursor, cancel)? {
                best = pick(best, t);
            }
            Ok(best)
        })?;
        Ok(partials.into_iter().flatten().fold(None, pick))
    }

    /// `true` if any element matches. `false` for an empty pipeline.
    pub fn any_match<P>(&self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.search("any_match", pred)
    }

    /// `true` if every element matches. `true` for an empty pipeline.
    pub fn all_match<P>(&self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        Ok(!self.search("all_match", move |t| !pred(t))?)
    }

    /// `true` if no element matches. `true` for an empty pipeline.
    pub fn none_match<P>(&self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        Ok(!self.search("none_match", pred)?)
    }

    /// Short-circuiting existence check shared by the `*_match` terminals.
    fn search<P>(&self, op: &'static str, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        let plan = self.begin_terminal(op)?;
        let hits = self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            while let Some(t) = next_typed::<T>(idx, cursor, cancel)? {
                if pred(&t) {
                    cancel.stop_all();
                    return Ok(true);
                }
            }
            Ok(false)
        })?;
        Ok(hits.into_iter().any(|hit| hit))
    }

    /// First element in encounter order, if any.
    pub fn find_first(&self) -> Result<Option<T>> {
        let plan = self.begin_terminal("find_first")?;
        let firsts = self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            let first = next_typed::<T>(idx, cursor, cancel)?;
            if first.is_some() {
                // Later partitions cannot hold the answer any more.
                cancel.stop_after(idx);
            }
            Ok(first)
        })?;
        Ok(firsts.into_iter().flatten().next())
    }

    /// Any element. Sequentially this is the first; in parallel it is
    /// whichever partition produced one first.
    pub fn find_any(&self) -> Result<Option<T>> {
        let plan = self.begin_terminal("find_any")?;
        let found = self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            let any = next_typed::<T>(idx, cursor, cancel)?;
            if any.is_some() {
                cancel.stop_all();
            }
            Ok(any)
        })?;
        Ok(found.into_iter().flatten().next())
    }

    /// Run `action` on every element. In parallel mode calls happen on
    /// worker threads in no particular order.
    pub fn for_each<F>(&self, action: F) -> Result<()>
    where
        F: Fn(T) + Send + Sync,
    {
        let plan = self.begin_terminal("for_each")?;
        self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            while let Some(t) = next_typed::<T>(idx, cursor, cancel)? {
                action(t);
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Run `action` on every element in encounter order, on the calling thread.
    ///
    /// In parallel mode partitions are computed concurrently and replayed in
    /// order once all of them are done.
    pub fn for_each_ordered<F>(&self, mut action: F) -> Result<()>
    where
        F: FnMut(T),
    {
        if let ExecMode::Sequential = self.runner.mode {
            let plan = self.begin_terminal("for_each_ordered")?;
            let mut cur = cursor::open(&plan);
            while let Some(item) = cur.next()? {
                action(downcast::<T>(item)?);
            }
            return Ok(());
        }
        for t in self.collect_as("for_each_ordered", ToVec)? {
            action(t);
        }
        Ok(())
    }

    /// Group elements by `classifier`; each group keeps encounter order.
    pub fn grouping_by<K, F>(&self, classifier: F) -> Result<HashMap<K, Vec<T>>>
    where
        K: Eq + Hash + Send,
        F: Fn(&T) -> K + Send + Sync,
    {
        self.collect_as("grouping_by", GroupingBy::new(classifier))
    }

    /// Split into `true` and `false` groups; both keys are always present.
    pub fn partitioning_by<P>(&self, pred: P) -> Result<HashMap<bool, Vec<T>>>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.collect_as("partitioning_by", PartitioningBy::new(pred))
    }
}

impl<T: Element + Ord> Pipeline<T> {
    /// Smallest element in natural order; ties keep the first encountered.
    pub fn min(&self) -> Result<Option<T>> {
        self.min_by(T::cmp)
    }

    /// Largest element in natural order; ties keep the first encountered.
    pub fn max(&self) -> Result<Option<T>> {
        self.max_by(T::cmp)
    }
}

impl<T: Element + Copy + Into<i64>> Pipeline<T> {
    /// Count, sum, min, max and mean in a single pass.
    pub fn summary_statistics(&self) -> Result<SummaryStatistics> {
        self.collect_as("summary_statistics", Summarizing::<T>::new())
    }
}

fn fold_partition<T, F>(
    idx: usize,
    cursor: &mut dyn Cursor,
    cancel: &Cancellation,
    init: Option<T>,
    combine: &F,
) -> Result<Option<T>>
where
    T: Element,
    F: Fn(T, T) -> T,
{
    let mut acc = init;
    while let Some(t) = next_typed::<T>(idx, cursor, cancel)? {
        acc = Some(match acc {
            Some(a) => combine(a, t),
            None => t,
        });
    }
    Ok(acc)
}
