//! Fallible stage and terminal variants.
//!
//! The plain operations take infallible closures. The `try_*` variants accept
//! closures returning `anyhow::Result`; the first `Err` aborts the whole
//! evaluation and surfaces as [`StreamError::OperationFailure`] naming the
//! stage. Side effects already performed (by `peek` or `for_each`) are not
//! rolled back, and the pipeline value stays consumed.
//!
//! ```
//! use ironstream::*;
//!
//! let parsed = from_vec(vec!["1", "2", "x"])
//!     .try_map(|s: &&str| Ok(s.parse::<i32>()?))
//!     .collect_vec();
//! assert!(matches!(parsed, Err(StreamError::OperationFailure { stage: "map", .. })));
//! ```

use crate::error::{Result, StreamError};
use crate::node::Stage;
use crate::pipeline::{
    Element, Pipeline, erase_comparator, erase_expand, erase_observer, erase_predicate,
    erase_transform,
};
use crate::type_token::downcast;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

impl<T: Element> Pipeline<T> {
    /// [`filter`](Pipeline::filter) with a fallible predicate.
    #[must_use]
    pub fn try_filter<F>(&self, pred: F) -> Pipeline<T>
    where
        F: Fn(&T) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.append(Stage::Filter(erase_predicate::<T, _>("filter", pred)))
    }

    /// [`map`](Pipeline::map) with a fallible transform.
    #[must_use]
    pub fn try_map<O, F>(&self, f: F) -> Pipeline<O>
    where
        O: Element,
        F: Fn(&T) -> anyhow::Result<O> + Send + Sync + 'static,
    {
        self.append(Stage::Map(erase_transform::<T, O, _>("map", f)))
    }

    /// [`flat_map`](Pipeline::flat_map) with a fallible expander.
    #[must_use]
    pub fn try_flat_map<O, I, F>(&self, f: F) -> Pipeline<O>
    where
        O: Element,
        I: IntoIterator<Item = O>,
        F: Fn(&T) -> anyhow::Result<I> + Send + Sync + 'static,
    {
        self.append(Stage::FlatMap(erase_expand::<T, O, I, _>("flat_map", f)))
    }

    /// [`peek`](Pipeline::peek) with a fallible observer.
    #[must_use]
    pub fn try_peek<F>(&self, observer: F) -> Pipeline<T>
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.append(Stage::Peek(erase_observer::<T, _>("peek", observer)))
    }

    /// [`for_each`](Pipeline::for_each) with a fallible action.
    pub fn try_for_each<F>(&self, action: F) -> Result<()>
    where
        F: Fn(T) -> anyhow::Result<()> + Send + Sync,
    {
        let plan = self.begin_terminal("for_each")?;
        self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            while !cancel.is_stopped(idx) {
                let Some(item) = cursor.next()? else { break };
                action(downcast::<T>(item)?).map_err(|e| StreamError::failure("for_each", e))?;
            }
            Ok(())
        })?;
        Ok(())
    }

    /// [`sorted_by`](Pipeline::sorted_by) with a fallible comparator.
    ///
    /// The sort always runs to completion; the first comparator error is
    /// reported once it is done.
    #[must_use]
    pub fn try_sorted_by<C>(&self, cmp: C) -> Pipeline<T>
    where
        C: Fn(&T, &T) -> anyhow::Result<Ordering> + Send + Sync + 'static,
    {
        self.append(Stage::Sorted(erase_comparator::<T, _>("sorted", cmp)))
    }

    /// [`take_while`](Pipeline::take_while) with a fallible predicate.
    #[must_use]
    pub fn try_take_while<F>(&self, pred: F) -> Pipeline<T>
    where
        F: Fn(&T) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.append(Stage::TakeWhile(erase_predicate::<T, _>("take_while", pred)))
    }

    /// [`drop_while`](Pipeline::drop_while) with a fallible predicate.
    #[must_use]
    pub fn try_drop_while<F>(&self, pred: F) -> Pipeline<T>
    where
        F: Fn(&T) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.append(Stage::DropWhile(erase_predicate::<T, _>("drop_while", pred)))
    }

    /// [`grouping_by`](Pipeline::grouping_by) with a fallible classifier.
    ///
    /// Only classifier errors are reported as stage `"grouping_by"`; failures
    /// from upstream stages keep their own stage name.
    pub fn try_grouping_by<K, F>(&self, classifier: F) -> Result<HashMap<K, Vec<T>>>
    where
        K: Element + Eq + Hash,
        F: Fn(&T) -> anyhow::Result<K> + Send + Sync,
    {
        self.try_classify("grouping_by", classifier)
    }

    /// [`partitioning_by`](Pipeline::partitioning_by) with a fallible predicate.
    /// Both keys are always present.
    pub fn try_partitioning_by<P>(&self, pred: P) -> Result<HashMap<bool, Vec<T>>>
    where
        P: Fn(&T) -> anyhow::Result<bool> + Send + Sync,
    {
        let mut parts = self.try_classify("partitioning_by", pred)?;
        parts.entry(true).or_default();
        parts.entry(false).or_default();
        Ok(parts)
    }

    /// Keyed grouping shared by the fallible classifiers. Each partition
    /// builds its own map; maps merge in partition order.
    fn try_classify<K, F>(&self, op: &'static str, classifier: F) -> Result<HashMap<K, Vec<T>>>
    where
        K: Element + Eq + Hash,
        F: Fn(&T) -> anyhow::Result<K> + Send + Sync,
    {
        let plan = self.begin_terminal(op)?;
        let parts = self.runner.run_partitions(&plan, |idx, cursor, cancel| {
            let mut groups: HashMap<K, Vec<T>> = HashMap::new();
            while !cancel.is_stopped(idx) {
                let Some(item) = cursor.next()? else { break };
                let t = downcast::<T>(item)?;
                let key = classifier(&t).map_err(|e| StreamError::failure(op, e))?;
                groups.entry(key).or_default().push(t);
            }
            Ok(groups)
        })?;
        let mut merged: HashMap<K, Vec<T>> = HashMap::new();
        for part in parts {
            for (k, vs) in part {
                merged.entry(k).or_default().extend(vs);
            }
        }
        Ok(merged)
    }
}
