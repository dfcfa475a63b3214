//! Pull-based cursors: one per stage, chained upstream → downstream.
//!
//! Each call to [`Cursor::next`] asks the stage for its next output, which may
//! pull zero, one or many elements from its upstream. `Ok(None)` means the
//! cursor is exhausted. A stage that no longer needs input simply stops
//! calling its upstream, which is how `limit` and `take_while` short-circuit.

use crate::error::Result;
use crate::node::{
    CompareFn, ExpandFn, ObserveFn, PredicateFn, SeenFactory, SourceNode, Stage, TransformFn,
};
use crate::planner::Plan;
use crate::type_token::Item;
use std::cmp::Ordering;
use std::sync::Arc;
use std::vec::IntoIter;

pub(crate) trait Cursor: Send {
    fn next(&mut self) -> Result<Option<Item>>;
}

/// Wrap `upstream` in one cursor per stage, in declaration order.
pub(crate) fn build(upstream: Box<dyn Cursor>, stages: &[Stage]) -> Box<dyn Cursor> {
    stages.iter().fold(upstream, |up, stage| wrap(up, stage))
}

/// Cursor over the whole plan, from the full source.
pub(crate) fn open(plan: &Plan) -> Box<dyn Cursor> {
    let len = plan.source.len();
    build(
        Box::new(SourceCursor::new(plan.source.clone(), 0, len)),
        &plan.stages,
    )
}

/// Pull everything out of `cursor`.
pub(crate) fn drain(cursor: &mut dyn Cursor) -> Result<Vec<Item>> {
    let mut out = Vec::new();
    while let Some(item) = cursor.next()? {
        out.push(item);
    }
    Ok(out)
}

fn wrap(up: Box<dyn Cursor>, stage: &Stage) -> Box<dyn Cursor> {
    match stage {
        Stage::Filter(p) => Box::new(FilterCursor {
            up,
            pred: Arc::clone(p),
        }),
        Stage::Map(f) => Box::new(MapCursor {
            up,
            f: Arc::clone(f),
        }),
        Stage::FlatMap(f) => Box::new(FlatMapCursor {
            up,
            f: Arc::clone(f),
            pending: Vec::new().into_iter(),
        }),
        Stage::Sorted(cmp) => Box::new(SortedCursor {
            up: Some(up),
            cmp: Arc::clone(cmp),
            sorted: Vec::new().into_iter(),
        }),
        Stage::Distinct(seen) => Box::new(DistinctCursor {
            up: Some(up),
            seen: Arc::clone(seen),
            unique: Vec::new().into_iter(),
        }),
        Stage::Limit(n) => Box::new(LimitCursor { up, remaining: *n }),
        Stage::Skip(n) => Box::new(SkipCursor { up, to_skip: *n }),
        Stage::TakeWhile(p) => Box::new(TakeWhileCursor {
            up,
            pred: Arc::clone(p),
            done: false,
        }),
        Stage::DropWhile(p) => Box::new(DropWhileCursor {
            up,
            pred: Arc::clone(p),
            dropping: true,
        }),
        Stage::Peek(obs) => Box::new(PeekCursor {
            up,
            observer: Arc::clone(obs),
        }),
        Stage::Concat(second) => Box::new(ConcatCursor {
            first: Some(up),
            second: Some(Arc::clone(second)),
            current: None,
        }),
    }
}

/* ---------- sources ---------- */

/// Clones elements out of a source `Vec<T>` on demand, over `[pos, end)`.
pub(crate) struct SourceCursor {
    source: SourceNode,
    pos: usize,
    end: usize,
}

impl SourceCursor {
    pub fn new(source: SourceNode, start: usize, end: usize) -> Self {
        Self {
            source,
            pos: start,
            end,
        }
    }
}

impl Cursor for SourceCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        if self.pos >= self.end {
            return Ok(None);
        }
        let item = self
            .source
            .vec_ops
            .item_at(self.source.payload.as_ref(), self.pos);
        self.pos += 1;
        Ok(item)
    }
}

/// Replays already-materialized items.
pub(crate) struct VecCursor(IntoIter<Item>);

impl VecCursor {
    pub fn new(items: Vec<Item>) -> Self {
        Self(items.into_iter())
    }
}

impl Cursor for VecCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        Ok(self.0.next())
    }
}

/* ---------- element-wise ---------- */

struct FilterCursor {
    up: Box<dyn Cursor>,
    pred: PredicateFn,
}

impl Cursor for FilterCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        while let Some(item) = self.up.next()? {
            if (self.pred)(&item)? {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

struct MapCursor {
    up: Box<dyn Cursor>,
    f: TransformFn,
}

impl Cursor for MapCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        match self.up.next()? {
            Some(item) => (self.f)(&item).map(Some),
            None => Ok(None),
        }
    }
}

struct FlatMapCursor {
    up: Box<dyn Cursor>,
    f: ExpandFn,
    pending: IntoIter<Item>,
}

impl Cursor for FlatMapCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        loop {
            if let Some(item) = self.pending.next() {
                return Ok(Some(item));
            }
            match self.up.next()? {
                Some(item) => self.pending = (self.f)(&item)?.into_iter(),
                None => return Ok(None),
            }
        }
    }
}

struct PeekCursor {
    up: Box<dyn Cursor>,
    observer: ObserveFn,
}

impl Cursor for PeekCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        let item = self.up.next()?;
        if let Some(item) = &item {
            (self.observer)(item)?;
        }
        Ok(item)
    }
}

/* ---------- buffering ---------- */

struct SortedCursor {
    /// Taken (and fully drained) on the first pull.
    up: Option<Box<dyn Cursor>>,
    cmp: CompareFn,
    sorted: IntoIter<Item>,
}

impl Cursor for SortedCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        if let Some(mut up) = self.up.take() {
            let mut items = drain(up.as_mut())?;
            tracing::trace!(buffered = items.len(), "sorted: upstream materialized");
            // Stable. sort_by cannot bail out; the first comparator error is returned afterwards.
            let mut failure = None;
            items.sort_by(|a, b| match (self.cmp)(a, b) {
                Ok(ord) => ord,
                Err(e) => {
                    failure.get_or_insert(e);
                    Ordering::Equal
                }
            });
            if let Some(e) = failure {
                return Err(e);
            }
            self.sorted = items.into_iter();
        }
        Ok(self.sorted.next())
    }
}

struct DistinctCursor {
    up: Option<Box<dyn Cursor>>,
    seen: SeenFactory,
    unique: IntoIter<Item>,
}

impl Cursor for DistinctCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        if let Some(mut up) = self.up.take() {
            let mut seen = (self.seen)();
            let mut unique = Vec::new();
            while let Some(item) = up.next()? {
                if seen.insert(&item)? {
                    unique.push(item);
                }
            }
            tracing::trace!(unique = unique.len(), "distinct: upstream materialized");
            self.unique = unique.into_iter();
        }
        Ok(self.unique.next())
    }
}

/* ---------- positional / short-circuit ---------- */

struct LimitCursor {
    up: Box<dyn Cursor>,
    remaining: usize,
}

impl Cursor for LimitCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let item = self.up.next()?;
        if item.is_some() {
            self.remaining -= 1;
        } else {
            self.remaining = 0;
        }
        Ok(item)
    }
}

struct SkipCursor {
    up: Box<dyn Cursor>,
    to_skip: usize,
}

impl Cursor for SkipCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        while self.to_skip > 0 {
            self.to_skip -= 1;
            if self.up.next()?.is_none() {
                self.to_skip = 0;
                return Ok(None);
            }
        }
        self.up.next()
    }
}

struct TakeWhileCursor {
    up: Box<dyn Cursor>,
    pred: PredicateFn,
    done: bool,
}

impl Cursor for TakeWhileCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        if self.done {
            return Ok(None);
        }
        match self.up.next()? {
            Some(item) if (self.pred)(&item)? => Ok(Some(item)),
            _ => {
                self.done = true;
                Ok(None)
            }
        }
    }
}

struct DropWhileCursor {
    up: Box<dyn Cursor>,
    pred: PredicateFn,
    dropping: bool,
}

impl Cursor for DropWhileCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        if !self.dropping {
            return self.up.next();
        }
        while let Some(item) = self.up.next()? {
            if !(self.pred)(&item)? {
                self.dropping = false;
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

/// Drains `first`, then opens and drains the second plan.
struct ConcatCursor {
    first: Option<Box<dyn Cursor>>,
    second: Option<Arc<Plan>>,
    current: Option<Box<dyn Cursor>>,
}

impl Cursor for ConcatCursor {
    fn next(&mut self) -> Result<Option<Item>> {
        if let Some(first) = self.first.as_mut() {
            if let Some(item) = first.next()? {
                return Ok(Some(item));
            }
            self.first = None;
        }
        if let Some(plan) = self.second.take() {
            self.current = Some(open(&plan));
        }
        match self.current.as_mut() {
            Some(cur) => cur.next(),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use crate::type_token::downcast;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Counts how many times it is pulled.
    struct Counting {
        items: IntoIter<i32>,
        pulls: Arc<AtomicUsize>,
    }

    impl Cursor for Counting {
        fn next(&mut self) -> Result<Option<Item>> {
            self.pulls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(self.items.next().map(|i| Box::new(i) as Item))
        }
    }

    fn counting(items: Vec<i32>) -> (Box<dyn Cursor>, Arc<AtomicUsize>) {
        let pulls = Arc::new(AtomicUsize::new(0));
        let c = Counting {
            items: items.into_iter(),
            pulls: Arc::clone(&pulls),
        };
        (Box::new(c), pulls)
    }

    fn ints(cursor: &mut dyn Cursor) -> Vec<i32> {
        drain(cursor)
            .unwrap()
            .into_iter()
            .map(|i| downcast::<i32>(i).unwrap())
            .collect()
    }

    fn pred(f: fn(i32) -> bool) -> PredicateFn {
        Arc::new(move |item: &Item| Ok(f(*item.downcast_ref::<i32>().unwrap())))
    }

    #[test]
    fn limit_stops_pulling_once_satisfied() {
        let (up, pulls) = counting(vec![1, 2, 3, 4, 5]);
        let mut c = build(up, &[Stage::Limit(2)]);
        assert_eq!(ints(c.as_mut()), vec![1, 2]);
        assert_eq!(pulls.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn limit_zero_never_pulls() {
        let (up, pulls) = counting(vec![1, 2, 3]);
        let mut c = build(up, &[Stage::Limit(0)]);
        assert!(ints(c.as_mut()).is_empty());
        assert_eq!(pulls.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn take_while_does_not_resume() {
        let (up, pulls) = counting(vec![1, 2, 9, 3, 4]);
        let mut c = build(up, &[Stage::TakeWhile(pred(|x| x < 5))]);
        assert_eq!(ints(c.as_mut()), vec![1, 2]);
        assert_eq!(pulls.load(AtomicOrdering::SeqCst), 3);
    }

    #[test]
    fn drop_while_emits_first_failing_element() {
        let (up, _) = counting(vec![1, 2, 9, 3, 4]);
        let mut c = build(up, &[Stage::DropWhile(pred(|x| x < 5))]);
        assert_eq!(ints(c.as_mut()), vec![9, 3, 4]);
    }

    #[test]
    fn skip_past_end_is_empty() {
        let (up, _) = counting(vec![1, 2]);
        let mut c = build(up, &[Stage::Skip(5)]);
        assert!(ints(c.as_mut()).is_empty());
    }

    #[test]
    fn sorted_drains_upstream_before_first_output() {
        let (up, pulls) = counting(vec![3, 1, 2]);
        let cmp: CompareFn = Arc::new(|a: &Item, b: &Item| {
            Ok(a.downcast_ref::<i32>()
                .unwrap()
                .cmp(b.downcast_ref::<i32>().unwrap()))
        });
        let mut c = build(up, &[Stage::Sorted(cmp), Stage::Limit(1)]);
        assert_eq!(ints(c.as_mut()), vec![1]);
        // three elements plus the end-of-input pull
        assert_eq!(pulls.load(AtomicOrdering::SeqCst), 4);
    }

    #[test]
    fn failing_predicate_aborts() {
        let (up, _) = counting(vec![1, 2, 3]);
        let failing: PredicateFn = Arc::new(|item: &Item| {
            if *item.downcast_ref::<i32>().unwrap() == 2 {
                Err(StreamError::failure("filter", anyhow::anyhow!("boom")))
            } else {
                Ok(true)
            }
        });
        let mut c = build(up, &[Stage::Filter(failing)]);
        assert!(c.next().unwrap().is_some());
        let err = c.next().unwrap_err();
        assert!(err.is_operation_failure());
    }

    #[test]
    fn failing_comparator_surfaces_after_the_sort() {
        let (up, pulls) = counting(vec![3, 1, 2]);
        let cmp: CompareFn = Arc::new(|_: &Item, _: &Item| {
            Err(StreamError::failure("sorted", anyhow::anyhow!("incomparable")))
        });
        let mut c = build(up, &[Stage::Sorted(cmp)]);
        let err = c.next().unwrap_err();
        assert!(matches!(err, StreamError::OperationFailure { stage: "sorted", .. }));
        assert_eq!(pulls.load(AtomicOrdering::SeqCst), 4);
    }
}
