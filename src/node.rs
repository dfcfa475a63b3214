//! Stage descriptors: pure descriptions of intermediate transformations.
//!
//! A [`Stage`] carries the caller's function values in type-erased form. It
//! does nothing on its own; the runner turns a chain of stages into cursors
//! when a terminal operation asks for elements.

use crate::error::Result;
use crate::planner::Plan;
use crate::type_token::{Item, TypeTag, VecOps};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Erased predicate used by `filter`, `take_while` and `drop_while`.
pub(crate) type PredicateFn = Arc<dyn Fn(&Item) -> Result<bool> + Send + Sync>;
/// Erased 1:1 transform.
pub(crate) type TransformFn = Arc<dyn Fn(&Item) -> Result<Item> + Send + Sync>;
/// Erased 1:N expansion.
pub(crate) type ExpandFn = Arc<dyn Fn(&Item) -> Result<Vec<Item>> + Send + Sync>;
/// Erased comparator. An `Err` aborts the sort once it finishes.
pub(crate) type CompareFn = Arc<dyn Fn(&Item, &Item) -> Result<Ordering> + Send + Sync>;
/// Erased side-effecting observer.
pub(crate) type ObserveFn = Arc<dyn Fn(&Item) -> Result<()> + Send + Sync>;
/// Builds a fresh "seen" set for one evaluation of a `distinct` stage.
pub(crate) type SeenFactory = Arc<dyn Fn() -> Box<dyn SeenSet> + Send + Sync>;

/// Per-evaluation membership state for `distinct`.
pub(crate) trait SeenSet: Send {
    /// Record `item`; returns `true` the first time an equal element is seen.
    fn insert(&mut self, item: &Item) -> Result<bool>;
}

/// The finite, ordered collection a pipeline is anchored to.
#[derive(Clone)]
pub(crate) struct SourceNode {
    pub payload: Arc<dyn Any + Send + Sync>,
    pub vec_ops: Arc<dyn VecOps>,
    pub elem_tag: TypeTag,
}

impl SourceNode {
    pub fn len(&self) -> usize {
        self.vec_ops.len(self.payload.as_ref()).unwrap_or(0)
    }
}

/// One intermediate transformation, immutable once created.
#[derive(Clone)]
pub(crate) enum Stage {
    Filter(PredicateFn),
    Map(TransformFn),
    FlatMap(ExpandFn),
    Sorted(CompareFn),
    Distinct(SeenFactory),
    Limit(usize),
    Skip(usize),
    TakeWhile(PredicateFn),
    DropWhile(PredicateFn),
    Peek(ObserveFn),
    /// Emit everything from the second plan after the upstream is exhausted.
    Concat(Arc<Plan>),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Filter(_) => "filter",
            Stage::Map(_) => "map",
            Stage::FlatMap(_) => "flat_map",
            Stage::Sorted(_) => "sorted",
            Stage::Distinct(_) => "distinct",
            Stage::Limit(_) => "limit",
            Stage::Skip(_) => "skip",
            Stage::TakeWhile(_) => "take_while",
            Stage::DropWhile(_) => "drop_while",
            Stage::Peek(_) => "peek",
            Stage::Concat(_) => "concat",
        }
    }

    /// Element-wise stages can run independently on each source partition.
    pub fn is_element_wise(&self) -> bool {
        matches!(
            self,
            Stage::Filter(_) | Stage::Map(_) | Stage::FlatMap(_) | Stage::Peek(_)
        )
    }

    /// Stages that drain their whole upstream before emitting anything.
    pub fn is_buffering(&self) -> bool {
        matches!(self, Stage::Sorted(_) | Stage::Distinct(_))
    }

    /// Stages that may stop pulling from upstream before it is exhausted.
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Stage::Limit(_) | Stage::TakeWhile(_))
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Limit(n) => write!(f, "limit({n})"),
            Stage::Skip(n) => write!(f, "skip({n})"),
            Stage::Concat(plan) => write!(f, "concat({} stages)", plan.stages.len()),
            other => f.write_str(other.name()),
        }
    }
}

/// Persistent, append-only chain. Appending a stage shares the prefix.
pub(crate) enum Link {
    Source(SourceNode),
    Stage { upstream: Arc<Link>, stage: Stage },
}
