//! Execution engine: sequential pulls or partitioned parallel evaluation.
//!
//! Terminal operations hand the runner a [`Plan`] and a *partition visitor*.
//! The runner opens one cursor per partition and calls the visitor with it:
//!
//! - **Sequential**: a single cursor over the whole plan, pulled on demand.
//! - **Parallel**: the source is split into contiguous ranges. The leading
//!   element-wise stages run per range on `rayon` workers. If the plan has a
//!   barrier (an order-sensitive stage), every range is materialized, the
//!   results are merged back in range order, and the rest of the plan runs as
//!   a single cursor.
//!
//! Visitor results come back in partition order, which is what lets ordered
//! terminals reconcile out-of-order completion. A shared [`Cancellation`]
//! lets short-circuiting terminals stop partitions that have not started yet
//! (and those still running, between pulls).

use crate::cursor::{self, Cursor, SourceCursor, VecCursor};
use crate::error::{Result, StreamError};
use crate::planner::Plan;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// How a pipeline is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecMode {
    /// Single-threaded cooperative pulls (the default).
    Sequential,
    /// Partitioned evaluation on a worker pool.
    Parallel {
        /// Dedicated pool size; `None` uses the global `rayon` pool.
        #[serde(default)]
        threads: Option<usize>,
        /// Number of source partitions; `None` uses `Runner::default_partitions`.
        #[serde(default)]
        partitions: Option<usize>,
    },
}

/// Evaluation settings carried by every pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Runner {
    pub mode: ExecMode,
    pub default_partitions: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Sequential,
            default_partitions: 2 * num_cpus::get().max(2),
        }
    }
}

impl Runner {
    /// Parse a runner from JSON, e.g. `{"mode": {"mode": "parallel", "threads": 4}}`.
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let runner: Self = serde_json::from_str(json)
            .map_err(|e| StreamError::InvalidArgument(format!("runner config: {e}")))?;
        runner.validate()?;
        Ok(runner)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.default_partitions == 0 {
            return Err(StreamError::InvalidArgument(
                "default_partitions must be at least 1".into(),
            ));
        }
        if let ExecMode::Parallel {
            threads,
            partitions,
        } = self.mode
        {
            if threads == Some(0) {
                return Err(StreamError::InvalidArgument(
                    "thread count must be at least 1".into(),
                ));
            }
            if partitions == Some(0) {
                return Err(StreamError::InvalidArgument(
                    "partition count must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }

    /// Open the plan and call `visit` once per partition, in parallel when
    /// configured. Results are returned in partition order; partitions
    /// cancelled before they started are omitted.
    pub(crate) fn run_partitions<A, F>(&self, plan: &Plan, visit: F) -> Result<Vec<A>>
    where
        A: Send,
        F: Fn(usize, &mut dyn Cursor, &Cancellation) -> Result<A> + Send + Sync,
    {
        let cancel = Cancellation::default();
        match self.mode {
            ExecMode::Sequential => {
                let mut cur = cursor::open(plan);
                Ok(vec![visit(0, cur.as_mut(), &cancel)?])
            }
            ExecMode::Parallel {
                threads,
                partitions,
            } => {
                let parts = partitions.unwrap_or(self.default_partitions);
                let job = || exec_parallel(plan, parts, &visit, &cancel);
                match threads {
                    Some(t) => rayon::ThreadPoolBuilder::new()
                        .num_threads(t)
                        .build()
                        .map_err(|e| StreamError::ThreadPool(e.to_string()))?
                        .install(job),
                    None => job(),
                }
            }
        }
    }
}

fn exec_parallel<A, F>(plan: &Plan, partitions: usize, visit: &F, cancel: &Cancellation) -> Result<Vec<A>>
where
    A: Send,
    F: Fn(usize, &mut dyn Cursor, &Cancellation) -> Result<A> + Send + Sync,
{
    let ranges = split_ranges(plan.source.len(), partitions);
    let prefix = plan.parallel_prefix_len();
    let (head, tail) = plan.stages.split_at(prefix);
    tracing::debug!(
        partitions = ranges.len(),
        parallel_stages = head.len(),
        barrier = !tail.is_empty(),
        "parallel evaluation"
    );

    if tail.is_empty() {
        let results: Vec<Option<Result<A>>> = ranges
            .into_par_iter()
            .enumerate()
            .map(|(idx, (start, end))| {
                if cancel.is_stopped(idx) {
                    tracing::debug!(partition = idx, "partition cancelled before start");
                    return None;
                }
                let source = SourceCursor::new(plan.source.clone(), start, end);
                let mut cur = cursor::build(Box::new(source), head);
                let out = visit(idx, cur.as_mut(), cancel);
                if out.is_err() {
                    cancel.stop_all();
                }
                Some(out)
            })
            .collect();
        return results.into_iter().flatten().collect();
    }

    // Barrier: materialize each partition, merge in source order, continue on one cursor.
    let chunks: Vec<Vec<_>> = ranges
        .into_par_iter()
        .map(|(start, end)| {
            let source = SourceCursor::new(plan.source.clone(), start, end);
            let mut cur = cursor::build(Box::new(source), head);
            cursor::drain(cur.as_mut())
        })
        .collect::<Result<_>>()?;
    let merged: Vec<_> = chunks.into_iter().flatten().collect();
    let mut cur = cursor::build(Box::new(VecCursor::new(merged)), tail);
    Ok(vec![visit(0, cur.as_mut(), cancel)?])
}

/// Split `len` elements into at most `n` contiguous, non-empty ranges
/// (a single empty range when `len == 0`).
fn split_ranges(len: usize, n: usize) -> Vec<(usize, usize)> {
    let n = n.max(1).min(len.max(1));
    let chunk = len.div_ceil(n).max(1);
    let mut out = Vec::with_capacity(n);
    let mut start = 0;
    while start < len {
        let end = (start + chunk).min(len);
        out.push((start, end));
        start = end;
    }
    if out.is_empty() {
        out.push((0, 0));
    }
    out
}

/// Stop signal shared by the partitions of one evaluation.
#[derive(Debug)]
pub(crate) struct Cancellation {
    all: AtomicBool,
    /// Partitions with an index greater than this stop.
    cutoff: AtomicUsize,
}

impl Default for Cancellation {
    fn default() -> Self {
        Self {
            all: AtomicBool::new(false),
            cutoff: AtomicUsize::new(usize::MAX),
        }
    }
}

impl Cancellation {
    /// Stop every partition.
    pub fn stop_all(&self) {
        self.all.store(true, Ordering::SeqCst);
    }

    /// Stop every partition after `idx`; earlier ones keep running.
    pub fn stop_after(&self, idx: usize) {
        self.cutoff.fetch_min(idx, Ordering::SeqCst);
    }

    pub fn is_stopped(&self, idx: usize) -> bool {
        self.all.load(Ordering::SeqCst) || idx > self.cutoff.load(Ordering::SeqCst)
    }
}
