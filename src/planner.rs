//! Plan linearization and execution explanations.
//!
//! The planner walks a pipeline's persistent chain back from its tail to the
//! source and produces a [`Plan`]: the source plus stages in declaration
//! order. It also decides how much of the plan can run per partition when
//! evaluating in parallel:
//!
//! - The **parallel segment** is the source plus the leading run of
//!   element-wise stages (`filter`, `map`, `flat_map`, `peek`).
//! - The first order-sensitive stage is a **barrier**: partitions are merged
//!   back in source order there and the remainder runs as one cursor.

use crate::node::{Link, SourceNode, Stage};
use crate::runner::{ExecMode, Runner};
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::Arc;

/// A linearized execution plan: one source and its stages, source first.
#[derive(Clone)]
pub(crate) struct Plan {
    pub source: SourceNode,
    pub stages: Vec<Stage>,
}

impl Plan {
    /// Linear backwalk: tail → … → source, then reverse.
    pub fn from_link(tail: &Arc<Link>) -> Self {
        let mut stages = Vec::new();
        let mut cur = tail;
        loop {
            match cur.as_ref() {
                Link::Stage { upstream, stage } => {
                    stages.push(stage.clone());
                    cur = upstream;
                }
                Link::Source(source) => {
                    stages.reverse();
                    return Self {
                        source: source.clone(),
                        stages,
                    };
                }
            }
        }
    }

    /// Number of leading stages that can run independently per partition.
    pub fn parallel_prefix_len(&self) -> usize {
        self.stages
            .iter()
            .take_while(|s| s.is_element_wise())
            .count()
    }

    pub fn explain(&self, runner: &Runner) -> ExecutionExplanation {
        let prefix = self.parallel_prefix_len();
        let parallel = matches!(runner.mode, ExecMode::Parallel { .. });
        let steps = self
            .stages
            .iter()
            .enumerate()
            .map(|(i, stage)| ExplainStep {
                step: i + 1,
                stage: stage.name(),
                description: format!("{stage:?}"),
                is_barrier: parallel && i == prefix,
                is_buffering: stage.is_buffering(),
                is_short_circuit: stage.is_short_circuit(),
            })
            .collect();
        ExecutionExplanation {
            source_type: self.source.elem_tag.name,
            source_len: self.source.len(),
            steps,
            mode: runner.mode,
            parallel_segment: if parallel { prefix } else { 0 },
        }
    }
}

/// One stage in an [`ExecutionExplanation`].
#[derive(Debug, Clone)]
pub struct ExplainStep {
    /// 1-based position in declaration order.
    pub step: usize,
    /// Stage name (`"filter"`, `"sorted"`, ...).
    pub stage: &'static str,
    /// Human-readable description including arguments where known.
    pub description: String,
    /// Parallel partitions are merged back in order before this stage.
    pub is_barrier: bool,
    /// The stage drains its whole upstream before emitting.
    pub is_buffering: bool,
    /// The stage may stop pulling from upstream early.
    pub is_short_circuit: bool,
}

/// Description of how a pipeline would be evaluated.
#[derive(Debug, Clone)]
pub struct ExecutionExplanation {
    /// Element type of the source.
    pub source_type: &'static str,
    /// Number of elements in the source.
    pub source_len: usize,
    /// Stages in declaration order.
    pub steps: Vec<ExplainStep>,
    /// Mode the pipeline is configured with.
    pub mode: ExecMode,
    /// Number of leading stages evaluated per partition (0 when sequential).
    pub parallel_segment: usize,
}

impl ExecutionExplanation {
    /// Number of stages that buffer their entire upstream.
    #[must_use]
    pub fn buffering_stages(&self) -> usize {
        self.steps.iter().filter(|s| s.is_buffering).count()
    }
}

impl Display for ExecutionExplanation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        writeln!(f, "┌─ EXECUTION PLAN ─────────────────────────────────────────────┐")?;
        writeln!(f, "│ Source:   {} ({} elements)", self.source_type, self.source_len)?;
        writeln!(f, "│ Mode:     {:?}", self.mode)?;
        if matches!(self.mode, ExecMode::Parallel { .. }) {
            writeln!(f, "│ Parallel: first {} stage(s) per partition", self.parallel_segment)?;
        }
        writeln!(f, "├──────────────────────────────────────────────────────────────┤")?;
        for step in &self.steps {
            let mut markers = Vec::new();
            if step.is_barrier {
                markers.push("BARRIER");
            }
            if step.is_buffering {
                markers.push("BUFFERS");
            }
            if step.is_short_circuit {
                markers.push("SHORT-CIRCUIT");
            }
            if markers.is_empty() {
                writeln!(f, "│ {:>2}. {}", step.step, step.description)?;
            } else {
                writeln!(f, "│ {:>2}. {} [{}]", step.step, step.description, markers.join(", "))?;
            }
        }
        writeln!(f, "└──────────────────────────────────────────────────────────────┘")
    }
}
