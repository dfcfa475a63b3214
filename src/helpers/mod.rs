//! Convenience extensions on [`Pipeline`](crate::Pipeline).
//!
//! - [`try_process`] -- `try_*` stage and terminal variants for fallible closures.
//! - [`collect_sorted`] -- collect and sort in one call.

pub mod collect_sorted;
pub mod try_process;
