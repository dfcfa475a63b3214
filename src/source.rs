//! Pipeline entry points.
//!
//! These anchor a new [`Pipeline`] to an in-memory, finite, ordered source.
//! The source is kept behind an `Arc` and elements are cloned out of it on
//! demand, so a pipeline can be branched and each branch evaluated once.
//!
//! - [`from_vec`] -- a `Vec<T>` source.
//! - [`from_iter`] -- any `IntoIterator<Item = T>`, collected eagerly.
//! - [`empty`] -- no elements.
//! - [`concat`] -- all of `a`, then all of `b`.
//!
//! ```
//! use ironstream::*;
//!
//! let squares = from_iter(1..=5).map(|n| n * n);
//! assert_eq!(squares.collect_vec().unwrap(), vec![1, 4, 9, 16, 25]);
//! ```

use crate::node::SourceNode;
use crate::pipeline::{Element, Pipeline};
use crate::type_token::{TypeTag, vec_ops_for};
use std::sync::Arc;

/// Create a [`Pipeline<T>`] over an existing [`Vec<T>`].
///
/// ```
/// use ironstream::*;
///
/// let p = from_vec(vec![10, 20, 30]);
/// assert_eq!(p.collect_vec().unwrap(), vec![10, 20, 30]);
/// ```
pub fn from_vec<T: Element>(data: Vec<T>) -> Pipeline<T> {
    Pipeline::from_source(SourceNode {
        payload: Arc::new(data),
        vec_ops: vec_ops_for::<T>(),
        elem_tag: TypeTag::of::<T>(),
    })
}

/// Create a [`Pipeline<T>`] from any iterator or collection.
///
/// The iterator is collected up front; laziness starts at the pipeline.
pub fn from_iter<T, I>(iter: I) -> Pipeline<T>
where
    T: Element,
    I: IntoIterator<Item = T>,
{
    from_vec(iter.into_iter().collect())
}

/// A pipeline with no elements.
#[must_use]
pub fn empty<T: Element>() -> Pipeline<T> {
    from_vec(Vec::new())
}

/// All elements of `a` in order, followed by all elements of `b` in order.
///
/// Neither argument is consumed: `a` and `b` remain usable branches, and
/// evaluating them again re-runs their stages, `peek` observers included.
/// `b` is only opened once `a` is exhausted.
///
/// ```
/// use ironstream::*;
///
/// let a = from_vec(vec![1, 2]);
/// let b = from_vec(vec![3]).map(|x| x * 10);
/// assert_eq!(concat(&a, &b).collect_vec().unwrap(), vec![1, 2, 30]);
/// ```
#[must_use]
pub fn concat<T: Element>(a: &Pipeline<T>, b: &Pipeline<T>) -> Pipeline<T> {
    a.concat(b)
}
