//! Sorted collection helpers for [`Pipeline`].
//!
//! - [`Pipeline::collect_sorted`] -- collect, then sort in natural order.
//! - [`Pipeline::collect_sorted_by`] -- collect, then stable-sort by a comparator.
//!
//! Handy in tests of parallel pipelines or unordered terminals, where the
//! comparison should not depend on evaluation order.

use crate::error::Result;
use crate::pipeline::{Element, Pipeline};
use std::cmp::Ordering;

impl<T: Element + Ord> Pipeline<T> {
    /// Collect every element and return them sorted.
    ///
    /// # Example
    /// ```
    /// use ironstream::*;
    ///
    /// let sorted = from_vec(vec![3, 1, 2]).parallel().collect_sorted().unwrap();
    /// assert_eq!(sorted, vec![1, 2, 3]);
    /// ```
    pub fn collect_sorted(&self) -> Result<Vec<T>> {
        let mut v = self.collect_vec()?;
        v.sort();
        Ok(v)
    }
}

impl<T: Element> Pipeline<T> {
    /// Collect every element and stable-sort them with `cmp`.
    pub fn collect_sorted_by<C>(&self, cmp: C) -> Result<Vec<T>>
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut v = self.collect_vec()?;
        v.sort_by(cmp);
        Ok(v)
    }
}
