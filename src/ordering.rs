//! Comparator combinators.
//!
//! Comparators are plain `Fn(&T, &T) -> Ordering` values. These helpers build
//! and compose them instead of chaining methods on a comparator object.
//!
//! ```
//! use ironstream::ordering::{comparing, reverse, then_by};
//! use ironstream::*;
//!
//! // (id, age)
//! let people = vec![(2u32, 30), (1, 25), (3, 30)];
//! let by_age_desc_then_id = then_by(
//!     reverse(comparing(|p: &(u32, i32)| p.1)),
//!     comparing(|p: &(u32, i32)| p.0),
//! );
//! let out = from_vec(people).sorted_by(by_age_desc_then_id).collect_vec().unwrap();
//! assert_eq!(out, vec![(2, 30), (3, 30), (1, 25)]);
//! ```

use ordered_float::OrderedFloat;
use std::cmp::Ordering;

/// Natural order of `T`.
pub fn natural<T: Ord + 'static>() -> impl Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static {
    |a: &T, b: &T| a.cmp(b)
}

/// Compare by a key extracted from each element.
pub fn comparing<T, K, F>(key: F) -> impl Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static
where
    T: 'static,
    K: Ord + 'static,
    F: Fn(&T) -> K + Clone + Send + Sync + 'static,
{
    move |a: &T, b: &T| key(a).cmp(&key(b))
}

/// Compare by an `f64` key using a total order (`NaN` sorts last).
pub fn comparing_f64<T, F>(key: F) -> impl Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&T) -> f64 + Clone + Send + Sync + 'static,
{
    move |a: &T, b: &T| OrderedFloat(key(a)).cmp(&OrderedFloat(key(b)))
}

/// Invert a comparator.
pub fn reverse<T, C>(cmp: C) -> impl Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static
where
    T: 'static,
    C: Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static,
{
    move |a: &T, b: &T| cmp(b, a)
}

/// Use `second` to break ties left by `first`.
pub fn then_by<T, C1, C2>(
    first: C1,
    second: C2,
) -> impl Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static
where
    T: 'static,
    C1: Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static,
    C2: Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static,
{
    move |a: &T, b: &T| first(a, b).then_with(|| second(a, b))
}

/// Shorthand for `then_by(first, comparing(key))`.
pub fn then_comparing<T, C, K, F>(
    first: C,
    key: F,
) -> impl Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static
where
    T: 'static,
    C: Fn(&T, &T) -> Ordering + Clone + Send + Sync + 'static,
    K: Ord + 'static,
    F: Fn(&T) -> K + Clone + Send + Sync + 'static,
{
    then_by(first, comparing(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_flips_order() {
        let cmp = reverse(natural::<i32>());
        assert_eq!(cmp(&1, &2), Ordering::Greater);
        assert_eq!(cmp(&2, &2), Ordering::Equal);
    }

    #[test]
    fn then_by_only_breaks_ties() {
        let cmp = then_by(
            comparing(|p: &(i32, i32)| p.0),
            reverse(comparing(|p: &(i32, i32)| p.1)),
        );
        assert_eq!(cmp(&(1, 9), &(2, 0)), Ordering::Less);
        assert_eq!(cmp(&(1, 9), &(1, 0)), Ordering::Less);
    }

    #[test]
    fn comparing_f64_is_total() {
        let cmp = comparing_f64(|x: &f64| *x);
        assert_eq!(cmp(&f64::NAN, &1.0), Ordering::Greater);
        assert_eq!(cmp(&-0.5, &0.5), Ordering::Less);
    }
}
