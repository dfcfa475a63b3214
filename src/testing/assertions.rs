//! Assertion functions for testing pipeline outputs.

use crate::pipeline::{Element, Pipeline};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_collections_equal;
///
/// assert_collections_equal(&[1, 2, 3], &[1, 2, 3]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

/// Assert that two collections hold the same elements with the same
/// multiplicities, ignoring order.
///
/// # Panics
///
/// Panics if some element occurs a different number of times in each.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 1, 2], &[1, 2, 1, 3]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    let actual_counts = multiset(actual);
    let expected_counts = multiset(expected);
    if actual_counts != expected_counts {
        let missing: Vec<_> = expected_counts
            .iter()
            .filter(|(k, n)| actual_counts.get(*k).copied().unwrap_or(0) < **n)
            .map(|(k, _)| k)
            .collect();
        let extra: Vec<_> = actual_counts
            .iter()
            .filter(|(k, n)| expected_counts.get(*k).copied().unwrap_or(0) < **n)
            .map(|(k, _)| k)
            .collect();
        panic!(
            "Collection content mismatch:\n  Missing elements: {missing:?}\n  Extra elements: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
        );
    }
}

fn multiset<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Assert that two groupings have the same keys and, per key, the same
/// values in the same order.
///
/// # Panics
///
/// Panics on a missing or extra key, or a differing group.
///
/// # Example
///
/// ```
/// use ironstream::*;
/// use ironstream::testing::assert_groups_equal;
/// use std::collections::HashMap;
///
/// let groups = from_vec(vec![1, 2, 3, 4]).grouping_by(|x| x % 2).unwrap();
/// assert_groups_equal(&groups, &HashMap::from([(0, vec![2, 4]), (1, vec![1, 3])]));
/// ```
pub fn assert_groups_equal<K, V, S: BuildHasher>(
    actual: &HashMap<K, Vec<V>, S>,
    expected: &HashMap<K, Vec<V>, S>,
) where
    K: Debug + Eq + Hash,
    V: Debug + PartialEq,
{
    assert_eq!(
        actual.len(),
        expected.len(),
        "Group count mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );

    for (key, expected_group) in expected {
        match actual.get(key) {
            Some(group) => assert_collections_equal(group, expected_group),
            None => panic!("Missing group for key {key:?}\n  Actual: {actual:?}"),
        }
    }
}

/// Assert that all elements in a collection satisfy a predicate.
///
/// # Panics
///
/// Panics if any element does not satisfy the predicate.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_all;
///
/// assert_all(&[2, 4, 6, 8], |x| x % 2 == 0);
/// ```
pub fn assert_all<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    for (i, item) in collection.iter().enumerate() {
        assert!(
            predicate(item),
            "Predicate failed for element at index {i}:\n  Element: {item:?}\n  Collection: {collection:?}"
        );
    }
}

/// Assert that at least one element in a collection satisfies a predicate.
///
/// # Panics
///
/// Panics if no elements satisfy the predicate.
pub fn assert_any<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    assert!(
        collection.iter().any(&predicate),
        "No elements satisfied the predicate:\n  Collection: {collection:?}"
    );
}

/// Assert that no elements in a collection satisfy a predicate.
///
/// # Panics
///
/// Panics if any element satisfies the predicate.
pub fn assert_none<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    for (i, item) in collection.iter().enumerate() {
        assert!(
            !predicate(item),
            "Predicate unexpectedly succeeded for element at index {i}:\n  Element: {item:?}\n  Collection: {collection:?}"
        );
    }
}

/// Assert that a pipeline yields the same ordered output sequentially and in
/// parallel with several partition counts.
///
/// `build` is called once per evaluation, since each pipeline value can only
/// be consumed once.
///
/// # Panics
///
/// Panics if any evaluation fails or differs from the sequential result.
pub fn assert_modes_agree<T, F>(build: F)
where
    T: Element + Debug + PartialEq,
    F: Fn() -> Pipeline<T>,
{
    let expected = match build().sequential().collect_vec() {
        Ok(v) => v,
        Err(e) => panic!("Sequential evaluation failed: {e}"),
    };
    for partitions in [1, 2, 3, 7] {
        let actual = match build().parallel_with(None, Some(partitions)).collect_vec() {
            Ok(v) => v,
            Err(e) => panic!("Parallel evaluation with {partitions} partitions failed: {e}"),
        };
        assert_eq!(
            actual, expected,
            "Parallel evaluation with {partitions} partitions diverged from sequential"
        );
    }
}
