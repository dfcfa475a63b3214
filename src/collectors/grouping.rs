//! Keyed collectors: `GroupingBy`, `PartitioningBy`

use super::Collector;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

/* ===================== GroupingBy ===================== */

/// Group elements by a classifier key.
///
/// - Accumulator / output: `HashMap<K, Vec<T>>`
///
/// Within each group elements keep encounter order. Key enumeration order is
/// whatever `HashMap` yields and is not meaningful.
pub struct GroupingBy<T, K, F> {
    classifier: F,
    _t: PhantomData<fn(&T) -> K>,
}

impl<T, K, F> GroupingBy<T, K, F>
where
    F: Fn(&T) -> K,
{
    pub fn new(classifier: F) -> Self {
        Self {
            classifier,
            _t: PhantomData,
        }
    }
}

impl<T, K, F> Collector<T, HashMap<K, Vec<T>>, HashMap<K, Vec<T>>> for GroupingBy<T, K, F>
where
    K: Eq + Hash,
    F: Fn(&T) -> K + Send + Sync,
{
    fn create(&self) -> HashMap<K, Vec<T>> {
        HashMap::new()
    }

    fn add_input(&self, acc: &mut HashMap<K, Vec<T>>, value: T) {
        acc.entry((self.classifier)(&value)).or_default().push(value);
    }

    fn merge(&self, acc: &mut HashMap<K, Vec<T>>, other: HashMap<K, Vec<T>>) {
        for (k, vs) in other {
            acc.entry(k).or_default().extend(vs);
        }
    }

    fn finish(&self, acc: HashMap<K, Vec<T>>) -> HashMap<K, Vec<T>> {
        acc
    }
}

/* ===================== PartitioningBy ===================== */

/// Split elements into a `true` group and a `false` group.
///
/// - Accumulator: `(Vec<T>, Vec<T>)` (matching, rest)
/// - Output: `HashMap<bool, Vec<T>>` with **both** keys always present
pub struct PartitioningBy<T, P> {
    pred: P,
    _t: PhantomData<fn(&T)>,
}

impl<T, P> PartitioningBy<T, P>
where
    P: Fn(&T) -> bool,
{
    pub fn new(pred: P) -> Self {
        Self {
            pred,
            _t: PhantomData,
        }
    }
}

impl<T, P> Collector<T, (Vec<T>, Vec<T>), HashMap<bool, Vec<T>>> for PartitioningBy<T, P>
where
    P: Fn(&T) -> bool + Send + Sync,
{
    fn create(&self) -> (Vec<T>, Vec<T>) {
        (Vec::new(), Vec::new())
    }

    fn add_input(&self, acc: &mut (Vec<T>, Vec<T>), value: T) {
        if (self.pred)(&value) {
            acc.0.push(value);
        } else {
            acc.1.push(value);
        }
    }

    fn merge(&self, acc: &mut (Vec<T>, Vec<T>), other: (Vec<T>, Vec<T>)) {
        acc.0.extend(other.0);
        acc.1.extend(other.1);
    }

    fn finish(&self, acc: (Vec<T>, Vec<T>)) -> HashMap<bool, Vec<T>> {
        HashMap::from([(true, acc.0), (false, acc.1)])
    }
}
