//! Basic collectors: `ToVec`, `Counting`

use super::Collector;

/* ===================== ToVec ===================== */

/// Collect all elements into a `Vec<T>` in encounter order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToVec;

impl<T> Collector<T, Vec<T>, Vec<T>> for ToVec {
    fn create(&self) -> Vec<T> {
        Vec::new()
    }

    fn add_input(&self, acc: &mut Vec<T>, value: T) {
        acc.push(value);
    }

    fn merge(&self, acc: &mut Vec<T>, other: Vec<T>) {
        acc.extend(other);
    }

    fn finish(&self, acc: Vec<T>) -> Vec<T> {
        acc
    }
}

/* ===================== Counting ===================== */

/// Count elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counting;

impl<T> Collector<T, u64, u64> for Counting {
    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _value: T) {
        *acc += 1;
    }

    fn merge(&self, acc: &mut u64, other: u64) {
        *acc += other;
    }

    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}
