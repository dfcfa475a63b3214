use anyhow::Result;
use ironstream::*;
use std::collections::BTreeSet;

/// Joins strings with a separator; merge keeps partition order.
struct Joining(&'static str);

impl Collector<String, Vec<String>, String> for Joining {
    fn create(&self) -> Vec<String> {
        Vec::new()
    }

    fn add_input(&self, acc: &mut Vec<String>, value: String) {
        acc.push(value);
    }

    fn merge(&self, acc: &mut Vec<String>, other: Vec<String>) {
        acc.extend(other);
    }

    fn finish(&self, acc: Vec<String>) -> String {
        acc.join(self.0)
    }
}

/// Sorted set of distinct values.
struct ToSortedSet;

impl<T: Ord> Collector<T, BTreeSet<T>, Vec<T>> for ToSortedSet {
    fn create(&self) -> BTreeSet<T> {
        BTreeSet::new()
    }

    fn add_input(&self, acc: &mut BTreeSet<T>, value: T) {
        acc.insert(value);
    }

    fn merge(&self, acc: &mut BTreeSet<T>, other: BTreeSet<T>) {
        acc.extend(other);
    }

    fn finish(&self, acc: BTreeSet<T>) -> Vec<T> {
        acc.into_iter().collect()
    }
}

#[test]
fn builtin_collectors() -> Result<()> {
    assert_eq!(from_iter(1..=3).collect_with(ToVec)?, vec![1, 2, 3]);
    assert_eq!(from_iter(1..=3).collect_with(Counting)?, 3);

    let groups = from_iter(1..=6).collect_with(GroupingBy::new(|x: &i32| x % 3))?;
    assert_eq!(groups[&0], vec![3, 6]);
    assert_eq!(groups[&1], vec![1, 4]);

    let parts = from_iter(1..=6).collect_with(PartitioningBy::new(|x: &i32| *x > 4))?;
    assert_eq!(parts[&true], vec![5, 6]);
    assert_eq!(parts[&false], vec![1, 2, 3, 4]);

    let stats = from_vec(vec![10u8, 20, 30]).collect_with(Summarizing::new())?;
    assert_eq!(stats.sum, 60);
    Ok(())
}

#[test]
fn custom_collector_sequential_and_parallel() -> Result<()> {
    let words = || from_iter((0..40).map(|i| format!("w{i}")));
    let seq = words().collect_with(Joining(","))?;
    let par = words().parallel_with(None, Some(6)).collect_with(Joining(","))?;
    assert_eq!(seq, par);
    assert!(seq.starts_with("w0,w1,w2"));
    assert!(seq.ends_with("w38,w39"));
    Ok(())
}

#[test]
fn generic_custom_collector() -> Result<()> {
    let out = from_vec(vec![5, 3, 5, 1, 3])
        .parallel_with(None, Some(3))
        .collect_with(ToSortedSet)?;
    assert_eq!(out, vec![1, 3, 5]);
    Ok(())
}

#[test]
fn collectors_on_empty_input() -> Result<()> {
    assert!(empty::<i32>().collect_with(ToVec)?.is_empty());
    assert_eq!(empty::<i32>().parallel().collect_with(Counting)?, 0);
    assert!(
        empty::<i32>()
            .collect_with(GroupingBy::new(|x: &i32| *x))?
            .is_empty()
    );
    let s = empty::<i64>().collect_with(Summarizing::new())?;
    assert_eq!(s, SummaryStatistics::default());
    assert_eq!(
        s.to_string(),
        "SummaryStatistics{count=0, sum=0, min=none, average=0.000000, max=none}"
    );
    Ok(())
}
