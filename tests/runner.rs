use anyhow::Result;
use ironstream::*;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("ironstream=trace"))
            .with_test_writer()
            .try_init();
    });
}

#[test]
fn default_runner_is_sequential() {
    let r = Runner::default();
    assert_eq!(r.mode, ExecMode::Sequential);
    assert!(r.default_partitions >= 4);
    assert_eq!(from_vec(vec![1]).runner(), r);
}

#[test]
fn runner_from_json_round_trips_through_serde() -> Result<()> {
    let r = Runner::from_json(r#"{"mode": {"mode": "parallel", "threads": 3, "partitions": 6}}"#)?;
    assert_eq!(
        r.mode,
        ExecMode::Parallel {
            threads: Some(3),
            partitions: Some(6)
        }
    );
    let json = serde_json::to_string(&r)?;
    assert_eq!(Runner::from_json(&json)?, r);

    let seq = Runner::from_json(r#"{"mode": {"mode": "sequential"}, "default_partitions": 5}"#)?;
    assert_eq!(seq.mode, ExecMode::Sequential);
    assert_eq!(seq.default_partitions, 5);
    Ok(())
}

#[test]
fn with_runner_applies_loaded_config() -> Result<()> {
    init_tracing();
    let r = Runner::from_json(r#"{"mode": {"mode": "parallel", "partitions": 3}}"#)?;
    let p = from_iter(1..=30).with_runner(r);
    assert_eq!(p.runner(), r);
    assert_eq!(p.explain().mode, r.mode);
    assert_eq!(p.map(|x| x * x).reduce_with(0, |a, b| a + b)?, 9_455);
    Ok(())
}

#[test]
fn mode_switches_share_consumption_state() -> Result<()> {
    let p = from_iter(1..=5);
    let par = p.parallel();
    let back = par.sequential();
    assert!(matches!(par.runner().mode, ExecMode::Parallel { .. }));
    assert_eq!(back.runner().mode, ExecMode::Sequential);
    assert_eq!(p.runner().mode, ExecMode::Sequential);

    assert_eq!(par.count()?, 5);
    assert!(p.is_consumed());
    assert!(back.is_consumed());
    assert!(matches!(back.collect_vec(), Err(StreamError::AlreadyConsumed)));
    Ok(())
}

#[test]
fn consumed_pipeline_cannot_rerun_under_another_mode() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let p = from_iter(1..=3).peek(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(p.count()?, 3);

    assert!(matches!(p.sequential().count(), Err(StreamError::AlreadyConsumed)));
    assert!(matches!(
        p.parallel_with(Some(2), Some(2)).count(),
        Err(StreamError::AlreadyConsumed)
    ));
    assert!(matches!(
        p.with_runner(p.runner()).count(),
        Err(StreamError::AlreadyConsumed)
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // branching off still builds a new value
    assert_eq!(p.parallel().map(|x| x + 1).collect_vec()?, vec![2, 3, 4]);
    assert_eq!(calls.load(Ordering::SeqCst), 6);
    Ok(())
}

#[test]
fn evaluation_with_logging_enabled() -> Result<()> {
    init_tracing();
    let out = from_iter(0..50)
        .parallel_with(Some(2), Some(5))
        .filter(|x| x % 5 == 0)
        .sorted_by(|a, b| b.cmp(a))
        .distinct()
        .collect_vec()?;
    assert_eq!(out, vec![45, 40, 35, 30, 25, 20, 15, 10, 5, 0]);
    Ok(())
}

/// Log sink shared between a subscriber and the test body.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn captured_logs(run: impl FnOnce() -> Result<()>) -> Result<String> {
    let sink = Captured::default();
    let writer = sink.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, run)?;
    let bytes = sink.0.lock().unwrap().clone();
    Ok(String::from_utf8(bytes)?)
}

#[test]
fn evaluation_start_is_logged_once_under_the_terminal_name() -> Result<()> {
    let logs = captured_logs(|| {
        from_iter(0..20)
            .parallel_with(Some(2), Some(4))
            .for_each_ordered(|_| {})?;
        Ok(())
    })?;
    assert_eq!(logs.matches("starting evaluation").count(), 1);
    assert!(logs.contains("for_each_ordered"), "{logs}");

    let logs = captured_logs(|| {
        from_iter(0..20).try_grouping_by(|x| Ok(x % 2))?;
        Ok(())
    })?;
    assert_eq!(logs.matches("starting evaluation").count(), 1);
    assert!(logs.contains("grouping_by"), "{logs}");
    Ok(())
}
