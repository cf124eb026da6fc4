// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fault_injection_core::{CounterSnapshot, OutcomeCounters};
use std::sync::Arc;
use std::thread;

#[test]
fn test_counters_start_at_zero() {
    let counters = OutcomeCounters::new();
    assert_eq!(
        counters.snapshot(),
        CounterSnapshot {
            success: 0,
            failure: 0
        }
    );
}

#[test]
fn test_record_returns_running_count() {
    let counters = OutcomeCounters::new();
    assert_eq!(counters.record_success(), 1);
    assert_eq!(counters.record_success(), 2);
    assert_eq!(counters.record_failure(), 1);
    assert_eq!(counters.success_count(), 2);
    assert_eq!(counters.failure_count(), 1);
    assert_eq!(counters.snapshot().total(), 3);
    assert_eq!(counters.snapshot().to_string(), "success=2 failure=1");
}

#[test]
fn test_concurrent_increments_are_not_lost() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 5_000;

    let counters = Arc::new(OutcomeCounters::new());
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let counters = Arc::clone(&counters);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    if (i + t) % 3 == 0 {
                        counters.record_failure();
                    } else {
                        counters.record_success();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(counters.snapshot().total(), (THREADS * PER_THREAD) as u64);
}

#[test]
fn test_isolated_counters_do_not_share_state() {
    let first = OutcomeCounters::new();
    let second = OutcomeCounters::new();
    first.record_failure();
    assert_eq!(second.failure_count(), 0);
}
