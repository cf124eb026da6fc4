// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running tallies of admitted and rejected calls.
/// Shared by every in-flight call; never reset.
#[derive(Debug, Default)]
pub struct OutcomeCounters {
    success: AtomicU64,
    failure: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub success: u64,
    pub failure: u64,
}

impl OutcomeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the count including this call
    pub fn record_success(&self) -> u64 {
        self.success.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the count including this call
    pub fn record_failure(&self) -> u64 {
        self.failure.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn success_count(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            success: self.success_count(),
            failure: self.failure_count(),
        }
    }
}

impl CounterSnapshot {
    pub fn total(&self) -> u64 {
        self.success + self.failure
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "success={} failure={}", self.success, self.failure)
    }
}
