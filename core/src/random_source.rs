// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::Mutex;

/// Source of uniformly distributed integers for the decision engine
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `low..=high`
    fn uniform_int(&self, low: u32, high: u32) -> u32;
}

/// Per-thread fastrand generator; draws never contend on a shared lock
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLocalRandom;

impl RandomSource for ThreadLocalRandom {
    fn uniform_int(&self, low: u32, high: u32) -> u32 {
        fastrand::u32(low..=high)
    }
}

/// Single seeded generator for reproducible runs.
/// Draws are serialized, so prefer [`ThreadLocalRandom`] under load.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<fastrand::Rng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform_int(&self, low: u32, high: u32) -> u32 {
        // A poisoned lock still holds a usable generator
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.u32(low..=high)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn uniform_int(&self, low: u32, high: u32) -> u32 {
        (**self).uniform_int(low, high)
    }
}
