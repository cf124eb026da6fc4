// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use fault_injection_core::RandomSource;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tonic::metadata::MetadataMap;

/// Random source replaying a fixed script of draws and recording the
/// ranges it was asked for
#[derive(Clone, Default)]
pub struct ScriptedRandom {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    draws: VecDeque<u32>,
    ranges: Vec<(u32, u32)>,
}

impl ScriptedRandom {
    pub fn new(draws: &[u32]) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Script {
                draws: draws.iter().copied().collect(),
                ranges: Vec::new(),
            })),
        }
    }

    pub fn ranges(&self) -> Vec<(u32, u32)> {
        self.inner.lock().unwrap().ranges.clone()
    }

    pub fn remaining(&self) -> usize {
        self.inner.lock().unwrap().draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform_int(&self, low: u32, high: u32) -> u32 {
        let mut script = self.inner.lock().unwrap();
        script.ranges.push((low, high));
        let draw = script.draws.pop_front().expect("script exhausted");
        assert!(
            (low..=high).contains(&draw),
            "scripted draw {} outside {}..={}",
            draw,
            low,
            high
        );
        draw
    }
}

pub fn metadata(entries: &[(&'static str, &str)]) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    for (key, value) in entries {
        metadata.append(*key, value.parse().unwrap());
    }
    metadata
}
