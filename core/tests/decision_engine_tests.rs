// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod common;

use common::ScriptedRandom;
use fault_injection_core::decision_engine::{MAX_DRAW, RANDOM_CODE_MAX, RANDOM_CODE_MIN};
use fault_injection_core::{Decision, DecisionEngine, FailureConfig, SeededRandom};
use std::collections::HashMap;
use tonic::Code;

#[test]
fn test_draw_below_percent_fails() {
    let random = ScriptedRandom::new(&[29, 3]);
    let engine = DecisionEngine::new(random.clone());

    let decision = engine.decide(&FailureConfig::new(30, vec![]));
    assert_eq!(
        decision,
        Decision::Fail {
            code: Code::InvalidArgument,
            draw: 29
        }
    );
    assert_eq!(random.ranges(), vec![(0, MAX_DRAW), (RANDOM_CODE_MIN, RANDOM_CODE_MAX)]);
}

#[test]
fn test_draw_equal_to_percent_passes() {
    let random = ScriptedRandom::new(&[30]);
    let engine = DecisionEngine::new(random.clone());

    let decision = engine.decide(&FailureConfig::new(30, vec![Code::Unavailable]));
    assert_eq!(decision, Decision::Pass { draw: 30 });
    // No code is drawn on the pass path
    assert_eq!(random.ranges(), vec![(0, 99)]);
}

#[test]
fn test_zero_percent_never_fails() {
    let random = ScriptedRandom::new(&[0]);
    let engine = DecisionEngine::new(random);
    assert!(!engine.decide(&FailureConfig::new(0, vec![])).is_fail());
}

#[test]
fn test_hundred_percent_always_fails() {
    let random = ScriptedRandom::new(&[99, 7]);
    let engine = DecisionEngine::new(random);
    let decision = engine.decide(&FailureConfig::new(100, vec![]));
    assert!(decision.is_fail());
    assert_eq!(decision.draw(), 99);
}

#[test]
fn test_single_code_is_used_without_extra_draw() {
    let random = ScriptedRandom::new(&[0]);
    let engine = DecisionEngine::new(random.clone());

    let decision = engine.decide(&FailureConfig::new(100, vec![Code::Unavailable]));
    assert_eq!(
        decision,
        Decision::Fail {
            code: Code::Unavailable,
            draw: 0
        }
    );
    assert_eq!(random.remaining(), 0);
    assert_eq!(random.ranges().len(), 1);
}

#[test]
fn test_multiple_codes_draw_an_index() {
    let codes = vec![Code::DeadlineExceeded, Code::ResourceExhausted, Code::Unavailable];
    let random = ScriptedRandom::new(&[10, 2, 50, 0]);
    let engine = DecisionEngine::new(random.clone());
    let config = FailureConfig::new(60, codes);

    assert_eq!(
        engine.decide(&config),
        Decision::Fail {
            code: Code::Unavailable,
            draw: 10
        }
    );
    assert_eq!(
        engine.decide(&config),
        Decision::Fail {
            code: Code::DeadlineExceeded,
            draw: 50
        }
    );
    assert_eq!(random.ranges(), vec![(0, 99), (0, 2), (0, 99), (0, 2)]);
}

#[test]
fn test_failure_rate_converges_to_percent() {
    const CALLS: usize = 10_000;

    for fail_percent in [0u32, 10, 30, 75, 100] {
        let engine = DecisionEngine::new(SeededRandom::new(u64::from(fail_percent) + 1));
        let config = FailureConfig::new(fail_percent, vec![]);

        let failures = (0..CALLS)
            .filter(|_| engine.decide(&config).is_fail())
            .count();

        match fail_percent {
            0 => assert_eq!(failures, 0),
            100 => assert_eq!(failures, CALLS),
            _ => {
                let rate = failures as f64 / CALLS as f64;
                let expected = f64::from(fail_percent) / 100.0;
                assert!(
                    (rate - expected).abs() < 0.02,
                    "failpercent {} produced rate {}",
                    fail_percent,
                    rate
                );
            }
        }
    }
}

#[test]
fn test_random_codes_never_ok_or_unauthenticated() {
    let engine = DecisionEngine::new(SeededRandom::new(11));
    let config = FailureConfig::new(100, vec![]);
    let mut seen = HashMap::new();

    for _ in 0..3_000 {
        match engine.decide(&config) {
            Decision::Fail { code, .. } => {
                let value = code as i32;
                assert!((1..=15).contains(&value), "unexpected code {}", value);
                *seen.entry(value).or_insert(0) += 1;
            }
            Decision::Pass { .. } => panic!("failpercent 100 must always fail"),
        }
    }

    assert_eq!(seen.len(), 15, "every code in 1..=15 should appear");
}

#[test]
fn test_every_single_code_is_honored() {
    for value in 1..=16 {
        let code = Code::from_i32(value);
        let engine = DecisionEngine::new(SeededRandom::new(value as u64));
        let config = FailureConfig::new(100, vec![code]);

        for _ in 0..50 {
            match engine.decide(&config) {
                Decision::Fail { code: chosen, .. } => assert_eq!(chosen, code),
                Decision::Pass { .. } => panic!("failpercent 100 must always fail"),
            }
        }
    }
}

#[test]
fn test_supplied_codes_are_chosen_uniformly() {
    const CALLS: usize = 3_000;
    let codes = vec![Code::DeadlineExceeded, Code::ResourceExhausted, Code::Unavailable];
    let engine = DecisionEngine::new(SeededRandom::new(4814));
    let config = FailureConfig::new(100, codes.clone());
    let mut seen: HashMap<i32, usize> = HashMap::new();

    for _ in 0..CALLS {
        if let Decision::Fail { code, .. } = engine.decide(&config) {
            assert!(codes.contains(&code));
            *seen.entry(code as i32).or_insert(0) += 1;
        }
    }

    assert_eq!(seen.values().sum::<usize>(), CALLS);
    for code in &codes {
        let count = seen.get(&(*code as i32)).copied().unwrap_or(0);
        assert!(
            (850..=1150).contains(&count),
            "code {:?} chosen {} times",
            code,
            count
        );
    }
}
