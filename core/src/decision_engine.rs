// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{FailureConfig, RandomSource};
use std::sync::Arc;
use tonic::Code;

/// Highest value of the pass/fail draw
pub const MAX_DRAW: u32 = 99;

/// Range used when no candidate codes were supplied.
/// Excludes OK (0) and UNAUTHENTICATED (16).
pub const RANDOM_CODE_MIN: u32 = 1;
pub const RANDOM_CODE_MAX: u32 = 15;

/// Outcome of the fault decision for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pass { draw: u32 },
    Fail { code: Code, draw: u32 },
}

impl Decision {
    pub fn is_fail(&self) -> bool {
        matches!(self, Decision::Fail { .. })
    }

    pub fn draw(&self) -> u32 {
        match self {
            Decision::Pass { draw } | Decision::Fail { draw, .. } => *draw,
        }
    }
}

pub struct DecisionEngine<R> {
    random: Arc<R>,
}

impl<R: RandomSource> DecisionEngine<R> {
    pub fn new(random: R) -> Self {
        Self {
            random: Arc::new(random),
        }
    }

    /// Fails when a draw in 0..=99 is strictly below `fail_percent`,
    /// so 0 never fails and 100 always does.
    pub fn decide(&self, config: &FailureConfig) -> Decision {
        let draw = self.random.uniform_int(0, MAX_DRAW);
        if draw >= config.fail_percent {
            return Decision::Pass { draw };
        }

        let code = match config.codes.as_slice() {
            [] => self.any_random_code(),
            [code] => *code,
            codes => self.any_supplied_code(codes),
        };

        Decision::Fail { code, draw }
    }

    fn any_random_code(&self) -> Code {
        Code::from_i32(self.random.uniform_int(RANDOM_CODE_MIN, RANDOM_CODE_MAX) as i32)
    }

    fn any_supplied_code(&self, codes: &[Code]) -> Code {
        let index = self.random.uniform_int(0, (codes.len() - 1) as u32) as usize;
        codes[index]
    }
}

impl<R> Clone for DecisionEngine<R> {
    fn clone(&self) -> Self {
        Self {
            random: Arc::clone(&self.random),
        }
    }
}
