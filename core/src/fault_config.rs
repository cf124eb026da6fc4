// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::FaultError;
use tonic::Code;

pub const MAX_FAIL_PERCENT: i64 = 100;

/// Highest status code accepted in `failcodes` (UNAUTHENTICATED)
pub const MAX_FAIL_CODE: i64 = 16;

/// Failure parameters resolved for a single call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureConfig {
    /// Probability (0-100) that the call is rejected
    pub fail_percent: u32,
    /// Candidate codes for a rejection; empty means any code in 1-15
    pub codes: Vec<Code>,
}

impl FailureConfig {
    pub fn new(fail_percent: u32, codes: Vec<Code>) -> Self {
        Self {
            fail_percent,
            codes,
        }
    }
}

/// Ensure the percentage is between 0-100 inclusive
pub fn validate_fail_percent(value: i64) -> Result<u32, FaultError> {
    if !(0..=MAX_FAIL_PERCENT).contains(&value) {
        return Err(FaultError::FailPercentOutOfRange(value));
    }
    Ok(value as u32)
}

/// Ensure the code is between 0-16 inclusive
pub fn validate_fail_code(value: i64) -> Result<Code, FaultError> {
    if !(0..=MAX_FAIL_CODE).contains(&value) {
        return Err(FaultError::FailCodeOutOfRange(value));
    }
    Ok(Code::from_i32(value as i32))
}

/// Parse a decimal percentage, e.g. "10" (10%) or "90" (90%)
pub fn parse_fail_percent(raw: &str) -> Result<u32, FaultError> {
    let value = raw
        .parse::<i64>()
        .map_err(|_| FaultError::UnparsableFailPercent(raw.to_string()))?;
    validate_fail_percent(value)
}

/// Parse a single code ("14") or a comma separated list ("10,12,14").
/// The first bad segment rejects the whole list.
pub fn parse_fail_codes(raw: &str) -> Result<Vec<Code>, FaultError> {
    raw.split(',')
        .map(|segment| {
            let value = segment
                .parse::<i64>()
                .map_err(|_| FaultError::UnparsableFailCode(segment.to_string()))?;
            validate_fail_code(value)
        })
        .collect()
}

/// Render codes the way they travel in the `failcodes` header
pub fn join_fail_codes(codes: &[Code]) -> String {
    codes
        .iter()
        .map(|code| (*code as i32).to_string())
        .collect::<Vec<_>>()
        .join(",")
}
