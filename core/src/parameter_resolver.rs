// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::call_metadata::{CallMetadata, FAIL_CODES_KEY, FAIL_PERCENT_KEY};
use crate::fault_config::{parse_fail_codes, parse_fail_percent};
use crate::{FailureConfig, FaultError};
use tonic::Code;
use tracing::debug;

/// Resolve the failure parameters for one call.
///
/// Overrides found in the metadata win over `default_fail_percent`, which is
/// expected to have been validated at startup. A malformed override rejects
/// the call instead of falling back to the default.
pub fn resolve_failure_config<M: CallMetadata + ?Sized>(
    default_fail_percent: u32,
    metadata: Option<&M>,
) -> Result<FailureConfig, FaultError> {
    let metadata = metadata.ok_or(FaultError::MissingMetadata)?;

    let fail_percent = resolve_fail_percent(default_fail_percent, metadata)?;
    let codes = resolve_fail_codes(metadata)?;

    Ok(FailureConfig::new(fail_percent, codes))
}

/// Reads `failpercent`, e.g. failpercent = 10 (10%)
pub fn resolve_fail_percent<M: CallMetadata + ?Sized>(
    default_fail_percent: u32,
    metadata: &M,
) -> Result<u32, FaultError> {
    match metadata.get_single(FAIL_PERCENT_KEY) {
        Some(raw) => {
            let fail_percent = parse_fail_percent(&raw)?;
            debug!("failpercent {} from metadata", fail_percent);
            Ok(fail_percent)
        }
        None => Ok(default_fail_percent),
    }
}

/// Reads `failcodes`, e.g. failcodes = 14 (UNAVAILABLE) or failcodes = 10,12,14.
/// Only the first value of the key is considered.
pub fn resolve_fail_codes<M: CallMetadata + ?Sized>(
    metadata: &M,
) -> Result<Vec<Code>, FaultError> {
    match metadata.get_list(FAIL_CODES_KEY).first() {
        Some(raw) => parse_fail_codes(raw),
        None => Ok(Vec::new()),
    }
}
