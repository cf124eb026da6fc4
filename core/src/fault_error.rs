// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use tonic::Status;

/// Rejections raised while resolving the per-call failure parameters.
/// Every variant reaches the caller as `INVALID_ARGUMENT`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FaultError {
    /// The transport attached no metadata to the call
    #[error("missing metadata")]
    MissingMetadata,

    /// `failpercent` is not an integer
    #[error("failpercent '{0}' is not an integer")]
    UnparsableFailPercent(String),

    /// `failpercent` is outside 0-100
    #[error("failpercent {0} is outside 0-100")]
    FailPercentOutOfRange(i64),

    /// A `failcodes` segment is not an integer
    #[error("failcodes segment '{0}' is not an integer")]
    UnparsableFailCode(String),

    /// A `failcodes` segment is outside 0-16
    #[error("failcodes value {0} is outside 0-16")]
    FailCodeOutOfRange(i64),
}

impl From<FaultError> for Status {
    fn from(error: FaultError) -> Self {
        Status::invalid_argument(error.to_string())
    }
}
