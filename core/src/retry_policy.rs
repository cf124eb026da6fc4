// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::Deserialize;
use std::fs;
use std::time::Duration;
use tonic::Code;

/// gRPC caps the number of attempts regardless of the document
pub const MAX_ATTEMPTS_CAP: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("maxAttempts must be at least 2, got {0}")]
    InvalidMaxAttempts(u32),

    #[error("{field} must be a positive duration like \"0.1s\", got \"{value}\"")]
    InvalidDuration { field: &'static str, value: String },

    #[error("backoffMultiplier must be positive, got {0}")]
    InvalidMultiplier(f64),

    #[error("retryableStatusCodes must not be empty")]
    NoRetryableCodes,

    #[error("unknown status code {0}")]
    UnknownStatusCode(String),
}

/// Subset of a gRPC service config that carries retry policies
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceConfigDocument {
    #[serde(default)]
    method_config: Vec<MethodConfigDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MethodConfigDocument {
    #[serde(default)]
    name: Vec<MethodNameDocument>,
    #[serde(default)]
    retry_policy: Option<RetryPolicyDocument>,
}

#[derive(Debug, Deserialize)]
struct MethodNameDocument {
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    method: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetryPolicyDocument {
    max_attempts: u32,
    initial_backoff: String,
    max_backoff: String,
    backoff_multiplier: f64,
    retryable_status_codes: Vec<StatusCodeDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusCodeDocument {
    Name(String),
    Number(i64),
}

/// Validated retry policy for one method
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    pub retryable_codes: Vec<Code>,
}

impl RetryPolicy {
    /// Load the policy that applies to `service/method` from a service config file.
    /// Returns `None` when no method config with a retry policy matches.
    pub fn load(path: &str, service: &str, method: &str) -> Result<Option<Self>, PolicyError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents, service, method)
    }

    pub fn from_json(json: &str, service: &str, method: &str) -> Result<Option<Self>, PolicyError> {
        let document: ServiceConfigDocument = serde_json::from_str(json)?;

        // Method specific entries win over service wide ones, which win over defaults
        let rank = |config: &MethodConfigDocument| {
            config
                .name
                .iter()
                .filter_map(|name| match (name.service.as_deref(), name.method.as_deref()) {
                    (Some(s), Some(m)) if s == service && m == method => Some(0),
                    (Some(s), None) if s == service => Some(1),
                    (Some(""), None) | (None, None) => Some(2),
                    _ => None,
                })
                .min()
        };

        let selected = document
            .method_config
            .iter()
            .filter(|config| config.retry_policy.is_some())
            .filter_map(|config| rank(config).map(|rank| (rank, config)))
            .min_by_key(|(rank, _)| *rank);

        match selected.and_then(|(_, config)| config.retry_policy.as_ref()) {
            Some(document) => Self::from_document(document).map(Some),
            None => Ok(None),
        }
    }

    fn from_document(document: &RetryPolicyDocument) -> Result<Self, PolicyError> {
        if document.max_attempts < 2 {
            return Err(PolicyError::InvalidMaxAttempts(document.max_attempts));
        }
        if !(document.backoff_multiplier > 0.0) {
            return Err(PolicyError::InvalidMultiplier(document.backoff_multiplier));
        }
        if document.retryable_status_codes.is_empty() {
            return Err(PolicyError::NoRetryableCodes);
        }

        let retryable_codes = document
            .retryable_status_codes
            .iter()
            .map(|entry| match entry {
                StatusCodeDocument::Name(name) => code_from_name(name),
                StatusCodeDocument::Number(number) => code_from_number(*number),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            max_attempts: document.max_attempts.min(MAX_ATTEMPTS_CAP),
            initial_backoff: parse_duration("initialBackoff", &document.initial_backoff)?,
            max_backoff: parse_duration("maxBackoff", &document.max_backoff)?,
            backoff_multiplier: document.backoff_multiplier,
            retryable_codes,
        })
    }

    pub fn is_retryable(&self, code: Code) -> bool {
        self.retryable_codes.contains(&code)
    }

    /// Delay before retry number `retry` (1 based), scaled by `jitter` in 0..1
    pub fn backoff(&self, retry: u32, jitter: f64) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let ceiling = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let ceiling = ceiling.min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(ceiling * jitter.clamp(0.0, 1.0))
    }
}

fn parse_duration(field: &'static str, value: &str) -> Result<Duration, PolicyError> {
    let invalid = || PolicyError::InvalidDuration {
        field,
        value: value.to_string(),
    };

    let seconds = value
        .strip_suffix('s')
        .and_then(|number| number.parse::<f64>().ok())
        .ok_or_else(invalid)?;
    if !(seconds > 0.0) {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
}

fn code_from_number(number: i64) -> Result<Code, PolicyError> {
    if !(0..=16).contains(&number) {
        return Err(PolicyError::UnknownStatusCode(number.to_string()));
    }
    Ok(Code::from_i32(number as i32))
}

/// Map a canonical status code name such as "UNAVAILABLE" to its code
pub fn code_from_name(name: &str) -> Result<Code, PolicyError> {
    let code = match name.to_ascii_uppercase().as_str() {
        "OK" => Code::Ok,
        "CANCELLED" => Code::Cancelled,
        "UNKNOWN" => Code::Unknown,
        "INVALID_ARGUMENT" => Code::InvalidArgument,
        "DEADLINE_EXCEEDED" => Code::DeadlineExceeded,
        "NOT_FOUND" => Code::NotFound,
        "ALREADY_EXISTS" => Code::AlreadyExists,
        "PERMISSION_DENIED" => Code::PermissionDenied,
        "RESOURCE_EXHAUSTED" => Code::ResourceExhausted,
        "FAILED_PRECONDITION" => Code::FailedPrecondition,
        "ABORTED" => Code::Aborted,
        "OUT_OF_RANGE" => Code::OutOfRange,
        "UNIMPLEMENTED" => Code::Unimplemented,
        "INTERNAL" => Code::Internal,
        "UNAVAILABLE" => Code::Unavailable,
        "DATA_LOSS" => Code::DataLoss,
        "UNAUTHENTICATED" => Code::Unauthenticated,
        _ => return Err(PolicyError::UnknownStatusCode(name.to_string())),
    };
    Ok(code)
}
