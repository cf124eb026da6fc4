// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::fault_config::{validate_fail_code, validate_fail_percent};
use crate::FaultError;
use serde::{Deserialize, Serialize};
use std::fs;
use tonic::Code;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Probability (0-100) applied to calls that carry no `failpercent`
    #[serde(default = "default_fail_percent")]
    pub default_fail_percent: i64,
    /// Seconds between counter reports (0 = only report at shutdown)
    #[serde(default = "default_report_interval")]
    pub counter_report_interval_secs: u64,
    /// Seed for reproducible decisions; unset uses thread local randomness
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_server_address")]
    pub server_address: String,
    #[serde(default = "default_loops")]
    pub loops: u64,
    /// Probability (0-100) stamped on every call
    #[serde(default = "default_fail_percent")]
    pub fail_percent: i64,
    /// Codes stamped on every call; empty lets the server pick
    #[serde(default = "default_fail_codes")]
    pub fail_codes: Vec<i64>,
    /// Deadline for one call including all of its retries
    #[serde(default = "default_call_timeout")]
    pub call_timeout_ms: u64,
    /// gRPC service config JSON holding the retry policy
    #[serde(default = "default_policy_path")]
    pub policy_path: String,
    #[serde(default = "default_message")]
    pub message: String,
}

fn default_listen_address() -> String {
    "0.0.0.0:50052".to_string()
}

fn default_fail_percent() -> i64 {
    50
}

fn default_report_interval() -> u64 {
    10
}

fn default_server_address() -> String {
    "http://localhost:50052".to_string()
}

fn default_loops() -> u64 {
    10
}

fn default_fail_codes() -> Vec<i64> {
    vec![4, 8, 14]
}

fn default_call_timeout() -> u64 {
    1000
}

fn default_policy_path() -> String {
    "retry_policy.json".to_string()
}

fn default_message() -> String {
    "Try and Success".to_string()
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let contents = fs::read_to_string(path)?;
        let config: ServerConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<u32, FaultError> {
        validate_fail_percent(self.default_fail_percent)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            default_fail_percent: default_fail_percent(),
            counter_report_interval_secs: default_report_interval(),
            seed: None,
        }
    }
}

impl ClientConfig {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let contents = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Validated (percent, codes) pair to stamp on outbound calls
    pub fn validate(&self) -> Result<(u32, Vec<Code>), FaultError> {
        let fail_percent = validate_fail_percent(self.fail_percent)?;
        let codes = self
            .fail_codes
            .iter()
            .map(|code| validate_fail_code(*code))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((fail_percent, codes))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            loops: default_loops(),
            fail_percent: default_fail_percent(),
            fail_codes: default_fail_codes(),
            call_timeout_ms: default_call_timeout(),
            policy_path: default_policy_path(),
            message: default_message(),
        }
    }
}
