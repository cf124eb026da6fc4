// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod call_metadata;
pub use call_metadata::CallMetadata;

pub mod fault_config;
pub use fault_config::FailureConfig;

mod fault_error;
pub use fault_error::FaultError;

mod random_source;
pub use random_source::{RandomSource, SeededRandom, ThreadLocalRandom};

pub mod parameter_resolver;

pub mod decision_engine;
pub use decision_engine::{Decision, DecisionEngine};

mod outcome_counters;
pub use outcome_counters::{CounterSnapshot, OutcomeCounters};

mod fault_injection_interceptor;
pub use fault_injection_interceptor::{FaultInjectionInterceptor, InterceptorConfig};

mod echo_service;
pub use echo_service::EchoService;

mod metadata_stamper;
pub use metadata_stamper::FailureMetadataStamper;

pub mod retry_policy;
pub use retry_policy::{PolicyError, RetryPolicy};

mod status_retry_policy;
pub use status_retry_policy::StatusRetryPolicy;

mod config;
pub use config::{ClientConfig, ServerConfig};

mod grpc_client;
pub use grpc_client::{ClientReport, GrpcClient};

mod server_runner;
pub use server_runner::ServerRunner;

/// Fully qualified service name used to look up the retry policy
pub const ECHO_SERVICE_NAME: &str = "echo.Echo";
pub const UNARY_ECHO_METHOD: &str = "UnaryEcho";

pub mod rpc {
    pub mod proto {
        include!("../.generated/echo.rs");
    }
}
