// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::rpc::proto::{echo_client::EchoClient, EchoRequest};
use crate::{ClientConfig, FailureMetadataStamper, RetryPolicy, StatusRetryPolicy};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tonic::transport::Endpoint;
use tonic::Code;
use tower::retry::Retry;
use tower::{service_fn, ServiceExt};
use tracing::info;

/// Final tally of a client run, one entry per call after all retries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientReport {
    pub successes: u64,
    /// Failed calls keyed by their final status code
    pub failures: BTreeMap<i32, u64>,
    pub retries: u64,
}

impl ClientReport {
    fn record_success(&mut self) {
        self.successes += 1;
    }

    fn record_failure(&mut self, code: Code) {
        *self.failures.entry(code as i32).or_insert(0) += 1;
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }

    pub fn failures_with(&self, code: Code) -> u64 {
        self.failures.get(&(code as i32)).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u64 {
        self.successes + self.total_failures()
    }
}

/// Drives unary echo calls through the retry layer, stamping each call with
/// the configured failure parameters.
pub struct GrpcClient {
    config: ClientConfig,
    retry_policy: Option<RetryPolicy>,
    cancellation_token: CancellationToken,
}

impl GrpcClient {
    pub fn new(config: ClientConfig, retry_policy: Option<RetryPolicy>) -> Self {
        Self {
            config,
            retry_policy,
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub async fn start(
        self,
    ) -> Result<ClientReport, Box<dyn std::error::Error + Send + Sync>> {
        let (fail_percent, codes) = self.config.validate()?;

        let channel = Endpoint::from_shared(self.config.server_address.clone())?
            .connect()
            .await?;
        let stamper = FailureMetadataStamper::new(fail_percent, &codes)?;
        let client = EchoClient::with_interceptor(channel, stamper);
        info!(
            "connected to {} (failpercent={} failcodes={:?}, retry policy: {:?})",
            self.config.server_address, fail_percent, codes, self.retry_policy
        );

        let retry_policy = StatusRetryPolicy::new(self.retry_policy.clone());
        let service = Retry::new(
            retry_policy.clone(),
            service_fn(move |request: EchoRequest| {
                let mut client = client.clone();
                async move { client.unary_echo(request).await }
            }),
        );

        let call_timeout = Duration::from_millis(self.config.call_timeout_ms);
        let mut report = ClientReport::default();

        for i in 0..self.config.loops {
            let request = EchoRequest {
                message: self.config.message.clone(),
            };

            // Dropping the in-flight call cancels it on the wire
            let outcome = tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    info!("shutting down client after {} calls", i);
                    break;
                }
                outcome = tokio::time::timeout(call_timeout, service.clone().oneshot(request)) => {
                    outcome
                }
            };

            match outcome {
                Ok(Ok(reply)) => {
                    info!("i:{} UnaryEcho reply: {}", i, reply.get_ref().message);
                    report.record_success();
                }
                Ok(Err(status)) => {
                    info!("i:{} UnaryEcho error: {:?} {}", i, status.code(), status.message());
                    report.record_failure(status.code());
                }
                Err(_) => {
                    info!("i:{} UnaryEcho deadline of {:?} exceeded", i, call_timeout);
                    report.record_failure(Code::DeadlineExceeded);
                }
            }
        }

        report.retries = retry_policy.retries_scheduled();
        info!(
            "client finished: {} succeeded, {} failed {:?}, {} retries",
            report.successes,
            report.total_failures(),
            report.failures,
            report.retries
        );
        Ok(report)
    }
}
