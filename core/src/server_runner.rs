// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::rpc::proto::echo_server::EchoServer;
use crate::{
    CounterSnapshot, EchoService, FaultError, FaultInjectionInterceptor, InterceptorConfig,
    OutcomeCounters, RandomSource, SeededRandom, ServerConfig, ThreadLocalRandom,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tracing::info;

/// Runs the echo service behind the fault injection interceptor until
/// Ctrl+C or cancellation, reporting the outcome counters along the way.
pub struct ServerRunner {
    interceptor: FaultInjectionInterceptor<Box<dyn RandomSource>>,
    counters: Arc<OutcomeCounters>,
    report_interval: Option<Duration>,
    cancellation_token: CancellationToken,
}

impl ServerRunner {
    pub fn new(config: &ServerConfig) -> Result<Self, FaultError> {
        let interceptor_config = InterceptorConfig::new(config.default_fail_percent)?;
        let counters = Arc::new(OutcomeCounters::new());

        let random: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(ThreadLocalRandom),
        };

        let report_interval = match config.counter_report_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            interceptor: FaultInjectionInterceptor::with_random(
                interceptor_config,
                Arc::clone(&counters),
                random,
            ),
            counters,
            report_interval,
            cancellation_token: CancellationToken::new(),
        })
    }

    pub fn counters(&self) -> Arc<OutcomeCounters> {
        Arc::clone(&self.counters)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub async fn run(
        self,
        addr: &str,
    ) -> Result<CounterSnapshot, Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(addr).await?;
        self.run_with_listener(listener).await
    }

    /// Serve on an already bound listener and return the final counters
    pub async fn run_with_listener(
        self,
        listener: TcpListener,
    ) -> Result<CounterSnapshot, Box<dyn std::error::Error + Send + Sync>> {
        info!("echo server listening on {}", listener.local_addr()?);
        let incoming = TcpListenerStream::new(listener);

        let reporter = self.report_interval.map(|period| {
            tokio::spawn(report_counters(
                Arc::clone(&self.counters),
                period,
                self.cancellation_token.clone(),
            ))
        });

        let token = self.cancellation_token.clone();
        let shutdown_signal = async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("received Ctrl+C, shutting down");
                }
                _ = token.cancelled() => {
                    info!("shutdown requested");
                }
            }
        };

        let served = Server::builder()
            .add_service(EchoServer::with_interceptor(EchoService, self.interceptor))
            .serve_with_incoming_shutdown(incoming, shutdown_signal)
            .await;

        self.cancellation_token.cancel();
        if let Some(reporter) = reporter {
            let _ = reporter.await;
        }
        served?;

        let snapshot = self.counters.snapshot();
        info!("server stopped with {}", snapshot);
        Ok(snapshot)
    }
}

async fn report_counters(
    counters: Arc<OutcomeCounters>,
    period: Duration,
    cancellation_token: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            _ = interval.tick() => info!("counters {}", counters.snapshot()),
        }
    }
}
