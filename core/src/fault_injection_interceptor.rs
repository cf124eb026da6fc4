// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::fault_config::validate_fail_percent;
use crate::parameter_resolver::resolve_failure_config;
use crate::{
    CallMetadata, Decision, DecisionEngine, FaultError, OutcomeCounters, RandomSource,
    ThreadLocalRandom,
};
use std::sync::Arc;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

/// Settings fixed for the lifetime of the interceptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterceptorConfig {
    default_fail_percent: u32,
}

impl InterceptorConfig {
    pub fn new(default_fail_percent: i64) -> Result<Self, FaultError> {
        Ok(Self {
            default_fail_percent: validate_fail_percent(default_fail_percent)?,
        })
    }

    pub fn default_fail_percent(&self) -> u32 {
        self.default_fail_percent
    }
}

/// Server side interceptor that rejects a configurable share of calls.
///
/// Each call resolves its failure parameters from the `failpercent` and
/// `failcodes` metadata (falling back to the configured default), asks the
/// [`DecisionEngine`] whether to fail it, and either lets it through to the
/// handler or answers with the chosen status code.
pub struct FaultInjectionInterceptor<R = ThreadLocalRandom> {
    config: InterceptorConfig,
    engine: DecisionEngine<R>,
    counters: Arc<OutcomeCounters>,
}

impl FaultInjectionInterceptor<ThreadLocalRandom> {
    pub fn new(config: InterceptorConfig, counters: Arc<OutcomeCounters>) -> Self {
        Self::with_random(config, counters, ThreadLocalRandom)
    }
}

impl<R: RandomSource> FaultInjectionInterceptor<R> {
    pub fn with_random(
        config: InterceptorConfig,
        counters: Arc<OutcomeCounters>,
        random: R,
    ) -> Self {
        Self {
            config,
            engine: DecisionEngine::new(random),
            counters,
        }
    }

    pub fn counters(&self) -> &Arc<OutcomeCounters> {
        &self.counters
    }

    /// Decide the fate of one call.
    ///
    /// `Ok(())` means the call is admitted and already counted as a success;
    /// the caller must forward it to the handler and return the handler's
    /// result untouched. `Err` carries either an `INVALID_ARGUMENT` for bad
    /// parameters (counters untouched) or the injected failure.
    pub fn intercept<M: CallMetadata + ?Sized>(
        &self,
        metadata: Option<&M>,
    ) -> Result<(), Status> {
        let config = resolve_failure_config(self.config.default_fail_percent, metadata)
            .map_err(|error| {
                warn!("rejecting call with invalid fault parameters: {}", error);
                Status::from(error)
            })?;

        match self.engine.decide(&config) {
            Decision::Pass { draw } => {
                let succeeded = self.counters.record_success();
                debug!("request admitted count:{} draw:{}", succeeded, draw);
                Ok(())
            }
            Decision::Fail { code, draw } => {
                let failed = self.counters.record_failure();
                warn!("request failed count:{} code:{:?}", failed, code);
                Err(Status::new(
                    code,
                    format!(
                        "intercept failure code:{} failpercent:{} draw:{} fail:{}",
                        code as i32, config.fail_percent, draw, failed
                    ),
                ))
            }
        }
    }
}

impl<R: RandomSource> Interceptor for FaultInjectionInterceptor<R> {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        self.intercept(Some(request.metadata()))?;
        Ok(request)
    }
}

impl<R> Clone for FaultInjectionInterceptor<R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            engine: self.engine.clone(),
            counters: Arc::clone(&self.counters),
        }
    }
}
