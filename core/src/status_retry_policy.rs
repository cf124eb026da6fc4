// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::RetryPolicy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tonic::Status;
use tower::retry::Policy;
use tracing::debug;

/// Adapts a [`RetryPolicy`] document to tower's retry middleware.
///
/// tower clones the policy for every request, so `attempts` tracks a single
/// call. `retries` is shared and counts every retry scheduled.
#[derive(Debug, Clone)]
pub struct StatusRetryPolicy {
    policy: Option<Arc<RetryPolicy>>,
    attempts: u32,
    retries: Arc<AtomicU64>,
}

impl StatusRetryPolicy {
    /// `None` disables retries: every call makes a single attempt
    pub fn new(policy: Option<RetryPolicy>) -> Self {
        Self {
            policy: policy.map(Arc::new),
            attempts: 1,
            retries: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn retries_scheduled(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}

impl<Req: Clone, Res> Policy<Req, Res, Status> for StatusRetryPolicy {
    type Future = tokio::time::Sleep;

    fn retry(
        &mut self,
        _request: &mut Req,
        result: &mut Result<Res, Status>,
    ) -> Option<Self::Future> {
        let status = result.as_ref().err()?;
        let policy = self.policy.as_ref()?;

        if !policy.is_retryable(status.code()) || self.attempts >= policy.max_attempts {
            return None;
        }

        let delay = policy.backoff(self.attempts, fastrand::f64());
        self.attempts += 1;
        self.retries.fetch_add(1, Ordering::Relaxed);
        debug!(
            "retrying after {:?} (attempt {} of {}, code {:?})",
            delay,
            self.attempts,
            policy.max_attempts,
            status.code()
        );

        Some(tokio::time::sleep(delay))
    }

    fn clone_request(&mut self, request: &Req) -> Option<Req> {
        Some(request.clone())
    }
}
