// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod common;

use common::{metadata, ScriptedRandom};
use fault_injection_core::{
    FailureMetadataStamper, FaultError, FaultInjectionInterceptor, InterceptorConfig,
    OutcomeCounters, SeededRandom, ThreadLocalRandom,
};
use std::sync::Arc;
use std::thread;
use tonic::metadata::MetadataMap;
use tonic::service::Interceptor;
use tonic::{Code, Request};

fn interceptor_with(
    default_fail_percent: i64,
    draws: &[u32],
) -> (FaultInjectionInterceptor<ScriptedRandom>, Arc<OutcomeCounters>) {
    let counters = Arc::new(OutcomeCounters::new());
    let interceptor = FaultInjectionInterceptor::with_random(
        InterceptorConfig::new(default_fail_percent).unwrap(),
        Arc::clone(&counters),
        ScriptedRandom::new(draws),
    );
    (interceptor, counters)
}

#[test]
fn test_config_rejects_out_of_range_default() {
    assert_eq!(
        InterceptorConfig::new(101),
        Err(FaultError::FailPercentOutOfRange(101))
    );
    assert_eq!(
        InterceptorConfig::new(-5),
        Err(FaultError::FailPercentOutOfRange(-5))
    );
    assert_eq!(InterceptorConfig::new(100).unwrap().default_fail_percent(), 100);
}

#[test]
fn test_override_zero_percent_is_forwarded() {
    // Default 50 would fail on a draw of 10, the override must win
    let (interceptor, counters) = interceptor_with(50, &[10]);
    let md = metadata(&[("failpercent", "0")]);

    assert!(interceptor.intercept(Some(&md)).is_ok());
    assert_eq!(counters.success_count(), 1);
    assert_eq!(counters.failure_count(), 0);
}

#[test]
fn test_override_hundred_percent_with_code_is_rejected() {
    let (interceptor, counters) = interceptor_with(50, &[99]);
    let md = metadata(&[("failpercent", "100"), ("failcodes", "14")]);

    let status = interceptor.intercept(Some(&md)).unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
    assert!(status.message().contains("code:14"));
    assert!(status.message().contains("failpercent:100"));
    assert!(status.message().contains("draw:99"));
    assert!(status.message().contains("fail:1"));
    assert_eq!(counters.failure_count(), 1);
    assert_eq!(counters.success_count(), 0);
}

#[test]
fn test_unparsable_percent_leaves_counters_untouched() {
    let (interceptor, counters) = interceptor_with(50, &[]);
    let md = metadata(&[("failpercent", "abc")]);

    let status = interceptor.intercept(Some(&md)).unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(counters.snapshot().total(), 0);
}

#[test]
fn test_bad_codes_are_rejected_before_drawing() {
    let random = ScriptedRandom::new(&[]);
    let counters = Arc::new(OutcomeCounters::new());
    let interceptor = FaultInjectionInterceptor::with_random(
        InterceptorConfig::new(100).unwrap(),
        Arc::clone(&counters),
        random.clone(),
    );
    let md = metadata(&[("failcodes", "4,17")]);

    let status = interceptor.intercept(Some(&md)).unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(random.ranges().is_empty());
    assert_eq!(counters.snapshot().total(), 0);
}

#[test]
fn test_missing_metadata_is_invalid_argument() {
    let (interceptor, counters) = interceptor_with(0, &[]);

    let status = interceptor.intercept::<MetadataMap>(None).unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "missing metadata");
    assert_eq!(counters.snapshot().total(), 0);
}

#[test]
fn test_no_overrides_with_zero_default_is_forwarded() {
    let (mut interceptor, counters) = interceptor_with(0, &[0, 0, 0]);

    for _ in 0..3 {
        assert!(interceptor.call(Request::new(())).is_ok());
    }
    assert_eq!(counters.success_count(), 3);
}

#[test]
fn test_forced_failure_picks_from_supplied_codes() {
    let counters = Arc::new(OutcomeCounters::new());
    let mut interceptor = FaultInjectionInterceptor::with_random(
        InterceptorConfig::new(100).unwrap(),
        Arc::clone(&counters),
        SeededRandom::new(99),
    );

    for _ in 0..200 {
        let mut request = Request::new(());
        *request.metadata_mut() = metadata(&[("failcodes", "4,8,14")]);

        let status = interceptor.call(request).unwrap_err();
        assert!(matches!(
            status.code(),
            Code::DeadlineExceeded | Code::ResourceExhausted | Code::Unavailable
        ));
    }
    assert_eq!(counters.failure_count(), 200);
}

#[test]
fn test_stamped_request_is_understood_by_interceptor() {
    let mut stamper = FailureMetadataStamper::new(100, &[Code::Aborted]).unwrap();
    let stamped = stamper.call(Request::new(())).unwrap();
    assert_eq!(
        stamped.metadata().get("failpercent").unwrap().to_str().unwrap(),
        "100"
    );
    assert_eq!(
        stamped.metadata().get("failcodes").unwrap().to_str().unwrap(),
        "10"
    );

    let (mut interceptor, _) = interceptor_with(0, &[5]);
    let status = interceptor.call(stamped).unwrap_err();
    assert_eq!(status.code(), Code::Aborted);
}

#[test]
fn test_stamper_joins_codes_and_omits_empty_list() {
    let mut stamper = FailureMetadataStamper::new(
        50,
        &[Code::DeadlineExceeded, Code::ResourceExhausted, Code::Unavailable],
    )
    .unwrap();
    let stamped = stamper.call(Request::new(())).unwrap();
    assert_eq!(
        stamped.metadata().get("failcodes").unwrap().to_str().unwrap(),
        "4,8,14"
    );

    let mut stamper = FailureMetadataStamper::new(25, &[]).unwrap();
    let stamped = stamper.call(Request::new(())).unwrap();
    assert!(stamped.metadata().get("failcodes").is_none());
    assert_eq!(
        stamped.metadata().get("failpercent").unwrap().to_str().unwrap(),
        "25"
    );
}

#[test]
fn test_stamper_headers_cover_every_code() {
    let codes: Vec<Code> = (0..=16).map(Code::from_i32).collect();
    let mut stamper = FailureMetadataStamper::new(0, &codes).unwrap();
    let stamped = stamper.call(Request::new(())).unwrap();

    assert_eq!(
        stamped.metadata().get("failpercent").unwrap().to_str().unwrap(),
        "0"
    );
    assert_eq!(
        stamped.metadata().get("failcodes").unwrap().to_str().unwrap(),
        "0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16"
    );
}

#[test]
fn test_concurrent_calls_are_all_counted() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 2_000;

    let counters = Arc::new(OutcomeCounters::new());
    let interceptor = FaultInjectionInterceptor::with_random(
        InterceptorConfig::new(50).unwrap(),
        Arc::clone(&counters),
        ThreadLocalRandom,
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let mut interceptor = interceptor.clone();
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    let _ = interceptor.call(Request::new(()));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = counters.snapshot();
    assert_eq!(snapshot.total(), (THREADS * PER_THREAD) as u64);
    assert!(snapshot.success > 0 && snapshot.failure > 0);
}
