// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error-queue drain semantics of `check_error`.

use conform::{ApiError, RunContext};
use conform_tests::{auto_setup, MockContext};

fn context_with_errors(name: &str, errors: &[ApiError]) -> RunContext<MockContext> {
    let (config, options) = auto_setup(name);
    let mut context = MockContext::new(4, 4);
    for &error in errors {
        context.queue_error(error);
    }
    RunContext::new(config, options, context)
}

#[test]
fn one_queued_error_is_consumed_by_one_check() {
    let mut rcx = context_with_errors("error_single", &[ApiError::InvalidValue]);
    assert!(rcx.check_error(ApiError::InvalidValue));
    // The queue was drained; an identical immediate check finds nothing.
    assert!(!rcx.check_error(ApiError::InvalidValue));
}

#[test]
fn mismatched_error_code_fails_the_check() {
    let mut rcx = context_with_errors("error_mismatch", &[ApiError::InvalidOperation]);
    assert!(!rcx.check_error(ApiError::InvalidValue));
}

#[test]
fn empty_queue_fails_the_check() {
    let mut rcx = context_with_errors("error_empty", &[]);
    assert!(!rcx.check_error(ApiError::InvalidValue));
}

#[test]
fn errors_drain_oldest_first() {
    let mut rcx = context_with_errors(
        "error_fifo",
        &[ApiError::InvalidValue, ApiError::OutOfMemory],
    );
    assert!(rcx.check_error(ApiError::InvalidValue));
    assert!(rcx.check_error(ApiError::OutOfMemory));
    assert!(!rcx.check_error(ApiError::OutOfMemory));
}

#[test]
fn second_check_sees_the_second_error_not_the_first() {
    // Two distinct errors queued: the first check matches, the second
    // checks the same code against the later error and fails.
    let mut rcx = context_with_errors(
        "error_two_distinct",
        &[ApiError::InvalidValue, ApiError::InvalidOperation],
    );
    assert!(rcx.check_error(ApiError::InvalidValue));
    assert!(!rcx.check_error(ApiError::InvalidValue));
}
