// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driver sequencing: gating before `init`, `init` before `display`,
//! and the automated/interactive termination rules.

use std::cell::Cell;

use conform::{drive, ApiVersion, ResultCode, RunContext, Terminate};
use conform_tests::{auto_setup, interactive_setup, MockContext};

#[test]
fn auto_mode_runs_init_once_and_display_once() {
    let (config, options) = auto_setup("lifecycle_auto");
    let mut rcx = RunContext::new(config, options, MockContext::new(4, 4));
    let inits = Cell::new(0);
    let displays = Cell::new(0);

    let code = drive(
        &mut rcx,
        |_| {
            inits.set(inits.get() + 1);
            Ok(())
        },
        |_| {
            displays.set(displays.get() + 1);
            Ok(ResultCode::Pass)
        },
    );

    assert_eq!(code, ResultCode::Pass);
    assert_eq!(inits.get(), 1);
    assert_eq!(displays.get(), 1);
}

#[test]
fn interactive_mode_displays_until_the_window_closes() {
    let (config, options) = interactive_setup("lifecycle_interactive");
    let mut context = MockContext::new(4, 4);
    context.frames_before_close = 3;
    let mut rcx = RunContext::new(config, options, context);
    let displays = Cell::new(0);

    let code = drive(&mut rcx, |_| Ok(()), |_| {
        displays.set(displays.get() + 1);
        Ok(ResultCode::Pass)
    });

    assert_eq!(code, ResultCode::Pass);
    assert_eq!(displays.get(), 3);
    assert_eq!(rcx.context().present_calls, 3);
}

#[test]
fn interactive_failure_is_forwarded_immediately() {
    let (config, options) = interactive_setup("lifecycle_fail_fast");
    let mut context = MockContext::new(4, 4);
    context.frames_before_close = 100;
    let mut rcx = RunContext::new(config, options, context);
    let displays = Cell::new(0);

    let code = drive(&mut rcx, |_| Ok(()), |_| {
        displays.set(displays.get() + 1);
        Ok(ResultCode::Fail)
    });

    assert_eq!(code, ResultCode::Fail);
    assert_eq!(displays.get(), 1);
    // No frame goes out after a failing display.
    assert_eq!(rcx.context().present_calls, 0);
}

#[test]
fn missing_required_extension_skips_before_any_display() {
    let (mut config, options) = auto_setup("lifecycle_ext_gate");
    config.required_extensions = vec!["not-a-real-extension".to_string()];
    let mut rcx = RunContext::new(config, options, MockContext::new(4, 4));
    let inits = Cell::new(0);
    let displays = Cell::new(0);

    let code = drive(
        &mut rcx,
        |_| {
            inits.set(inits.get() + 1);
            Ok(())
        },
        |_| {
            displays.set(displays.get() + 1);
            Ok(ResultCode::Pass)
        },
    );

    assert_eq!(code, ResultCode::Skip);
    assert_eq!(inits.get(), 0);
    assert_eq!(displays.get(), 0);
}

#[test]
fn version_shortfall_skips() {
    let (mut config, options) = auto_setup("lifecycle_version_gate");
    config.required_core_version = Some(ApiVersion::new(2, 0));
    let mut rcx = RunContext::new(config, options, MockContext::new(4, 4));

    let code = drive(&mut rcx, |_| Ok(()), |_| Ok(ResultCode::Pass));
    assert_eq!(code, ResultCode::Skip);
}

#[test]
fn satisfied_requirements_let_the_test_run() {
    let (mut config, options) = auto_setup("lifecycle_gates_pass");
    config.required_core_version = Some(ApiVersion::new(1, 0));
    config.required_extensions = vec!["mock-blit".to_string()];
    let mut rcx = RunContext::new(config, options, MockContext::new(4, 4));

    let code = drive(&mut rcx, |_| Ok(()), |_| Ok(ResultCode::Pass));
    assert_eq!(code, ResultCode::Pass);
}

#[test]
fn requires_displayed_window_skips_headless() {
    let (mut config, options) = auto_setup("lifecycle_displayed_gate");
    config.requires_displayed_window = true;
    let mut rcx = RunContext::new(config, options, MockContext::new(4, 4));
    let inits = Cell::new(0);

    let code = drive(
        &mut rcx,
        |_| {
            inits.set(inits.get() + 1);
            Ok(())
        },
        |_| Ok(ResultCode::Pass),
    );

    assert_eq!(code, ResultCode::Skip);
    assert_eq!(inits.get(), 0);
}

#[test]
fn requires_displayed_window_runs_when_displayed() {
    let (mut config, options) = auto_setup("lifecycle_displayed_ok");
    config.requires_displayed_window = true;
    let mut context = MockContext::new(4, 4);
    context.displayed = true;
    let mut rcx = RunContext::new(config, options, context);

    let code = drive(&mut rcx, |_| Ok(()), |_| Ok(ResultCode::Pass));
    assert_eq!(code, ResultCode::Pass);
}

#[test]
fn init_can_skip_from_inside() {
    let (config, options) = auto_setup("lifecycle_init_skip");
    let mut rcx = RunContext::new(config, options, MockContext::new(4, 4));
    let displays = Cell::new(0);

    let code = drive(
        &mut rcx,
        |rcx: &mut RunContext<MockContext>| rcx.require_extension("probe-everything"),
        |_| {
            displays.set(displays.get() + 1);
            Ok(ResultCode::Pass)
        },
    );

    assert_eq!(code, ResultCode::Skip);
    assert_eq!(displays.get(), 0);
}

#[test]
fn display_can_terminate_with_an_explicit_code() {
    let (config, options) = auto_setup("lifecycle_display_terminate");
    let mut rcx = RunContext::new(config, options, MockContext::new(4, 4));

    let code = drive(&mut rcx, |_| Ok(()), |_| {
        Err(Terminate::fail("deliberate early exit"))
    });
    assert_eq!(code, ResultCode::Fail);
}

#[test]
fn warn_is_a_terminal_verdict_in_auto_mode() {
    let (config, options) = auto_setup("lifecycle_warn");
    let mut rcx = RunContext::new(config, options, MockContext::new(4, 4));
    let code = drive(&mut rcx, |_| Ok(()), |_| Ok(ResultCode::Warn));
    assert_eq!(code, ResultCode::Warn);
}

#[test]
fn prober_queries_are_idempotent() {
    let (config, options) = auto_setup("lifecycle_idempotent");
    let rcx = RunContext::new(config, options, MockContext::new(4, 4));

    for _ in 0..3 {
        assert!(rcx.is_extension_supported("mock-blit"));
        assert!(!rcx.is_extension_supported("mock-teleport"));
        assert!(rcx.require_extension("mock-blit").is_ok());
        assert!(rcx.require_version(ApiVersion::new(1, 0)).is_ok());
    }
}
