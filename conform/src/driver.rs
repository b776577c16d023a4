// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test lifecycle: capability gating, `init`/`display` sequencing, and the
//! hand-off to the reporter.

use crate::caps::CapabilitySet;
use crate::config::{TestConfig, TestOptions};
use crate::context::{ContextApi, FrameStatus, Profile};
use crate::headless::HeadlessContext;
use crate::result::{report_result, HarnessResult, ResultCode, Terminate};

/// Process-wide state threaded through every harness call.
///
/// Owns the context for the life of the process; resolved once before the
/// test body runs and never reassigned.
pub struct RunContext<C> {
    pub config: TestConfig,
    pub options: TestOptions,
    caps: CapabilitySet,
    pub(crate) context: C,
}

impl<C: ContextApi> RunContext<C> {
    pub fn new(config: TestConfig, options: TestOptions, context: C) -> Self {
        let caps = CapabilitySet::resolve(&context);
        Self {
            config,
            options,
            caps,
            context,
        }
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.caps
    }

    /// Raw access to the underlying context, for the test body's own
    /// draw and query calls.
    pub fn context(&mut self) -> &mut C {
        &mut self.context
    }
}

/// Runs the full lifecycle and returns the final code instead of exiting.
///
/// The lifecycle is `NOT_STARTED → INITIALIZED → (DISPLAYING)* →
/// REPORTED`: the capability gates run first, `init` is called exactly
/// once, then `display` one or more times, and the code returned here is
/// terminal — [`run`] hands it straight to [`report_result`]. Tests and
/// embedders that need to stay alive call this directly.
pub fn drive<C, I, D>(rcx: &mut RunContext<C>, init: I, mut display: D) -> ResultCode
where
    C: ContextApi,
    I: FnOnce(&mut RunContext<C>) -> HarnessResult<()>,
    D: FnMut(&mut RunContext<C>) -> HarnessResult<ResultCode>,
{
    if rcx.config.requires_displayed_window && !rcx.context.is_displayed() {
        return note(Terminate::skip("test requires a displayed window"));
    }
    if let Err(stop) = gate_requirements(rcx) {
        return note(stop);
    }

    if let Err(stop) = init(rcx) {
        return note(stop);
    }

    loop {
        let code = match display(rcx) {
            Ok(code) => code,
            Err(stop) => return note(stop),
        };
        // A failure is final in either mode; in automated mode so is
        // everything else. Interactive tests keep presenting frames
        // until the window goes away.
        if rcx.options.auto || code == ResultCode::Fail {
            return code;
        }
        match rcx.context.present() {
            Ok(FrameStatus::Presented) => {}
            Ok(FrameStatus::Closed) => return code,
            Err(err) => {
                eprintln!("present failed: {err}");
                return ResultCode::Fail;
            }
        }
    }
}

/// Checks the declared version and extension requirements; any shortfall
/// is a skip before `init` runs.
fn gate_requirements<C: ContextApi>(rcx: &RunContext<C>) -> HarnessResult<()> {
    let required = match rcx.capabilities().profile() {
        Profile::Core => rcx.config.required_core_version,
        Profile::Compatibility => rcx.config.required_compat_version,
    };
    if let Some(version) = required {
        rcx.require_version(version)?;
    }
    for extension in &rcx.config.required_extensions {
        rcx.require_extension(extension)?;
    }
    Ok(())
}

fn note(stop: Terminate) -> ResultCode {
    if stop.reason.is_some() {
        eprintln!("{stop}");
    }
    stop.code
}

/// Drives a test against an already-created context and terminates the
/// process with its result. Never returns.
pub fn run<C, I, D>(
    config: TestConfig,
    options: TestOptions,
    context: C,
    init: I,
    display: D,
) -> !
where
    C: ContextApi,
    I: FnOnce(&mut RunContext<C>) -> HarnessResult<()>,
    D: FnMut(&mut RunContext<C>) -> HarnessResult<ResultCode>,
{
    let mut rcx = RunContext::new(config, options, context);
    let code = drive(&mut rcx, init, display);
    report_result(code)
}

/// Creates a [`HeadlessContext`] for `config` and runs the test against
/// it. Context creation failure is a setup failure: nothing can be
/// asserted without a context, so it reports FAIL immediately.
pub fn run_headless<I, D>(config: TestConfig, options: TestOptions, init: I, display: D) -> !
where
    I: FnOnce(&mut RunContext<HeadlessContext>) -> HarnessResult<()>,
    D: FnMut(&mut RunContext<HeadlessContext>) -> HarnessResult<ResultCode>,
{
    let context = match HeadlessContext::new(&config) {
        Ok(context) => context,
        Err(err) => {
            eprintln!("context creation failed: {err}");
            report_result(ResultCode::Fail)
        }
    };
    run(config, options, context, init, display)
}
