// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conform is a harness for process-per-test graphics conformance
//! suites: each test is its own binary that declares what it needs,
//! renders a handful of frames, probes pixels or the context's error
//! queue, and reports exactly one of `PASS`, `FAIL`, `SKIP` or `WARN`
//! through stdout and its exit status. An external runner aggregates
//! those per-process verdicts into a report; process isolation is the
//! whole of the concurrency model.
//!
//! The harness owns four things and nothing else:
//!
//! - capability gating ([`RunContext::require_extension`],
//!   [`RunContext::require_version`]), which turns environment
//!   shortfalls into skips before any test logic runs;
//! - the lifecycle ([`run`], [`drive`]): `init` once, `display` one or
//!   more times, then one terminal report;
//! - read-back oracles ([`RunContext::probe_pixel`],
//!   [`RunContext::probe_rect`], [`RunContext::check_error`]);
//! - the exit protocol ([`report_result`]).
//!
//! Everything platform-shaped (context and window creation, extension
//! strings, pixel readback, presentation) sits behind [`ContextApi`];
//! [`HeadlessContext`] is the wgpu-backed implementation automated runs
//! use. A minimal test looks like:
//!
//! ```ignore
//! use conform::{ResultCode, TestConfig, TestOptions};
//!
//! fn main() {
//!     env_logger::init();
//!     let config = TestConfig::new("solid_clear");
//!     let options = TestOptions::from_env();
//!     conform::run_headless(config, options, |_| Ok(()), |rcx| {
//!         // ... clear the target to green through rcx.context() ...
//!         let (w, h) = rcx.context().surface_size();
//!         let ok = rcx.probe_rect(0, 0, w, h, [0.0, 1.0, 0.0, 1.0], conform::DEFAULT_TOLERANCE);
//!         Ok(ResultCode::from(ok))
//!     })
//! }
//! ```

mod caps;
mod config;
mod context;
mod driver;
mod headless;
mod oracle;
mod result;

pub use caps::CapabilitySet;
pub use config::{TestConfig, TestOptions, VisualAttributes};
pub use context::{ApiError, ApiVersion, ContextApi, ContextError, FrameStatus, Profile};
pub use driver::{drive, run, run_headless, RunContext};
pub use oracle::{compare_channels, ProbeResult, DEFAULT_TOLERANCE};
pub use result::{report_result, HarnessResult, ResultCode, Terminate};

pub use headless::HeadlessContext;

/// Re-export of the wgpu version the harness is built against, so test
/// bodies don't have to keep a separate dependency in sync.
pub use wgpu;
