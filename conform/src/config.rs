// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test declaration and the recognized command-line surface.

use bitflags::bitflags;

use crate::context::ApiVersion;

bitflags! {
    /// Framebuffer attributes a test asks for, as a visual selection mask.
    ///
    /// Not every context can honor every bit; a headless context accepts
    /// `DOUBLE` and `ACCUM` as inapplicable and logs that it ignored them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VisualAttributes: u32 {
        const RGB = 1 << 0;
        const RGBA = 1 << 1;
        const DOUBLE = 1 << 2;
        const DEPTH = 1 << 3;
        const STENCIL = 1 << 4;
        const ACCUM = 1 << 5;
    }
}

/// A test's static declaration, read once before context creation.
///
/// Construct with [`TestConfig::new`] and struct-update syntax:
///
/// ```
/// use conform::{ApiVersion, TestConfig, VisualAttributes};
///
/// let config = TestConfig {
///     required_core_version: Some(ApiVersion::new(1, 0)),
///     visual: VisualAttributes::RGBA | VisualAttributes::DEPTH,
///     ..TestConfig::new("depth_clear")
/// };
/// assert_eq!(config.window_width, 256);
/// ```
#[derive(Clone, Debug)]
pub struct TestConfig {
    /// Name used in diagnostics and debug-dump file names.
    pub name: String,
    /// Minimum version when the context is a core profile.
    pub required_core_version: Option<ApiVersion>,
    /// Minimum version when the context is a compatibility profile.
    pub required_compat_version: Option<ApiVersion>,
    /// Extensions gated on before `init` runs; any shortfall skips.
    pub required_extensions: Vec<String>,
    pub visual: VisualAttributes,
    pub window_width: u32,
    pub window_height: u32,
    /// Skip unless frames reach a visible window.
    pub requires_displayed_window: bool,
}

impl TestConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required_core_version: None,
            required_compat_version: None,
            required_extensions: Vec::new(),
            visual: VisualAttributes::RGBA | VisualAttributes::DOUBLE,
            window_width: 256,
            window_height: 256,
            requires_displayed_window: false,
        }
    }
}

/// Options recognized on every test's command line.
///
/// The scan keeps unrecognized arguments instead of rejecting them; that
/// is the contract with test bodies, which layer their own parsing on top
/// of `extra`.
#[derive(Clone, Debug)]
pub struct TestOptions {
    /// Non-interactive mode: the first `display` result is final.
    pub auto: bool,
    /// Arguments the harness didn't recognize, in order.
    pub extra: Vec<String>,
}

impl TestOptions {
    pub fn from_env() -> Self {
        Self::from_args(std::env::args().skip(1))
    }

    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut auto = false;
        let mut extra = Vec::new();
        for arg in args {
            if arg == "-auto" || arg == "--auto" {
                auto = true;
            } else {
                extra.push(arg);
            }
        }
        Self { auto, extra }
    }
}
