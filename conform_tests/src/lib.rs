// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test support for the conform harness: a deterministic in-memory
//! context so lifecycle and oracle behavior can be asserted without a
//! GPU, plus a few shared constants.

use std::collections::VecDeque;

use conform::{
    ApiError, ApiVersion, ContextApi, ContextError, FrameStatus, Profile, TestConfig, TestOptions,
};

pub const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// An in-memory [`ContextApi`] with a scriptable surface, extension list
/// and error queue. Everything a driver or oracle touches is observable
/// through the counters.
pub struct MockContext {
    pub version: ApiVersion,
    pub profile: Profile,
    pub extensions: Vec<String>,
    pub displayed: bool,
    /// `present` reports `Closed` on this call number (1-based).
    pub frames_before_close: u32,
    pub width: u32,
    pub height: u32,
    pixels: Vec<[f32; 4]>,
    errors: VecDeque<ApiError>,
    pub read_calls: u32,
    pub present_calls: u32,
}

impl MockContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            version: ApiVersion::new(1, 0),
            profile: Profile::Core,
            extensions: vec!["mock-blit".to_string(), "mock-query".to_string()],
            displayed: false,
            frames_before_close: 1,
            width,
            height,
            pixels: vec![BLACK; (width * height) as usize],
            errors: VecDeque::new(),
            read_calls: 0,
            present_calls: 0,
        }
    }

    pub fn fill(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    pub fn queue_error(&mut self, error: ApiError) {
        self.errors.push_back(error);
    }
}

impl ContextApi for MockContext {
    fn version(&self) -> ApiVersion {
        self.version
    }

    fn profile(&self) -> Profile {
        self.profile
    }

    fn extensions(&self) -> Vec<String> {
        self.extensions.clone()
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_displayed(&self) -> bool {
        self.displayed
    }

    fn read_pixels(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Vec<[f32; 4]>, ContextError> {
        self.read_calls += 1;
        if x + width > self.width || y + height > self.height {
            return Err(ContextError::ReadbackOutOfBounds {
                x,
                y,
                width,
                height,
                surface_width: self.width,
                surface_height: self.height,
            });
        }
        let mut out = Vec::with_capacity((width * height) as usize);
        for row in y..y + height {
            for col in x..x + width {
                out.push(self.pixels[(row * self.width + col) as usize]);
            }
        }
        Ok(out)
    }

    fn take_error(&mut self) -> Option<ApiError> {
        self.errors.pop_front()
    }

    fn present(&mut self) -> Result<FrameStatus, ContextError> {
        self.present_calls += 1;
        if self.present_calls >= self.frames_before_close {
            Ok(FrameStatus::Closed)
        } else {
            Ok(FrameStatus::Presented)
        }
    }
}

/// A 4x4 config/options pair for driver tests: automated mode, no
/// declared requirements.
pub fn auto_setup(name: &str) -> (TestConfig, TestOptions) {
    let config = TestConfig {
        window_width: 4,
        window_height: 4,
        ..TestConfig::new(name)
    };
    let options = TestOptions::from_args(["-auto".to_string()]);
    (config, options)
}

/// Same, without `-auto`: the interactive path.
pub fn interactive_setup(name: &str) -> (TestConfig, TestOptions) {
    let (config, _) = auto_setup(name);
    (config, TestOptions::from_args([]))
}
