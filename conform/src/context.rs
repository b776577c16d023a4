// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between the harness and the platform's graphics primitives.
//!
//! The harness never creates windows or issues draw calls itself; it
//! consumes "query capabilities", "read back pixels", "drain the error
//! queue" and "present" through [`ContextApi`] and leaves everything else
//! to the test body and the embedder.

use std::fmt;

use thiserror::Error;

/// An API version as `major.minor`.
///
/// Ordering is lexicographic on `(major, minor)`, which the derive gives
/// us from the field order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Context profile, for APIs that distinguish core from compatibility
/// contexts. Contexts without the distinction report [`Profile::Core`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Core,
    Compatibility,
}

/// A drainable context error code, the negative-testing analogue of a
/// rendered pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiError {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    OutOfMemory,
    Internal,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidEnum => "INVALID_ENUM",
            Self::InvalidValue => "INVALID_VALUE",
            Self::InvalidOperation => "INVALID_OPERATION",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::Internal => "INTERNAL_ERROR",
        };
        f.write_str(name)
    }
}

/// What happened to a presented frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame went out; the event source is still open.
    Presented,
    /// The window was closed; an interactive session should end.
    Closed,
}

/// Failures of the context plumbing itself. These are infrastructure
/// errors, not test judgments; a probe that hits one diagnoses it and
/// evaluates to false.
#[derive(Debug, Error)]
pub enum ContextError {
    /// There is no adapter that can host the requested visual.
    #[error("couldn't find suitable device")]
    NoCompatibleDevice,
    /// The adapter refused to hand out a device.
    #[error("couldn't acquire device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    /// Failed to async map a readback buffer.
    #[error("failed to async map a buffer")]
    BufferAsync(#[from] wgpu::BufferAsyncError),
    /// The device errored while waiting for readback to complete.
    #[error("device poll failed")]
    Poll(#[from] wgpu::PollError),
    /// The readback channel hung up before delivering a result.
    #[error("readback channel was closed")]
    ChannelClosed,
    /// A probe asked for pixels outside the surface.
    #[error(
        "readback of {width}x{height} at ({x}, {y}) exceeds the {surface_width}x{surface_height} surface"
    )]
    ReadbackOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        surface_width: u32,
        surface_height: u32,
    },
}

/// The externally supplied graphics primitives the harness runs against.
///
/// One context serves one test process; all calls happen on one thread in
/// program order. `version`, `profile` and `extensions` are sampled once
/// by [`CapabilitySet::resolve`](crate::CapabilitySet::resolve) right
/// after construction and never re-queried.
pub trait ContextApi {
    fn version(&self) -> ApiVersion;

    fn profile(&self) -> Profile;

    /// Names of the optional capabilities this context exposes.
    fn extensions(&self) -> Vec<String>;

    /// Dimensions of the read surface in pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Whether frames actually reach a visible window. Headless contexts
    /// return false, which skips tests that declare
    /// `requires_displayed_window`.
    fn is_displayed(&self) -> bool {
        false
    }

    /// Reads back a rectangle of the current read surface, row-major from
    /// the top-left of the rectangle, every channel normalized to
    /// 0.0–1.0 regardless of the storage format.
    fn read_pixels(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Vec<[f32; 4]>, ContextError>;

    /// Pops the oldest pending error, if any.
    fn take_error(&mut self) -> Option<ApiError>;

    /// Swaps/presents the current frame and reports whether the event
    /// source is still open.
    fn present(&mut self) -> Result<FrameStatus, ContextError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering() {
        assert!(ApiVersion::new(3, 3) < ApiVersion::new(4, 0));
        assert!(ApiVersion::new(4, 0) < ApiVersion::new(4, 3));
        assert!(ApiVersion::new(4, 3) >= ApiVersion::new(4, 3));
        // Minor version never outranks major.
        assert!(ApiVersion::new(2, 9) < ApiVersion::new(3, 0));
    }

    #[test]
    fn error_codes_display_like_the_api() {
        assert_eq!(ApiError::InvalidValue.to_string(), "INVALID_VALUE");
        assert_eq!(ApiError::OutOfMemory.to_string(), "OUT_OF_MEMORY");
    }
}
