// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-back oracles: pixel probes and error-queue checks.
//!
//! Probes never abort the process. A mismatch prints a diagnostic to
//! stderr and evaluates to false; test bodies are expected to keep
//! probing and fold the booleans, so one report covers every mismatch.

use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::context::{ApiError, ContextApi};
use crate::driver::RunContext;

/// Default per-channel tolerance: one step of an 8-bit channel, i.e. a
/// visually imperceptible difference.
pub const DEFAULT_TOLERANCE: f32 = 1.0 / 256.0;

/// How many mismatching pixels a rectangle probe names individually.
const MAX_REPORTED_PIXELS: usize = 5;

const CHANNEL_NAMES: [&str; 4] = ["red", "green", "blue", "alpha"];

/// Outcome of a single oracle comparison. Consumed immediately by the
/// caller; not persisted.
#[derive(Debug)]
pub struct ProbeResult {
    pub ok: bool,
    pub diagnostic: Option<String>,
}

impl ProbeResult {
    fn pass() -> Self {
        Self {
            ok: true,
            diagnostic: None,
        }
    }
}

/// Compares one pixel against an expectation, per channel, in normalized
/// floating point. The comparison is inclusive: a difference of exactly
/// `tolerance` passes.
pub fn compare_channels(actual: [f32; 4], expected: [f32; 4], tolerance: f32) -> ProbeResult {
    let mut mismatched = Vec::new();
    for (i, (a, e)) in actual.iter().zip(&expected).enumerate() {
        if (a - e).abs() > tolerance {
            mismatched.push(CHANNEL_NAMES[i]);
        }
    }
    if mismatched.is_empty() {
        return ProbeResult::pass();
    }
    ProbeResult {
        ok: false,
        diagnostic: Some(format!(
            "channel(s) {} out of tolerance {tolerance}\n  expected: {expected:?}\n  actual:   {actual:?}",
            mismatched.join(", ")
        )),
    }
}

impl<C: ContextApi> RunContext<C> {
    /// Probes one pixel with the default tolerance.
    pub fn probe_pixel_rgba(&mut self, x: u32, y: u32, expected: [f32; 4]) -> bool {
        self.probe_pixel(x, y, expected, DEFAULT_TOLERANCE)
    }

    /// Reads back one pixel and compares every channel against
    /// `expected` within `tolerance`. True iff all four channels pass.
    pub fn probe_pixel(&mut self, x: u32, y: u32, expected: [f32; 4], tolerance: f32) -> bool {
        let pixels = match self.context.read_pixels(x, y, 1, 1) {
            Ok(pixels) => pixels,
            Err(err) => {
                eprintln!("probe at ({x}, {y}): readback failed: {err}");
                return false;
            }
        };
        let result = compare_channels(pixels[0], expected, tolerance);
        if let Some(diagnostic) = &result.diagnostic {
            eprintln!("probe at ({x}, {y}): {diagnostic}");
            self.debug_dump(1, 1, &pixels);
        }
        result.ok
    }

    /// Applies the pixel comparison to every pixel of a rectangle.
    ///
    /// Every pixel is checked even after the first mismatch, so the
    /// diagnostic can report how widespread the damage is; only the
    /// return value short-circuits anything.
    pub fn probe_rect(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        expected: [f32; 4],
        tolerance: f32,
    ) -> bool {
        let pixels = match self.context.read_pixels(x, y, width, height) {
            Ok(pixels) => pixels,
            Err(err) => {
                eprintln!("probe of {width}x{height} rect at ({x}, {y}): readback failed: {err}");
                return false;
            }
        };
        let mut mismatches = 0usize;
        for (i, actual) in pixels.iter().enumerate() {
            let result = compare_channels(*actual, expected, tolerance);
            if let Some(diagnostic) = result.diagnostic {
                if mismatches < MAX_REPORTED_PIXELS {
                    let px = x + (i as u32) % width;
                    let py = y + (i as u32) / width;
                    eprintln!("probe at ({px}, {py}): {diagnostic}");
                }
                mismatches += 1;
            }
        }
        if mismatches == 0 {
            return true;
        }
        if mismatches > MAX_REPORTED_PIXELS {
            eprintln!(
                "probe of {width}x{height} rect at ({x}, {y}): {mismatches} of {} pixels mismatched",
                pixels.len()
            );
        }
        self.debug_dump(width, height, &pixels);
        false
    }

    /// Pops one pending error from the context and compares it against
    /// `expected`. The error-path analogue of a pixel probe: one queued
    /// error is consumed per call, oldest first.
    pub fn check_error(&mut self, expected: ApiError) -> bool {
        match self.context.take_error() {
            Some(actual) if actual == expected => true,
            Some(actual) => {
                eprintln!("error check: expected {expected}, got {actual}");
                false
            }
            None => {
                eprintln!("error check: expected {expected}, got no error");
                false
            }
        }
    }

    /// Writes the failed readback to `debug_outputs/<name>.png` when
    /// `CONFORM_DEBUG_DUMP` selects this test.
    fn debug_dump(&self, width: u32, height: u32, pixels: &[[f32; 4]]) {
        let out_path = debug_dump_path(&self.config.name);
        if !env_selects_test("CONFORM_DEBUG_DUMP", &self.config.name) {
            // Drop stale output from earlier runs so a leftover file
            // can't be mistaken for this run's readback.
            match std::fs::remove_file(&out_path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => log::warn!("couldn't remove stale debug dump: {e}"),
            }
            return;
        }
        match write_png(&out_path, width, height, pixels) {
            Ok(()) => eprintln!(
                "wrote readback ({width}x{height}) to {}",
                out_path.display()
            ),
            Err(err) => log::warn!("couldn't write debug dump: {err}"),
        }
    }
}

fn debug_dump_path(name: &str) -> PathBuf {
    Path::new("debug_outputs").join(name).with_extension("png")
}

/// Whether the value of `env_var` names this test (comma-separated list)
/// or is `all`.
fn env_selects_test(env_var: &str, name: &str) -> bool {
    env::var(env_var).is_ok_and(|val| selection_matches(&val, name))
}

fn selection_matches(val: &str, name: &str) -> bool {
    if val.eq_ignore_ascii_case("all") {
        return true;
    }
    val.split(',').any(|test| test.trim().eq_ignore_ascii_case(name))
}

fn write_png(
    out_path: &Path,
    width: u32,
    height: u32,
    pixels: &[[f32; 4]],
) -> Result<(), png::EncodingError> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(out_path)?;
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    let mut data = Vec::with_capacity(pixels.len() * 4);
    for pixel in pixels {
        for channel in pixel {
            data.push((channel.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
    }
    writer.write_image_data(&data)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

    #[test]
    fn matching_pixel_passes() {
        let result = compare_channels(GREEN, GREEN, DEFAULT_TOLERANCE);
        assert!(result.ok);
        assert!(result.diagnostic.is_none());
    }

    #[test]
    fn tolerance_is_inclusive() {
        let nudged = [0.0, 1.0 - DEFAULT_TOLERANCE, 0.0, 1.0];
        assert!(compare_channels(nudged, GREEN, DEFAULT_TOLERANCE).ok);
    }

    #[test]
    fn one_bad_channel_fails_the_pixel() {
        let off = [0.0, 1.0, 0.25, 1.0];
        let result = compare_channels(off, GREEN, DEFAULT_TOLERANCE);
        assert!(!result.ok);
        let diagnostic = result.diagnostic.unwrap();
        assert!(diagnostic.contains("blue"));
        assert!(!diagnostic.contains("red"));
    }

    #[test]
    fn diagnostic_names_every_bad_channel() {
        let off = [0.5, 0.5, 0.0, 1.0];
        let diagnostic = compare_channels(off, GREEN, DEFAULT_TOLERANCE)
            .diagnostic
            .unwrap();
        assert!(diagnostic.contains("red"));
        assert!(diagnostic.contains("green"));
    }

    #[test]
    fn dump_selection_parses_lists() {
        assert!(selection_matches("all", "clear"));
        assert!(selection_matches("ALL", "clear"));
        assert!(selection_matches("clear", "clear"));
        assert!(selection_matches("depth, clear", "clear"));
        assert!(!selection_matches("depth,stencil", "clear"));
        assert!(!selection_matches("", "clear"));
    }
}
