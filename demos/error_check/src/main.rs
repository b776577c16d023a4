// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deliberately issues an invalid API call and asserts that exactly one
//! matching error lands on the context's error queue — the negative-path
//! counterpart of the clear-and-probe test.

use conform::wgpu;
use conform::{ApiError, ContextApi, ResultCode, TestConfig, TestOptions};

fn main() {
    env_logger::init();
    let options = TestOptions::from_env();
    let config = TestConfig::new("error_check");

    conform::run_headless(config, options, |_| Ok(()), |rcx| {
        let context = rcx.context();
        // A zero-sized texture is invalid and must be rejected by
        // validation without creating anything.
        let _ = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("deliberately invalid"),
            size: wgpu::Extent3d {
                width: 0,
                height: 0,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        if let Err(err) = context.sync() {
            eprintln!("device sync failed: {err}");
            return Ok(ResultCode::Fail);
        }

        let mut ok = rcx.check_error(ApiError::InvalidOperation);
        // Exactly one error: the queue must be empty afterwards.
        if let Some(stray) = rcx.context().take_error() {
            eprintln!("unexpected extra error queued: {stray}");
            ok = false;
        }
        Ok(ResultCode::from(ok))
    })
}
