// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clears the whole target to a solid color and probes every pixel of
//! the viewport back. The smallest complete test a harness client can
//! write: one render pass, one rectangle probe, one verdict.

use clap::Parser;
use conform::wgpu;
use conform::{ContextApi, ResultCode, TestConfig, TestOptions, DEFAULT_TOLERANCE};

const CLEAR_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Edge length of the square render target.
    #[arg(long, default_value_t = 256)]
    size: u32,
}

fn main() {
    env_logger::init();
    let options = TestOptions::from_env();
    // The harness keeps what it didn't recognize; our own flags parse
    // from that remainder.
    let args = Args::parse_from(
        std::iter::once("clear".to_string()).chain(options.extra.iter().cloned()),
    );
    let config = TestConfig {
        window_width: args.size,
        window_height: args.size,
        ..TestConfig::new("clear")
    };

    conform::run_headless(config, options, |_| Ok(()), |rcx| {
        let context = rcx.context();
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("clear"),
            });
        // The pass only needs to exist; the clear happens on load.
        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: context.target_view(),
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(CLEAR_COLOR[0]),
                        g: f64::from(CLEAR_COLOR[1]),
                        b: f64::from(CLEAR_COLOR[2]),
                        a: f64::from(CLEAR_COLOR[3]),
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        drop(pass);
        context.queue.submit([encoder.finish()]);

        let (width, height) = rcx.context().surface_size();
        let ok = rcx.probe_rect(0, 0, width, height, CLEAR_COLOR, DEFAULT_TOLERANCE);
        Ok(ResultCode::from(ok))
    })
}
