// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless wgpu context for automated runs.
//!
//! This is the [`ContextApi`] implementation most test binaries use: one
//! adapter, one device, one `Rgba8Unorm` render target sized from the
//! test's visual, with readback through a mapped staging buffer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::{TestConfig, VisualAttributes};
use crate::context::{ApiError, ApiVersion, ContextApi, ContextError, FrameStatus, Profile};

/// Capability names this context exposes for optional wgpu features.
///
/// The harness deals in extension strings; this table is the mapping a
/// test author writes against (`require_extension("clear-texture")`).
const FEATURE_NAMES: &[(&str, wgpu::Features)] = &[
    ("clear-texture", wgpu::Features::CLEAR_TEXTURE),
    ("depth32float-stencil8", wgpu::Features::DEPTH32FLOAT_STENCIL8),
    ("float32-filterable", wgpu::Features::FLOAT32_FILTERABLE),
    ("indirect-first-instance", wgpu::Features::INDIRECT_FIRST_INSTANCE),
    ("multi-draw-indirect", wgpu::Features::MULTI_DRAW_INDIRECT),
    (
        "pipeline-statistics-query",
        wgpu::Features::PIPELINE_STATISTICS_QUERY,
    ),
    (
        "rg11b10ufloat-renderable",
        wgpu::Features::RG11B10UFLOAT_RENDERABLE,
    ),
    ("shader-f16", wgpu::Features::SHADER_F16),
    ("texture-compression-astc", wgpu::Features::TEXTURE_COMPRESSION_ASTC),
    ("texture-compression-bc", wgpu::Features::TEXTURE_COMPRESSION_BC),
    ("texture-compression-etc2", wgpu::Features::TEXTURE_COMPRESSION_ETC2),
    ("timestamp-query", wgpu::Features::TIMESTAMP_QUERY),
];

pub struct HeadlessContext {
    #[allow(unused)]
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    depth_view: Option<wgpu::TextureView>,
    errors: Arc<Mutex<VecDeque<ApiError>>>,
    width: u32,
    height: u32,
}

impl HeadlessContext {
    /// Creates an instance, adapter, device and render target matching
    /// `config`. Blocking; test binaries call this from `main`.
    pub fn new(config: &TestConfig) -> Result<Self, ContextError> {
        pollster::block_on(Self::new_async(config))
    }

    pub async fn new_async(config: &TestConfig) -> Result<Self, ContextError> {
        for bit in [VisualAttributes::DOUBLE, VisualAttributes::ACCUM] {
            if config.visual.contains(bit) {
                log::info!("visual bit {bit:?} is inapplicable headless; ignored");
            }
        }

        let backends = wgpu::Backends::from_env().unwrap_or_default();
        let flags = wgpu::InstanceFlags::from_build_config().with_env();
        let backend_options = wgpu::BackendOptions::from_env_or_default();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            flags,
            backend_options,
            ..Default::default()
        });
        let adapter = wgpu::util::initialize_adapter_from_env_or_default(&instance, None)
            .await
            .map_err(|_| ContextError::NoCompatibleDevice)?;
        log::info!("using adapter: {}", adapter.get_info().name);

        let optional = FEATURE_NAMES
            .iter()
            .fold(wgpu::Features::empty(), |acc, (_, feature)| acc | *feature);
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: adapter.features() & optional,
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await?;

        let errors: Arc<Mutex<VecDeque<ApiError>>> = Arc::default();
        let sink = Arc::clone(&errors);
        device.on_uncaptured_error(Box::new(move |error| {
            log::debug!("captured context error: {error}");
            sink.lock().unwrap().push_back(map_wgpu_error(&error));
        }));

        let width = config.window_width;
        let height = config.window_height;
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("conform target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let wants_depth = config
            .visual
            .intersects(VisualAttributes::DEPTH | VisualAttributes::STENCIL);
        let depth_view = wants_depth.then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("conform depth-stencil"),
                    size: wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: wgpu::TextureFormat::Depth24PlusStencil8,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            target,
            target_view,
            depth_view,
            errors,
            width,
            height,
        })
    }

    /// The color attachment test bodies render into.
    pub fn target_view(&self) -> &wgpu::TextureView {
        &self.target_view
    }

    /// The depth-stencil attachment, when the visual asked for one.
    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth_view.as_ref()
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Waits for the device to go idle, pumping callbacks (map results
    /// and error delivery included).
    pub fn sync(&self) -> Result<(), ContextError> {
        self.device.poll(wgpu::PollType::wait())?;
        Ok(())
    }
}

impl ContextApi for HeadlessContext {
    fn version(&self) -> ApiVersion {
        // The baseline everybody gets; capabilities above it travel as
        // extensions rather than version bumps.
        ApiVersion::new(1, 0)
    }

    fn profile(&self) -> Profile {
        Profile::Core
    }

    fn extensions(&self) -> Vec<String> {
        let features = self.device.features();
        FEATURE_NAMES
            .iter()
            .filter(|(_, feature)| features.contains(*feature))
            .map(|(name, _)| (*name).to_string())
            .collect()
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_pixels(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Vec<[f32; 4]>, ContextError> {
        if x.checked_add(width).is_none_or(|right| right > self.width)
            || y.checked_add(height).is_none_or(|bottom| bottom > self.height)
        {
            return Err(ContextError::ReadbackOutOfBounds {
                x,
                y,
                width,
                height,
                surface_width: self.width,
                surface_height: self.height,
            });
        }

        let padded_byte_width = (width * 4).next_multiple_of(256);
        let buffer_size = padded_byte_width as u64 * height as u64;
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("conform readback"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("conform readback copy"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_byte_width),
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit([encoder.finish()]);

        let buf_slice = buffer.slice(..);
        let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
        buf_slice.map_async(wgpu::MapMode::Read, move |v| drop(sender.send(v)));
        self.device.poll(wgpu::PollType::wait())?;
        match pollster::block_on(receiver.receive()) {
            Some(result) => result?,
            None => return Err(ContextError::ChannelClosed),
        }

        let data = buf_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height {
            let start = (row * padded_byte_width) as usize;
            let row_bytes = &data[start..start + (width * 4) as usize];
            pixels.extend(row_bytes.chunks_exact(4).map(|rgba| {
                [
                    f32::from(rgba[0]) / 255.0,
                    f32::from(rgba[1]) / 255.0,
                    f32::from(rgba[2]) / 255.0,
                    f32::from(rgba[3]) / 255.0,
                ]
            }));
        }
        Ok(pixels)
    }

    fn take_error(&mut self) -> Option<ApiError> {
        self.errors.lock().unwrap().pop_front()
    }

    fn present(&mut self) -> Result<FrameStatus, ContextError> {
        // No surface to swap; settling the device is the closest
        // equivalent, and it keeps the error queue current.
        self.sync()?;
        Ok(FrameStatus::Presented)
    }
}

fn map_wgpu_error(error: &wgpu::Error) -> ApiError {
    match error {
        wgpu::Error::OutOfMemory { .. } => ApiError::OutOfMemory,
        wgpu::Error::Validation { .. } => ApiError::InvalidOperation,
        _ => ApiError::Internal,
    }
}
