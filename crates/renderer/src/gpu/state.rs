use anyhow::{anyhow, bail, Context, Result};
use image::RgbaImage;

use crate::texture::SourceTexture;
use crate::warp::WarpParams;

use super::context::GpuContext;
use super::pipeline::{FlutedPipeline, TARGET_FORMAT};
use super::source::SourceResources;
use super::uniforms::FlutedUniforms;

const BYTES_PER_PIXEL: u32 = 4;

/// Render target plus the staging buffer it is copied into.
struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
}

impl Target {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("fluted target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let padded_bytes_per_row = padded_row_bytes(width);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fluted readback"),
            size: u64::from(padded_bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            texture,
            view,
            readback,
            width,
            height,
            padded_bytes_per_row,
        }
    }
}

/// Rows copied out of a texture must start on a 256-byte boundary.
fn padded_row_bytes(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Offscreen renderer bound to one source image.
///
/// The render target is rebuilt only when the requested size changes.
pub struct GpuRenderer {
    context: GpuContext,
    pipeline: FlutedPipeline,
    _source: SourceResources,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    target: Option<Target>,
}

impl GpuRenderer {
    pub fn new(source: &SourceTexture) -> Result<Self> {
        let context = GpuContext::new()?;
        let resources = SourceResources::upload(
            &context.device,
            &context.queue,
            source,
            context.max_texture_dimension,
        )?;
        let pipeline = FlutedPipeline::new(&context.device, &resources);

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fluted uniforms"),
            size: std::mem::size_of::<FlutedUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        Ok(Self {
            context,
            pipeline,
            _source: resources,
            uniform_buffer,
            uniform_bind_group,
            target: None,
        })
    }

    /// Draws one frame and copies it back into host memory.
    pub fn render(&mut self, params: &WarpParams, width: u32, height: u32) -> Result<RgbaImage> {
        let width = width.max(1);
        let height = height.max(1);
        let limit = self.context.max_texture_dimension;
        if width > limit || height > limit {
            bail!("frame {width}x{height} exceeds the device texture limit of {limit}");
        }

        let uniforms = FlutedUniforms::from_params(params);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let rebuild = self
            .target
            .as_ref()
            .is_none_or(|target| target.width != width || target.height != height);
        if rebuild {
            tracing::debug!(width, height, "allocating GPU render target");
            self.target = Some(Target::new(&self.context.device, width, height));
        }
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| anyhow!("render target missing after allocation"))?;

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("fluted encoder"),
                });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("fluted pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_bind_group(1, &self.pipeline.source_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &target.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(target.padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.context.queue.submit(Some(encoder.finish()));

        read_target(&self.context.device, target)
    }
}

fn read_target(device: &wgpu::Device, target: &Target) -> Result<RgbaImage> {
    let slice = target.readback.slice(..);
    let (sender, receiver) = crossbeam_channel::bounded(1);
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device
        .poll(wgpu::PollType::Wait)
        .context("failed to wait for GPU readback")?;
    receiver
        .recv()
        .context("GPU readback callback was dropped")?
        .context("failed to map GPU readback buffer")?;

    let row_bytes = (target.width * BYTES_PER_PIXEL) as usize;
    let mut pixels = Vec::with_capacity(row_bytes * target.height as usize);
    {
        let mapped = slice.get_mapped_range();
        for row in mapped.chunks(target.padded_bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..row_bytes]);
        }
    }
    target.readback.unmap();

    RgbaImage::from_raw(target.width, target.height, pixels)
        .ok_or_else(|| anyhow!("GPU readback returned a short buffer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_copy_alignment() {
        assert_eq!(padded_row_bytes(1), 256);
        assert_eq!(padded_row_bytes(64), 256);
        assert_eq!(padded_row_bytes(65), 512);
        assert_eq!(padded_row_bytes(1920), 7680);
    }
}
