use anyhow::{bail, Result};
use image::{imageops, RgbaImage};
use wgpu::util::DeviceExt;

use crate::texture::SourceTexture;

pub(crate) struct SourceResources {
    pub _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl SourceResources {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &SourceTexture,
        max_dimension: u32,
    ) -> Result<Self> {
        let image = source.image();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            bail!("source image has no pixels");
        }
        if width > max_dimension || height > max_dimension {
            bail!(
                "source image {width}x{height} exceeds the device texture limit of {max_dimension}"
            );
        }

        // Texture space puts v = 0 at the bottom row.
        let flipped: RgbaImage = imageops::flip_vertical(image);

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("source image"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            flipped.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("source sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        tracing::debug!(width, height, "uploaded source texture");
        Ok(Self {
            _texture: texture,
            view,
            sampler,
        })
    }
}
