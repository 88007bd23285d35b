use image::{Rgba as Pixel, RgbaImage};

use crate::texture::Sampler;
use crate::types::Rgba;
use crate::warp::{shade, WarpParams};

/// Rasterizes one frame by evaluating the warp at every pixel centre.
///
/// Row 0 of the output is the top of the surface, so `uv.y` runs downward
/// from 1 to 0.
pub fn render_frame<S>(params: &WarpParams, sampler: &S, width: u32, height: u32) -> RgbaImage
where
    S: Sampler + ?Sized,
{
    let width = width.max(1);
    let height = height.max(1);
    let inv_width = 1.0 / width as f32;
    let inv_height = 1.0 / height as f32;

    RgbaImage::from_fn(width, height, |x, y| {
        let uv = [
            (x as f32 + 0.5) * inv_width,
            1.0 - (y as f32 + 0.5) * inv_height,
        ];
        to_pixel(shade(uv, params, sampler))
    })
}

fn to_pixel(color: Rgba) -> Pixel<u8> {
    Pixel(color.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8))
}
