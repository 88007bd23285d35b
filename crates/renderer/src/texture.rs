use std::path::Path;

use anyhow::{Context, Result};
use glassconfig::ImageDimensions;
use image::{DynamicImage, RgbaImage};

use crate::types::Rgba;

/// Source of color samples addressed by UV.
///
/// `v = 0` is the bottom row and `v = 1` the top, matching GL texture space.
pub trait Sampler {
    fn sample(&self, uv: [f32; 2]) -> Rgba;
}

impl<F> Sampler for F
where
    F: Fn([f32; 2]) -> Rgba,
{
    fn sample(&self, uv: [f32; 2]) -> Rgba {
        self(uv)
    }
}

/// Decoded source image sampled with bilinear filtering and clamp-to-edge
/// addressing.
#[derive(Debug, Clone)]
pub struct SourceTexture {
    image: RgbaImage,
}

impl SourceTexture {
    pub fn load(path: &Path) -> Result<Self> {
        let decoded = image::open(path)
            .with_context(|| format!("failed to load source image {}", path.display()))?;
        let texture = Self::from_image(decoded);
        tracing::debug!(
            path = %path.display(),
            width = texture.image.width(),
            height = texture.image.height(),
            "loaded source image"
        );
        Ok(texture)
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn texel(&self, x: i64, y: i64) -> Rgba {
        let max_x = i64::from(self.image.width()) - 1;
        let max_y = i64::from(self.image.height()) - 1;
        let pixel = self
            .image
            .get_pixel(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32);
        let [r, g, b, a] = pixel.0;
        [
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        ]
    }
}

impl Sampler for SourceTexture {
    fn sample(&self, uv: [f32; 2]) -> Rgba {
        let width = self.image.width();
        let height = self.image.height();
        if width == 0 || height == 0 {
            return [0.0; 4];
        }

        // Texel centres sit at (i + 0.5) / size; row 0 of the image is the top.
        let x = uv[0] * width as f32 - 0.5;
        let y = (1.0 - uv[1]) * height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top_left = self.texel(x0, y0);
        let top_right = self.texel(x0 + 1, y0);
        let bottom_left = self.texel(x0, y0 + 1);
        let bottom_right = self.texel(x0 + 1, y0 + 1);

        let mut out = [0.0; 4];
        for channel in 0..4 {
            let top = lerp(top_left[channel], top_right[channel], fx);
            let bottom = lerp(bottom_left[channel], bottom_right[channel], fx);
            out[channel] = lerp(top, bottom, fy);
        }
        out
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use image::Rgba as Pixel;

    use super::*;

    fn two_by_two() -> SourceTexture {
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Pixel([255, 0, 0, 255]));
        image.put_pixel(1, 0, Pixel([0, 255, 0, 255]));
        image.put_pixel(0, 1, Pixel([0, 0, 255, 255]));
        image.put_pixel(1, 1, Pixel([255, 255, 255, 255]));
        SourceTexture::from_rgba(image)
    }

    #[test]
    fn texel_centres_return_exact_colors() {
        let texture = two_by_two();
        assert_eq!(texture.sample([0.25, 0.75]), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(texture.sample([0.75, 0.75]), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(texture.sample([0.25, 0.25]), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn centre_blends_all_four_texels() {
        let texture = two_by_two();
        let color = texture.sample([0.5, 0.5]);
        assert!((color[0] - 0.5).abs() < 1e-6);
        assert!((color[1] - 0.5).abs() < 1e-6);
        assert!((color[2] - 0.5).abs() < 1e-6);
        assert_eq!(color[3], 1.0);
    }

    #[test]
    fn edges_clamp_instead_of_wrapping() {
        let texture = two_by_two();
        assert_eq!(texture.sample([0.0, 1.0]), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(texture.sample([1.0, 0.0]), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn reports_image_dimensions() {
        let texture = SourceTexture::from_rgba(RgbaImage::new(8, 3));
        assert_eq!(texture.dimensions(), ImageDimensions::new(8, 3));
    }
}
