use glassconfig::{EffectConfig, InteractionMode};
use image::RgbaImage;

use crate::cpu::render_frame;
use crate::frame::FrameState;
use crate::motion::{MotionCell, MotionController};
use crate::texture::SourceTexture;
use crate::types::{ContainerRect, PointerSample, Rgba, SurfaceSize, Viewport};
use crate::warp::{shade, WarpParams};

/// One fluted-glass instance: resolved settings, the bound image, and the
/// per-frame state its input signals feed.
///
/// Once deactivated the surface ignores every further signal.
#[derive(Debug)]
pub struct GlassSurface {
    config: EffectConfig,
    frame: FrameState,
    controller: MotionController,
    texture: SourceTexture,
    active: bool,
}

impl GlassSurface {
    /// A degenerate initial size falls back to the image's own pixel size.
    pub fn new(config: EffectConfig, texture: SourceTexture, size: SurfaceSize) -> Self {
        let size = if size.is_degenerate() {
            let dims = texture.dimensions();
            tracing::debug!(
                width = dims.width,
                height = dims.height,
                "initial surface size is degenerate; using image size"
            );
            SurfaceSize::from_pixels(dims.width.max(1), dims.height.max(1))
        } else {
            size
        };
        let cell = MotionCell::default();
        let controller = MotionController::new(&config, cell.clone());
        tracing::debug!(
            mode = %config.interaction_mode(),
            segments = config.segment_count(),
            width = size.width,
            height = size.height,
            "glass surface created"
        );
        Self {
            config,
            frame: FrameState::new(size, cell),
            controller,
            texture,
            active: true,
        }
    }

    /// Setup-time motion update, so scroll mode starts at the right phase
    /// before the first scroll arrives.
    pub fn prime(&mut self, container: &ContainerRect, viewport: Viewport) -> bool {
        self.active && self.controller.prime(container, viewport)
    }

    pub fn resize(&mut self, size: SurfaceSize) -> bool {
        self.active && self.frame.resize(size)
    }

    pub fn pointer_move(
        &mut self,
        pointer: PointerSample,
        container: &ContainerRect,
        viewport: Viewport,
    ) -> bool {
        self.active && self.controller.on_pointer_move(pointer, container, viewport)
    }

    pub fn scroll(&mut self, container: &ContainerRect, viewport: Viewport) -> bool {
        self.active && self.controller.on_scroll(container, viewport)
    }

    /// Snapshot read by the next frame.
    pub fn params(&self) -> WarpParams {
        WarpParams::new(&self.config, &self.frame)
    }

    /// Color at one surface coordinate under the current state.
    pub fn sample(&self, uv: [f32; 2]) -> Rgba {
        shade(uv, &self.params(), &self.texture)
    }

    /// Rasterizes the current state on the CPU at the surface's pixel size.
    pub fn render(&self) -> RgbaImage {
        let (width, height) = self.frame.surface_size().pixel_dimensions();
        render_frame(&self.params(), &self.texture, width, height)
    }

    pub fn motion_value(&self) -> f32 {
        self.frame.motion_value()
    }

    pub fn set_motion_value(&mut self, value: f32) {
        if self.active {
            self.frame.set_motion_value(value);
        }
    }

    pub fn deactivate(&mut self) {
        if self.active {
            tracing::debug!("glass surface deactivated");
        }
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> InteractionMode {
        self.controller.mode()
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.frame.surface_size()
    }

    pub fn texture(&self) -> &SourceTexture {
        &self.texture
    }
}

#[cfg(test)]
mod tests {
    use glassconfig::{EffectSettings, ImageDimensions};
    use image::Rgba as Pixel;

    use super::*;

    fn checker() -> SourceTexture {
        let image = RgbaImage::from_fn(16, 12, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Pixel([230, 40, 40, 255])
            } else {
                Pixel([20, 20, 200, 255])
            }
        });
        SourceTexture::from_rgba(image)
    }

    fn surface(mode: InteractionMode) -> GlassSurface {
        let texture = checker();
        let settings = EffectSettings {
            segments: Some(12.0),
            mode: Some(mode),
            ..EffectSettings::default()
        };
        let config = EffectConfig::resolve(&settings, texture.dimensions())
            .expect("valid settings");
        GlassSurface::new(config, texture, SurfaceSize::new(40.0, 30.0))
    }

    #[test]
    fn static_mode_ignores_pointer_storm() {
        let mut glass = surface(InteractionMode::Static);
        let before = glass.render();
        let container = ContainerRect::new(0.0, 0.0, 40.0, 30.0);
        let viewport = Viewport::new(40.0, 30.0);
        for i in 0..100 {
            let pointer = PointerSample::new(i as f32 * 0.4, 10.0);
            assert!(!glass.pointer_move(pointer, &container, viewport));
        }
        assert_eq!(glass.motion_value(), 0.5);
        assert_eq!(glass.render(), before);
    }

    #[test]
    fn resize_changes_next_frame_dimensions() {
        let mut glass = surface(InteractionMode::Static);
        assert!(glass.resize(SurfaceSize::new(20.0, 10.0)));
        assert_eq!(glass.render().dimensions(), (20, 10));
        assert!((glass.params().canvas_aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn pointer_mode_moves_phase() {
        let mut glass = surface(InteractionMode::Pointer);
        let container = ContainerRect::new(0.0, 0.0, 40.0, 30.0);
        let viewport = Viewport::new(40.0, 30.0);
        assert!(glass.pointer_move(PointerSample::new(20.0, 5.0), &container, viewport));
        assert!((glass.motion_value() - 1.0).abs() < 1e-6);
        assert!((glass.params().motion - 1.0).abs() < 1e-6);
    }

    #[test]
    fn deactivated_surface_ignores_signals() {
        let mut glass = surface(InteractionMode::Pointer);
        glass.deactivate();
        let container = ContainerRect::new(0.0, 0.0, 40.0, 30.0);
        let viewport = Viewport::new(40.0, 30.0);
        assert!(!glass.pointer_move(PointerSample::new(40.0, 5.0), &container, viewport));
        assert!(!glass.resize(SurfaceSize::new(10.0, 10.0)));
        assert_eq!(glass.motion_value(), 0.5);
        assert!(!glass.is_active());
    }

    #[test]
    fn sample_follows_motion_override() {
        let mut glass = surface(InteractionMode::Static);
        let uv = [0.37, 0.61];
        let resting = glass.sample(uv);
        assert_eq!(resting, shade(uv, &glass.params(), glass.texture()));

        glass.set_motion_value(0.9);
        assert_eq!(glass.motion_value(), 0.9);
        assert_eq!(glass.params().motion, 0.9);
        assert_eq!(glass.sample(uv), shade(uv, &glass.params(), glass.texture()));
    }

    #[test]
    fn degenerate_initial_size_uses_image_size() {
        let texture = checker();
        let config =
            EffectConfig::resolve(&EffectSettings::default(), ImageDimensions::new(16, 12))
                .expect("defaults resolve");
        let glass = GlassSurface::new(config, texture, SurfaceSize::new(0.0, 0.0));
        assert_eq!(glass.surface_size(), SurfaceSize::new(16.0, 12.0));
    }
}
