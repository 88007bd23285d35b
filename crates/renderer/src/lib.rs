//! Fluted glass renderer.
//!
//! Turns a source image plus a handful of effect settings into frames of a
//! ribbed-glass distortion. The flow is:
//!
//! ```text
//!   EffectConfig + SourceTexture
//!          │
//!          ▼
//!   GlassSurface ◀── resize / pointer / scroll ── MotionController
//!          │ params()
//!          ▼
//!   Renderer ──▶ Cpu: render_frame()  (per-pixel warp::shade)
//!            └─▶ Gpu: GpuRenderer     (GLSL twin, offscreen readback)
//! ```
//!
//! `warp` holds the pure mapping and is the single source of truth for the
//! effect; the fragment shader in `compile` mirrors it. Everything that
//! mutates between frames lives in `GlassSurface`.

mod compile;
mod cpu;
mod frame;
mod gpu;
mod motion;
mod surface;
mod texture;
mod types;
pub mod warp;

use anyhow::Result;
use image::RgbaImage;

pub use cpu::render_frame;
pub use frame::FrameState;
pub use gpu::GpuRenderer;
pub use motion::{MotionCell, MotionController, RESTING_MOTION, SCROLL_MAX_MOVEMENT};
pub use surface::GlassSurface;
pub use texture::{Sampler, SourceTexture};
pub use types::{Backend, ContainerRect, PointerSample, Rgba, SurfaceSize, Viewport};
pub use warp::WarpParams;

/// Rasterizes [`GlassSurface`] frames with the selected backend.
///
/// A GPU renderer is bound to the texture it was built from.
pub enum Renderer {
    Cpu,
    Gpu(Box<GpuRenderer>),
}

impl Renderer {
    pub fn new(backend: Backend, surface: &GlassSurface) -> Result<Self> {
        match backend {
            Backend::Cpu => Ok(Self::Cpu),
            Backend::Gpu => Ok(Self::Gpu(Box::new(GpuRenderer::new(surface.texture())?))),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::Cpu => Backend::Cpu,
            Self::Gpu(_) => Backend::Gpu,
        }
    }

    pub fn render(&mut self, surface: &GlassSurface) -> Result<RgbaImage> {
        match self {
            Self::Cpu => Ok(surface.render()),
            Self::Gpu(gpu) => {
                let (width, height) = surface.surface_size().pixel_dimensions();
                gpu.render(&surface.params(), width, height)
            }
        }
    }
}
