use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::{GlassSurface, Renderer};
use scheduler::FrameHost;

/// Where rendered frames are written.
#[derive(Debug, Clone)]
pub enum PngTarget {
    /// Every frame overwrites one file.
    File(PathBuf),
    /// Frames are numbered `frame_0000.png`, `frame_0001.png`, ...
    Sequence(PathBuf),
}

/// Frame host that rasterizes with a [`Renderer`] and encodes PNG files.
pub struct PngHost {
    renderer: Renderer,
    target: PngTarget,
    written: Vec<PathBuf>,
}

impl PngHost {
    pub fn new(renderer: Renderer, target: PngTarget) -> Result<Self> {
        let dir = match &target {
            PngTarget::File(path) => path.parent().map(Path::to_path_buf),
            PngTarget::Sequence(dir) => Some(dir.clone()),
        };
        if let Some(dir) = dir.filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        }
        Ok(Self {
            renderer,
            target,
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn next_path(&self) -> PathBuf {
        match &self.target {
            PngTarget::File(path) => path.clone(),
            PngTarget::Sequence(dir) => dir.join(format!("frame_{:04}.png", self.written.len())),
        }
    }
}

impl FrameHost for PngHost {
    type Error = anyhow::Error;

    fn draw(&mut self, surface: &GlassSurface) -> Result<()> {
        let frame = self.renderer.render(surface)?;
        let path = self.next_path();
        frame
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write frame {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            width = frame.width(),
            height = frame.height(),
            motion = surface.motion_value(),
            backend = %self.renderer.backend(),
            "wrote frame"
        );
        self.written.push(path);
        Ok(())
    }
}
