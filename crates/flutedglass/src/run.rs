use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glassconfig::{EffectConfig, EffectSettings, ImageDimensions, InteractionMode};
use renderer::{
    Backend, ContainerRect, GlassSurface, PointerSample, Renderer, SourceTexture, SurfaceSize,
    Viewport,
};
use scheduler::{FrameLoop, Signal, SourcePicker};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{ConfigArgs, RenderArgs, SequenceArgs, SurfaceArgs};
use crate::host::{PngHost, PngTarget};
use crate::settings;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// A surface bound to its image, placed in a viewport, plus the renderer
/// chosen for it.
struct Prepared {
    surface: GlassSurface,
    container: ContainerRect,
    viewport: Viewport,
    renderer: Renderer,
}

pub fn render(config: Option<&Path>, args: RenderArgs) -> Result<()> {
    let Prepared {
        surface,
        container,
        viewport,
        renderer,
    } = prepare(config, &args.surface)?;

    let host = PngHost::new(renderer, PngTarget::File(args.out.clone()))?;
    let mut frames = FrameLoop::new(surface, host);

    if let Some(x) = args.pointer_x {
        let y = args
            .pointer_y
            .unwrap_or(container.top + container.height * 0.5);
        frames.push(Signal::PointerMove {
            pointer: PointerSample::new(x, y),
            container,
            viewport,
        });
    }
    if let Some(top) = args.scroll_top {
        frames.push(Signal::Scroll {
            container: ContainerRect { top, ..container },
            viewport,
        });
    }

    frames.tick()?;
    let motion = frames.surface().motion_value();
    frames.push(Signal::Teardown);
    frames.tick()?;

    tracing::info!(path = %args.out.display(), motion, "rendered frame");
    Ok(())
}

pub fn sequence(config: Option<&Path>, args: SequenceArgs) -> Result<()> {
    if args.frames == 0 {
        bail!("--frames must be at least 1");
    }
    let Prepared {
        surface,
        container,
        viewport,
        renderer,
    } = prepare(config, &args.surface)?;
    let mode = surface.mode();

    let host = PngHost::new(renderer, PngTarget::Sequence(args.out_dir.clone()))?;
    let mut frames = FrameLoop::new(surface, host);

    for index in 0..args.frames {
        let t = if args.frames > 1 {
            index as f32 / (args.frames - 1) as f32
        } else {
            0.5
        };
        if let Some(signal) = sweep_signal(mode, t, container, viewport) {
            frames.push(signal);
        }
        frames.tick()?;
    }
    frames.push(Signal::Teardown);
    frames.tick()?;

    tracing::info!(
        dir = %args.out_dir.display(),
        frames = frames.host().written().len(),
        %mode,
        "rendered sequence"
    );
    Ok(())
}

/// Input for step `t` in `[0, 1]` of a sweep: the pointer crosses the
/// container left to right along its middle row, or the container scrolls
/// from the viewport's bottom edge to just past its top.
fn sweep_signal(
    mode: InteractionMode,
    t: f32,
    container: ContainerRect,
    viewport: Viewport,
) -> Option<Signal> {
    match mode {
        InteractionMode::Static => None,
        InteractionMode::Pointer => Some(Signal::PointerMove {
            pointer: PointerSample::new(
                container.left + container.width * t,
                container.top + container.height * 0.5,
            ),
            container,
            viewport,
        }),
        InteractionMode::Scroll => Some(Signal::Scroll {
            container: ContainerRect {
                top: viewport.height - (viewport.height + container.height) * t,
                ..container
            },
            viewport,
        }),
    }
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    config_file: Option<&'a Path>,
    image: Option<&'a Path>,
    settings: &'a EffectSettings,
    resolved: EffectConfig,
}

pub fn print_config(config: Option<&Path>, args: ConfigArgs) -> Result<()> {
    let loaded = settings::load(config, &args.effect)?;
    let dimensions = match &args.image {
        Some(path) => {
            let (width, height) = image::image_dimensions(path)
                .with_context(|| format!("failed to read image header {}", path.display()))?;
            ImageDimensions::new(width, height)
        }
        None => ImageDimensions::new(1, 1),
    };
    let resolved = EffectConfig::resolve(&loaded.settings, dimensions)
        .context("failed to resolve effect settings")?;

    let report = ConfigReport {
        config_file: loaded.source.as_deref(),
        image: args.image.as_deref(),
        settings: &loaded.settings,
        resolved,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn prepare(config: Option<&Path>, args: &SurfaceArgs) -> Result<Prepared> {
    let loaded = settings::load(config, &args.effect)?;

    let mut picker = match args.seed {
        Some(seed) => SourcePicker::new(seed),
        None => SourcePicker::from_entropy(),
    };
    let image_path: &PathBuf = picker.pick(&args.images)?;
    let texture = SourceTexture::load(image_path)?;
    let dimensions = texture.dimensions();
    let effect = EffectConfig::resolve(&loaded.settings, dimensions)
        .with_context(|| format!("cannot apply effect to {}", image_path.display()))?;

    let (width, height) = args
        .size
        .unwrap_or((dimensions.width, dimensions.height));
    let size = SurfaceSize::from_pixels(width, height);
    let (viewport_width, viewport_height) = args.viewport.unwrap_or((width, height));
    let viewport = Viewport::new(viewport_width as f32, viewport_height as f32);
    let container = ContainerRect::new(0.0, 0.0, size.width, size.height);

    tracing::info!(
        image = %image_path.display(),
        candidates = args.images.len(),
        width,
        height,
        mode = %effect.interaction_mode(),
        "preparing glass surface"
    );

    let mut surface = GlassSurface::new(effect, texture, size);
    surface.prime(&container, viewport);
    let renderer = build_renderer(args.backend, &surface)?;

    Ok(Prepared {
        surface,
        container,
        viewport,
        renderer,
    })
}

fn build_renderer(backend: Backend, surface: &GlassSurface) -> Result<Renderer> {
    match Renderer::new(backend, surface) {
        Ok(renderer) => Ok(renderer),
        Err(err) if backend == Backend::Gpu => {
            tracing::warn!(
                error = %format!("{err:#}"),
                "GPU backend unavailable; falling back to CPU"
            );
            Renderer::new(Backend::Cpu, surface)
        }
        Err(err) => Err(err),
    }
}
