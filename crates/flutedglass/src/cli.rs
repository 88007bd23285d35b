use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use renderer::Backend;

#[derive(Parser, Debug)]
#[command(
    name = "flutedglass",
    author,
    version,
    about = "Fluted glass image renderer"
)]
pub struct Cli {
    /// Effect configuration file; defaults to `effect.toml` in the config directory.
    #[arg(long, global = true, value_name = "PATH", env = "FLUTEDGLASS_CONFIG")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a single frame to a PNG file.
    Render(RenderArgs),
    /// Render a series of frames while sweeping the active input.
    Sequence(SequenceArgs),
    /// Print the resolved effect settings as JSON.
    Config(ConfigArgs),
}

/// Per-effect overrides layered on top of the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct EffectArgs {
    /// Rib angle in degrees.
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true)]
    pub rotation: Option<f32>,

    /// Number of ribs across the rotated axis.
    #[arg(long, value_name = "COUNT")]
    pub segments: Option<f32>,

    /// Shadow/highlight tint strength, 0-100.
    #[arg(long, value_name = "PERCENT")]
    pub overlay: Option<f32>,

    /// Interaction mode: `static`, `pointer` (alias `mouse`), or `scroll`.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Motion factor applied to pointer and scroll input.
    #[arg(long, value_name = "FACTOR", allow_negative_numbers = true)]
    pub motion: Option<f32>,

    /// Extra scale applied to pointer movement.
    #[arg(long, value_name = "FACTOR", allow_negative_numbers = true)]
    pub pointer_attenuation: Option<f32>,

    /// Markup-style attribute, e.g. `fluted-glass-segments=40`. Parsed leniently.
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct SurfaceArgs {
    /// One or more candidate images; one is picked at random.
    #[arg(value_name = "IMAGE", required = true)]
    pub images: Vec<PathBuf>,

    /// Output size (e.g. `1280x720`); defaults to the image size.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Viewport size used for pointer and scroll math; defaults to the output size.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub viewport: Option<(u32, u32)>,

    /// Rasterizer: `cpu` or `gpu`. GPU failures fall back to the CPU.
    #[arg(long, value_name = "BACKEND", default_value_t = Backend::default())]
    pub backend: Backend,

    /// Seed for image selection; omitted means a fresh random choice.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub effect: EffectArgs,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub surface: SurfaceArgs,

    /// Destination PNG file.
    #[arg(long, short, value_name = "FILE")]
    pub out: PathBuf,

    /// Pointer x position in viewport pixels (pointer mode).
    #[arg(long, value_name = "PX", allow_negative_numbers = true)]
    pub pointer_x: Option<f32>,

    /// Pointer y position in viewport pixels; defaults to the container centre.
    #[arg(long, value_name = "PX", allow_negative_numbers = true)]
    pub pointer_y: Option<f32>,

    /// Container top edge relative to the viewport (scroll mode).
    #[arg(long, value_name = "PX", allow_negative_numbers = true)]
    pub scroll_top: Option<f32>,
}

#[derive(Args, Debug)]
pub struct SequenceArgs {
    #[command(flatten)]
    pub surface: SurfaceArgs,

    /// Directory receiving `frame_0000.png`, `frame_0001.png`, ...
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Number of frames to render.
    #[arg(long, value_name = "N", default_value_t = 24)]
    pub frames: u32,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Resolve the aspect ratio against this image.
    #[arg(long, value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    #[command(flatten)]
    pub effect: EffectArgs,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

pub fn parse_attribute(value: &str) -> Result<(String, String), String> {
    let (key, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("attribute name must not be empty".to_string());
    }
    Ok((key.to_string(), raw.to_string()))
}
