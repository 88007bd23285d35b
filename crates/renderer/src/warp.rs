//! The fluted glass warp: a pure mapping from surface UV to a sampled color.
//!
//! Per pixel:
//!
//! ```text
//!   uv ─▶ aspect_correct ─▶ rotate(+θ) ─▶ slice_progress ─▶ + flute_offset
//!                                                                  │
//!   color ◀─ apply_overlay ◀─ sample ◀─ mirror_tile ◀─ rotate(−θ) ◀┘
//! ```
//!
//! The GLSL fragment shader in `compile.rs` is the GPU twin of [`shade`] and
//! must be kept in step with it.

use std::f32::consts::PI;

use glassconfig::EffectConfig;

use crate::frame::FrameState;
use crate::texture::Sampler;
use crate::types::Rgba;

/// Peak displacement of a rib, in normalized UV units.
pub const FLUTE_AMPLITUDE: f32 = 0.015;

const SHADOW_STRENGTH: f32 = 0.05;
const SHADOW_FREQUENCY: f32 = 0.5;
const SHADOW_PHASE: f32 = 1.57;
const HIGHLIGHT_STRENGTH: f32 = 0.15;
const HIGHLIGHT_FREQUENCY: f32 = 0.7;
const HIGHLIGHT_PHASE: f32 = -0.7;

/// Per-frame snapshot of everything the warp reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpParams {
    pub canvas_aspect: f32,
    pub image_aspect: f32,
    pub rotation_radians: f32,
    pub segments: f32,
    pub motion: f32,
    pub overlay_opacity_percent: f32,
}

impl WarpParams {
    pub fn new(config: &EffectConfig, frame: &FrameState) -> Self {
        Self {
            canvas_aspect: frame.surface_size().aspect(),
            image_aspect: config.image_aspect_ratio(),
            rotation_radians: config.rotation_radians(),
            segments: config.segment_count(),
            motion: frame.motion_value(),
            overlay_opacity_percent: config.overlay_opacity_percent(),
        }
    }
}

/// Result of mapping one surface coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpSample {
    /// Texture coordinate, always inside `[0, 1]²`.
    pub uv: [f32; 2],
    /// Position within the current rib, in `[0, 1)`.
    pub slice_progress: f32,
}

/// Letterboxes the image so it covers the surface without distorting it.
pub fn aspect_correct(uv: [f32; 2], canvas_aspect: f32, image_aspect: f32) -> [f32; 2] {
    let scale = if image_aspect > canvas_aspect {
        [canvas_aspect / image_aspect, 1.0]
    } else {
        [1.0, image_aspect / canvas_aspect]
    };
    [
        (uv[0] - 0.5) * scale[0] + 0.5,
        (uv[1] - 0.5) * scale[1] + 0.5,
    ]
}

pub fn rotate_about_center(uv: [f32; 2], radians: f32) -> [f32; 2] {
    let (sin, cos) = radians.sin_cos();
    let x = uv[0] - 0.5;
    let y = uv[1] - 0.5;
    [cos * x - sin * y + 0.5, sin * x + cos * y + 0.5]
}

/// GLSL-style `fract`: `x - floor(x)`.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Sawtooth in `[0, 1)` restarting every `1 / segments` along the rotated axis.
pub fn slice_progress(rotated_u: f32, segments: f32, motion: f32) -> f32 {
    fract(rotated_u * segments + motion)
}

/// Lens-shaped displacement within one rib; zero at both rib edges.
pub fn flute_offset(slice_progress: f32) -> f32 {
    FLUTE_AMPLITUDE
        * (slice_progress * PI * 2.0).sin()
        * (1.0 - 0.5 * (slice_progress - 0.5).abs())
}

/// Ping-pong tiling: odd tiles on each axis are mirrored.
pub fn mirror_tile(uv: [f32; 2]) -> [f32; 2] {
    [mirror_axis(uv[0]), mirror_axis(uv[1])]
}

fn mirror_axis(value: f32) -> f32 {
    let tile = value.floor();
    let local = fract(value);
    if tile.rem_euclid(2.0) == 1.0 {
        1.0 - local
    } else {
        local
    }
}

/// Maps a surface coordinate to the texture coordinate it should sample.
pub fn map_uv(uv: [f32; 2], params: &WarpParams) -> WarpSample {
    let corrected = aspect_correct(uv, params.canvas_aspect, params.image_aspect);
    let mut rotated = rotate_about_center(corrected, params.rotation_radians);
    let progress = slice_progress(rotated[0], params.segments, params.motion);
    rotated[0] += flute_offset(progress);
    let restored = rotate_about_center(rotated, -params.rotation_radians);
    WarpSample {
        uv: mirror_tile(restored),
        slice_progress: progress,
    }
}

/// Shadow and highlight tints along a rib. A non-positive opacity leaves
/// the color untouched.
pub fn apply_overlay(color: Rgba, slice_progress: f32, opacity_percent: f32) -> Rgba {
    if opacity_percent <= 0.0 {
        return color;
    }
    let strength = opacity_percent / 100.0;
    let shadow = SHADOW_STRENGTH
        * (1.0 - (slice_progress * PI * SHADOW_FREQUENCY + SHADOW_PHASE).sin().abs())
        * strength;
    let highlight = HIGHLIGHT_STRENGTH
        * (1.0 - (slice_progress * PI * HIGHLIGHT_FREQUENCY + HIGHLIGHT_PHASE).sin().abs())
        * strength;

    let mut out = color;
    for channel in out.iter_mut().take(3) {
        let darkened = *channel * (1.0 - shadow);
        *channel = darkened * (1.0 - highlight) + highlight;
    }
    out
}

/// Full warp for one surface coordinate.
pub fn shade<S>(uv: [f32; 2], params: &WarpParams, sampler: &S) -> Rgba
where
    S: Sampler + ?Sized,
{
    let sample = map_uv(uv, params);
    let color = sampler.sample(sample.uv);
    apply_overlay(color, sample.slice_progress, params.overlay_opacity_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(segments: f32, rotation_degrees: f32, overlay: f32, motion: f32) -> WarpParams {
        WarpParams {
            canvas_aspect: 16.0 / 9.0,
            image_aspect: 4.0 / 3.0,
            rotation_radians: rotation_degrees.to_radians(),
            segments,
            motion,
            overlay_opacity_percent: overlay,
        }
    }

    fn gradient(uv: [f32; 2]) -> Rgba {
        [uv[0], uv[1], 0.25, 1.0]
    }

    #[test]
    fn centre_with_single_segment_samples_directly() {
        let params = params(1.0, 0.0, 0.0, 0.5);
        let sample = map_uv([0.5, 0.5], &params);
        assert_eq!(sample.slice_progress, 0.0);
        assert_eq!(sample.uv, [0.5, 0.5]);
        assert_eq!(shade([0.5, 0.5], &params, &gradient), gradient([0.5, 0.5]));
    }

    #[test]
    fn mirror_tile_always_lands_in_unit_square() {
        let values = [
            -1e6, -37.25, -3.5, -2.0, -1.0, -0.75, -1e-7, 0.0, 1e-7, 0.3, 0.999_999, 1.0, 1.25,
            2.0, 2.5, 3.75, 41.125, 1e6,
        ];
        for &x in &values {
            for &y in &values {
                let [u, v] = mirror_tile([x, y]);
                assert!((0.0..=1.0).contains(&u), "u={u} for x={x}");
                assert!((0.0..=1.0).contains(&v), "v={v} for y={y}");
            }
        }
    }

    #[test]
    fn mirror_tile_reflects_odd_tiles() {
        assert_eq!(mirror_tile([1.25, 0.25]), [0.75, 0.25]);
        assert_eq!(mirror_tile([-0.25, 2.25]), [0.25, 0.25]);
        assert_eq!(mirror_tile([-1.25, -2.75]), [0.75, 0.75]);
    }

    #[test]
    fn mapped_uv_is_contained_for_extreme_rotation() {
        let params = params(7.0, 73.0, 0.0, 12.5);
        for i in 0..=20 {
            for j in 0..=20 {
                let uv = [i as f32 / 20.0 * 3.0 - 1.0, j as f32 / 20.0 * 3.0 - 1.0];
                let sample = map_uv(uv, &params);
                assert!((0.0..=1.0).contains(&sample.uv[0]));
                assert!((0.0..=1.0).contains(&sample.uv[1]));
                assert!((0.0..=1.0).contains(&sample.slice_progress));
            }
        }
    }

    #[test]
    fn displacement_is_continuous_across_slice_boundaries() {
        let epsilon = 1e-4;
        assert!(flute_offset(0.0).abs() < 1e-6);
        assert!(flute_offset(1.0 - epsilon).abs() < 1e-3 * FLUTE_AMPLITUDE * 10.0);

        let params = params(10.0, 0.0, 0.0, 0.0);
        // Rotated u crosses a boundary at 0.3 (slice 3 of 10).
        let boundary = 0.3_f32;
        let progress_before = slice_progress(boundary - epsilon, params.segments, 0.0);
        let progress_after = slice_progress(boundary + epsilon, params.segments, 0.0);
        assert!(progress_before - progress_after > 0.9);

        let before = flute_offset(progress_before);
        let after = flute_offset(progress_after);
        assert!((before - after).abs() < 5e-4, "before={before} after={after}");
    }

    #[test]
    fn shading_is_idempotent() {
        let params = params(23.0, 31.0, 65.0, 0.8);
        for i in 0..16 {
            let uv = [i as f32 / 15.0, 1.0 - i as f32 / 15.0];
            let first = shade(uv, &params, &gradient);
            let second = shade(uv, &params, &gradient);
            assert_eq!(first.map(f32::to_bits), second.map(f32::to_bits));
        }
    }

    #[test]
    fn single_segment_never_produces_nan() {
        let params = params(1.0, 45.0, 100.0, 0.5);
        for i in 0..=32 {
            for j in 0..=32 {
                let color = shade([i as f32 / 32.0, j as f32 / 32.0], &params, &gradient);
                assert!(color.iter().all(|c| c.is_finite()));
            }
        }
    }

    #[test]
    fn zero_overlay_matches_skipped_overlay_bit_for_bit() {
        let params = params(50.0, 12.0, 0.0, 0.5);
        for i in 0..=10 {
            let uv = [i as f32 / 10.0, 0.42];
            let sample = map_uv(uv, &params);
            let raw = gradient(sample.uv);
            let shaded = shade(uv, &params, &gradient);
            assert_eq!(raw.map(f32::to_bits), shaded.map(f32::to_bits));
        }
    }

    #[test]
    fn overlay_stays_within_documented_bounds() {
        let grey = [0.5, 0.5, 0.5, 0.8];
        for i in 0..100 {
            let progress = i as f32 / 100.0;
            let tinted = apply_overlay(grey, progress, 100.0);
            for channel in &tinted[..3] {
                // darkest: 5% shadow and no highlight; brightest: 15% toward white.
                assert!(*channel >= 0.5 * 0.95 - 1e-6);
                assert!(*channel <= 0.5 + 0.5 * 0.15 + 1e-6);
            }
            assert_eq!(tinted[3], 0.8);
        }
    }

    #[test]
    fn wide_image_compresses_horizontal_axis() {
        let corrected = aspect_correct([1.0, 1.0], 1.0, 2.0);
        assert_eq!(corrected, [0.75, 1.0]);
        let corrected = aspect_correct([1.0, 1.0], 2.0, 1.0);
        assert_eq!(corrected, [1.0, 0.75]);
    }

    #[test]
    fn rotation_round_trips() {
        let uv = [0.2, 0.9];
        let there = rotate_about_center(uv, 1.1);
        let back = rotate_about_center(there, -1.1);
        assert!((back[0] - uv[0]).abs() < 1e-6);
        assert!((back[1] - uv[1]).abs() < 1e-6);
    }
}
