use bytemuck::{Pod, Zeroable};

use crate::warp::WarpParams;

/// Host-side copy of the `FlutedParams` std140 block. Eight scalars pack
/// into two vec4 slots, so no interior padding is needed.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FlutedUniforms {
    pub canvas_aspect: f32,
    pub image_aspect: f32,
    pub motion_value: f32,
    pub rotation_radians: f32,
    pub segments: f32,
    pub overlay_opacity: f32,
    pub padding0: f32,
    pub padding1: f32,
}

impl FlutedUniforms {
    pub fn from_params(params: &WarpParams) -> Self {
        Self {
            canvas_aspect: params.canvas_aspect,
            image_aspect: params.image_aspect,
            motion_value: params.motion,
            rotation_radians: params.rotation_radians,
            segments: params.segments,
            overlay_opacity: params.overlay_opacity_percent,
            padding0: 0.0,
            padding1: 0.0,
        }
    }
}
