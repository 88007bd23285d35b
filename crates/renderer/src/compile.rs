use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the fluted glass fragment shader.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fluted glass fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Fragment twin of [`crate::warp::shade`].
///
/// The uniform block layout must match `FlutedUniforms` in `gpu/uniforms.rs`.
pub(crate) const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FlutedParams {
    float canvasAspect;
    float imageAspect;
    float motionValue;
    float rotationRadians;
    float segments;
    float overlayOpacity;
    float padding0;
    float padding1;
} params;

layout(set = 1, binding = 0) uniform texture2D source_texture;
layout(set = 1, binding = 1) uniform sampler source_sampler;

const float PI = 3.14159265;
const float AMPLITUDE = 0.015;

vec2 rotate_about_center(vec2 uv, float angle) {
    vec2 centered = uv - vec2(0.5);
    float c = cos(angle);
    float s = sin(angle);
    return vec2(c * centered.x - s * centered.y, s * centered.x + c * centered.y) + vec2(0.5);
}

void main() {
    float canvasAspect = params.canvasAspect;
    float angle = params.rotationRadians;

    vec2 scale = vec2(1.0, params.imageAspect / canvasAspect);
    if (params.imageAspect > canvasAspect) {
        scale = vec2(canvasAspect / params.imageAspect, 1.0);
    }
    vec2 corrected = (v_uv - vec2(0.5)) * scale + vec2(0.5);

    vec2 rotated = rotate_about_center(corrected, angle);
    float slice = fract(rotated.x * params.segments + params.motionValue);
    float displacedU = rotated.x
        + AMPLITUDE * sin(slice * PI * 2.0) * (1.0 - 0.5 * abs(slice - 0.5));
    vec2 restored = rotate_about_center(vec2(displacedU, rotated.y), -angle);

    vec2 odd = mod(floor(restored), vec2(2.0));
    vec2 local = fract(restored);
    vec2 tiled = mix(local, vec2(1.0) - local, odd);
    vec4 color = texture(sampler2D(source_texture, source_sampler), tiled);

    vec3 rgb = color.rgb;
    if (params.overlayOpacity > 0.0) {
        float strength = params.overlayOpacity / 100.0;
        float shadow = 0.05 * (1.0 - abs(sin(slice * PI * 0.5 + 1.57))) * strength;
        rgb = rgb * (1.0 - shadow);
        float highlight = 0.15 * (1.0 - abs(sin(slice * PI * 0.7 - 0.7))) * strength;
        rgb = mix(rgb, vec3(1.0), highlight);
    }
    outColor = vec4(rgb, color.a);
}
";

/// Minimal full-screen triangle vertex shader.
pub(crate) const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
