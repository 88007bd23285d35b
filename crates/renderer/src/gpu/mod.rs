//! Offscreen wgpu backend.
//!
//! - `context` owns the headless instance, adapter, device and queue.
//! - `source` uploads the decoded image as a sampled texture.
//! - `pipeline` compiles the GLSL pair into a single render pipeline with a
//!   uniform bind group and a texture bind group.
//! - `uniforms` mirrors the `FlutedParams` block in the fragment shader.
//! - `state` draws one frame into a render target and reads it back.

mod context;
mod pipeline;
mod source;
mod state;
mod uniforms;

pub use state::GpuRenderer;
