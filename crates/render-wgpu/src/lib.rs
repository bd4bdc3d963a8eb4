//! wgpu render backend for the waterscape demo.
//!
//! Draws the environment skybox, then the water plane, each frame from a
//! [`waterscape_render::FrameView`].
//!
//! # Invariants
//! - Renderer never mutates camera state.
//! - Every GPU resource is owned by [`GpuContext`] or [`WaterRenderer`] and
//!   released when they drop.
//! - A pass whose shader failed to build draws nothing; the frame still
//!   presents.

mod context;
mod gpu;
mod program;
mod scene;
mod shaders;
mod textures;

pub use context::{GpuContext, GpuInitError};
pub use gpu::WaterRenderer;
pub use program::ShaderProgram;
pub use scene::SceneAssets;
pub use textures::GpuTexture;
