//! Rendering core shared by every backend.
//!
//! Owns the fly camera, the frame clock and the per-frame view data a backend
//! needs to draw the skybox and water passes. The water shading function is
//! mirrored here on the CPU so its behaviour can be checked without a GPU.
//!
//! # Invariants
//! - Camera basis vectors are always derived from yaw/pitch, never stored.
//! - Nothing in a frame's rendering feeds back into camera state.

mod camera;
mod frame;
pub mod shading;

pub use camera::Camera;
pub use frame::{FrameClock, FrameTime, FrameView, skybox_view, water_model_matrix};
