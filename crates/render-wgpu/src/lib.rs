//! wgpu render backend for the cube demo.
//!
//! Implements [`cubegrid_render::RenderBackend`] on top of a wgpu device and
//! ships the WGSL program for flat-colored sub-cubes.
//!
//! # Invariants
//! - The backend never touches cube state; it only replays recorded draws.
//! - One frame is one render pass, submitted by [`WgpuBackend::render_to`].

mod gpu;
mod shaders;

pub use gpu::{MAX_DRAWS_PER_FRAME, WgpuBackend};
pub use shaders::{CUBE_FRAGMENT_SHADER, CUBE_PROGRAM, CUBE_VERTEX_SHADER};
