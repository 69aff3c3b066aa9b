//! Renderer-agnostic cube scene: cameras, view/projection, the backend
//! trait and per-frame draw sequencing.
//!
//! # Invariants
//! - Renderers never mutate cube state; render state derives from the cube
//!   and a view.
//! - A frame sets view and projection once, then one model matrix and one
//!   indexed draw per sub-cube.
//!
//! GPU backends implement [`RenderBackend`]. [`RecordingBackend`] and
//! [`DebugTextRenderer`] run headless for the CLI and tests.

pub mod backend;
pub mod camera;
pub mod debug;
pub mod free;
pub mod mesh;
pub mod orbit;
pub mod scene;
pub mod view;

pub use backend::{
    MeshHandle, ProgramHandle, ProgramSource, RenderBackend, RenderError, ShaderStage,
};
pub use camera::{ActiveCamera, Camera};
pub use debug::{
    BackendCall, DEBUG_PROGRAM, DebugTextRenderer, RecordingBackend, Renderer, call_histogram,
    color_letter,
};
pub use free::{CameraError, FreeCamera};
pub use mesh::{CUBE_INDEX_COUNT, Vertex, cube_mesh};
pub use orbit::OrbitCamera;
pub use scene::{
    CELL_SPACING, CLEAR_COLOR, CubeScene, MODEL_UNIFORM, PROJECTION_UNIFORM, VIEW_UNIFORM,
    sub_cube_model,
};
pub use view::{Projection, RenderView};
