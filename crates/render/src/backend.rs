use crate::mesh::Vertex;
use cubegrid_common::Rgba;
use glam::Mat4;
use std::fmt;

/// Handle to a compiled and linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Handle to an uploaded vertex array with its index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Vertex and fragment shader sources for one program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors reported by a render backend. All of them are fatal for the demo.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("program failed to link: {0}")]
    ProgramLink(String),
    #[error("{name} uniform not found on shader")]
    UniformNotFound { name: String },
    #[error("unknown program {0:?}")]
    UnknownProgram(ProgramHandle),
    #[error("unknown mesh {0:?}")]
    UnknownMesh(MeshHandle),
    #[error("draw issued with no program in use")]
    NoProgramBound,
    #[error("mesh has {available} indices, draw asked for {requested}")]
    IndexCountOutOfRange { requested: u32, available: u32 },
    #[error("backend error: {0}")]
    Backend(String),
}

/// The minimal rendering surface the cube scene needs.
///
/// Calls between `clear` and the backend's own frame submission make up one
/// frame. Every method reports failures instead of panicking.
pub trait RenderBackend {
    fn compile_and_link(&mut self, source: &ProgramSource<'_>) -> Result<ProgramHandle, RenderError>;

    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u16])
    -> Result<MeshHandle, RenderError>;

    /// Start a frame, clearing color and depth.
    fn clear(&mut self, color: Rgba) -> Result<(), RenderError>;

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), RenderError>;

    /// Set a 4x4 matrix uniform by name. Unknown names are an error.
    fn set_uniform_mat4(
        &mut self,
        program: ProgramHandle,
        name: &str,
        matrix: &Mat4,
    ) -> Result<(), RenderError>;

    /// Draw `index_count` indices of `mesh` with the current program and uniforms.
    fn bind_and_draw_indexed(&mut self, mesh: MeshHandle, index_count: u32)
    -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_error_names_the_uniform() {
        let err = RenderError::UniformNotFound {
            name: "uModel".into(),
        };
        assert_eq!(err.to_string(), "uModel uniform not found on shader");
    }

    #[test]
    fn compile_error_names_the_stage() {
        let err = RenderError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "bad token".into(),
        };
        assert!(err.to_string().starts_with("fragment shader"));
    }
}
