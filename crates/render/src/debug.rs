use crate::backend::{
    MeshHandle, ProgramHandle, ProgramSource, RenderBackend, RenderError, ShaderStage,
};
use crate::mesh::Vertex;
use crate::view::RenderView;
use cubegrid_common::{Face, Rgba};
use cubegrid_kernel::{Cube, RotationPhase};
use glam::Mat4;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

/// Program source accepted by [`RecordingBackend`], declaring the three
/// matrices the cube scene sets.
pub const DEBUG_PROGRAM: ProgramSource<'static> = ProgramSource {
    vertex: "uniform mat4 uModel;\nuniform mat4 uView;\nuniform mat4 uProjection;\nvoid main() {}\n",
    fragment: "void main() {}\n",
};

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CompileAndLink(ProgramHandle),
    UploadMesh {
        mesh: MeshHandle,
        vertices: usize,
        indices: usize,
    },
    Clear(Rgba),
    UseProgram(ProgramHandle),
    SetUniform {
        program: ProgramHandle,
        name: String,
        matrix: Mat4,
    },
    Draw {
        mesh: MeshHandle,
        index_count: u32,
    },
}

/// Backend that draws nothing and records every call.
///
/// Uniform names are taken from `uniform <type> <name>;` declarations in the
/// vertex source, so unknown names fail the same way a real driver lookup does.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    programs: Vec<BTreeSet<String>>,
    mesh_index_counts: Vec<u32>,
    current: Option<ProgramHandle>,
    calls: Vec<BackendCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn mesh_count(&self) -> usize {
        self.mesh_index_counts.len()
    }

    /// Number of indexed draws recorded since the last `clear_calls`.
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Draw { .. }))
            .count()
    }

    fn uniforms(&self, program: ProgramHandle) -> Result<&BTreeSet<String>, RenderError> {
        self.programs
            .get(program.0 as usize)
            .ok_or(RenderError::UnknownProgram(program))
    }
}

fn declared_uniforms(source: &str) -> BTreeSet<String> {
    source
        .lines()
        .filter_map(|line| {
            let decl = line.trim().strip_prefix("uniform ")?.strip_suffix(';')?;
            decl.split_whitespace().last().map(str::to_owned)
        })
        .collect()
}

impl RenderBackend for RecordingBackend {
    fn compile_and_link(&mut self, source: &ProgramSource<'_>) -> Result<ProgramHandle, RenderError> {
        for (stage, text) in [
            (ShaderStage::Vertex, source.vertex),
            (ShaderStage::Fragment, source.fragment),
        ] {
            if text.trim().is_empty() {
                return Err(RenderError::ShaderCompile {
                    stage,
                    log: "empty shader source".into(),
                });
            }
        }
        let handle = ProgramHandle(self.programs.len() as u32);
        self.programs.push(declared_uniforms(source.vertex));
        self.calls.push(BackendCall::CompileAndLink(handle));
        Ok(handle)
    }

    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<MeshHandle, RenderError> {
        if let Some(&bad) = indices.iter().find(|&&i| usize::from(i) >= vertices.len()) {
            return Err(RenderError::Backend(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }
        let mesh = MeshHandle(self.mesh_index_counts.len() as u32);
        self.mesh_index_counts.push(indices.len() as u32);
        self.calls.push(BackendCall::UploadMesh {
            mesh,
            vertices: vertices.len(),
            indices: indices.len(),
        });
        Ok(mesh)
    }

    fn clear(&mut self, color: Rgba) -> Result<(), RenderError> {
        self.calls.push(BackendCall::Clear(color));
        Ok(())
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), RenderError> {
        self.uniforms(program)?;
        self.current = Some(program);
        self.calls.push(BackendCall::UseProgram(program));
        Ok(())
    }

    fn set_uniform_mat4(
        &mut self,
        program: ProgramHandle,
        name: &str,
        matrix: &Mat4,
    ) -> Result<(), RenderError> {
        if !self.uniforms(program)?.contains(name) {
            return Err(RenderError::UniformNotFound { name: name.into() });
        }
        self.calls.push(BackendCall::SetUniform {
            program,
            name: name.into(),
            matrix: *matrix,
        });
        Ok(())
    }

    fn bind_and_draw_indexed(&mut self, mesh: MeshHandle, index_count: u32) -> Result<(), RenderError> {
        if self.current.is_none() {
            return Err(RenderError::NoProgramBound);
        }
        let available = *self
            .mesh_index_counts
            .get(mesh.0 as usize)
            .ok_or(RenderError::UnknownMesh(mesh))?;
        if index_count > available {
            return Err(RenderError::IndexCountOutOfRange {
                requested: index_count,
                available,
            });
        }
        self.calls.push(BackendCall::Draw { mesh, index_count });
        Ok(())
    }
}

/// Renderer-agnostic interface over the cube state.
///
/// A renderer reads the cube and a view and produces output. It never
/// mutates the cube.
pub trait Renderer {
    type Output;

    fn render(&self, cube: &Cube, view: &RenderView) -> Self::Output;
}

/// Text renderer: cube state plus the six face sticker grids as letters.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

/// Single-letter name of a palette color.
pub fn color_letter(color: Rgba) -> char {
    const NAMED: [(Rgba, char); 8] = [
        (Rgba::BLACK, 'K'),
        (Rgba::WHITE, 'W'),
        (Rgba::RED, 'R'),
        (Rgba::GREEN, 'G'),
        (Rgba::BLUE, 'B'),
        (Rgba::MAGENTA, 'M'),
        (Rgba::CYAN, 'C'),
        (Rgba::YELLOW, 'Y'),
    ];
    NAMED
        .iter()
        .find(|(c, _)| *c == color)
        .map_or('?', |&(_, letter)| letter)
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, cube: &Cube, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Cube State (tick={}, turns={}, solved={}) ===",
            cube.tick(),
            cube.turns_completed(),
            cube.is_solved()
        );
        let rotation = cube.rotation();
        match rotation.phase() {
            RotationPhase::Idle => out.push_str("Rotation: idle\n"),
            RotationPhase::Rotating => {
                let _ = writeln!(
                    out,
                    "Rotation: {:?} {:.1}/{:.1} deg",
                    rotation.direction(),
                    rotation.current_angle().to_degrees(),
                    rotation.target_angle().to_degrees()
                );
            }
        }
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) up=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.up.x,
            view.up.y,
            view.up.z,
            view.projection.fov_degrees
        );

        for face in Face::ALL {
            let _ = writeln!(out, "{face:?}:");
            for row in cube.grid().face_stickers(face) {
                let letters: Vec<String> = row.iter().map(|&c| color_letter(c).to_string()).collect();
                let _ = writeln!(out, "  {}", letters.join(" "));
            }
        }
        out
    }
}

/// Frequency of each call kind in a recording, for summaries.
pub fn call_histogram(calls: &[BackendCall]) -> HashMap<&'static str, usize> {
    let mut counts = HashMap::new();
    for call in calls {
        let kind = match call {
            BackendCall::CompileAndLink(_) => "compile_and_link",
            BackendCall::UploadMesh { .. } => "upload_mesh",
            BackendCall::Clear(_) => "clear",
            BackendCall::UseProgram(_) => "use_program",
            BackendCall::SetUniform { .. } => "set_uniform_mat4",
            BackendCall::Draw { .. } => "bind_and_draw_indexed",
        };
        *counts.entry(kind).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cube_mesh;
    use cubegrid_common::{FaceColors, TurnDirection};

    #[test]
    fn parses_declared_uniforms() {
        let names = declared_uniforms(DEBUG_PROGRAM.vertex);
        let expected: Vec<&str> = vec!["uModel", "uProjection", "uView"];
        assert_eq!(names.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn empty_shader_fails_to_compile() {
        let mut backend = RecordingBackend::new();
        let err = backend
            .compile_and_link(&ProgramSource {
                vertex: DEBUG_PROGRAM.vertex,
                fragment: "  ",
            })
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }

    #[test]
    fn unknown_uniform_is_an_error() {
        let mut backend = RecordingBackend::new();
        let program = backend.compile_and_link(&DEBUG_PROGRAM).unwrap();
        let err = backend
            .set_uniform_mat4(program, "uMissing", &Mat4::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, RenderError::UniformNotFound { name } if name == "uMissing"));
    }

    #[test]
    fn draw_requires_program_and_known_mesh() {
        let mut backend = RecordingBackend::new();
        let (v, i) = cube_mesh(&FaceColors::default());
        let mesh = backend.upload_mesh(&v, &i).unwrap();
        assert!(matches!(
            backend.bind_and_draw_indexed(mesh, 36),
            Err(RenderError::NoProgramBound)
        ));

        let program = backend.compile_and_link(&DEBUG_PROGRAM).unwrap();
        backend.use_program(program).unwrap();
        backend.bind_and_draw_indexed(mesh, 36).unwrap();
        assert!(matches!(
            backend.bind_and_draw_indexed(MeshHandle(9), 36),
            Err(RenderError::UnknownMesh(_))
        ));
        assert!(matches!(
            backend.bind_and_draw_indexed(mesh, 37),
            Err(RenderError::IndexCountOutOfRange { .. })
        ));
        assert_eq!(backend.draw_count(), 1);
    }

    #[test]
    fn upload_rejects_out_of_range_indices() {
        let mut backend = RecordingBackend::new();
        let (v, _) = cube_mesh(&FaceColors::default());
        assert!(backend.upload_mesh(&v, &[0, 1, 24]).is_err());
    }

    #[test]
    fn text_renderer_shows_solved_faces() {
        let cube = Cube::new();
        let out = DebugTextRenderer::new().render(&cube, &RenderView::default());
        assert!(out.contains("tick=0"));
        assert!(out.contains("solved=true"));
        assert!(out.contains("Rotation: idle"));
        assert!(out.contains("Front:\n  R R R\n  R R R\n  R R R\n"));
        assert!(out.contains("Up:\n  G G G\n"));
    }

    #[test]
    fn text_renderer_after_turn() {
        let mut cube = Cube::new();
        cube.rotate_front(TurnDirection::Clockwise);
        cube.step();
        let out = DebugTextRenderer::new().render(&cube, &RenderView::default());
        assert!(out.contains("Rotation: Clockwise"));

        cube.settle();
        let out = DebugTextRenderer::new().render(&cube, &RenderView::default());
        assert!(out.contains("solved=false"));
        // Front face still shows red after turning it.
        assert!(out.contains("Front:\n  R R R\n  R R R\n  R R R\n"));
    }

    #[test]
    fn unknown_colors_print_as_question_mark() {
        assert_eq!(color_letter(Rgba([0.5, 0.5, 0.5, 1.0])), '?');
        assert_eq!(color_letter(Rgba::YELLOW), 'Y');
    }

    #[test]
    fn histogram_counts_kinds() {
        let calls = vec![
            BackendCall::Clear(Rgba::WHITE),
            BackendCall::Draw {
                mesh: MeshHandle(0),
                index_count: 36,
            },
            BackendCall::Draw {
                mesh: MeshHandle(1),
                index_count: 36,
            },
        ];
        let h = call_histogram(&calls);
        assert_eq!(h["clear"], 1);
        assert_eq!(h["bind_and_draw_indexed"], 2);
    }
}
