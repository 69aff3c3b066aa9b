use crate::backend::{MeshHandle, ProgramHandle, ProgramSource, RenderBackend, RenderError};
use crate::mesh::{CUBE_INDEX_COUNT, cube_mesh};
use crate::view::RenderView;
use cubegrid_common::Rgba;
use cubegrid_kernel::{Cube, CubeGrid, SubCube};
use glam::Mat4;

/// Distance between neighbouring sub-cube centers; leaves a visible gap.
pub const CELL_SPACING: f32 = 1.1;

pub const MODEL_UNIFORM: &str = "uModel";
pub const VIEW_UNIFORM: &str = "uView";
pub const PROJECTION_UNIFORM: &str = "uProjection";

pub const CLEAR_COLOR: Rgba = Rgba::WHITE;

/// Model matrix of one sub-cube: resting orientation, then grid translation,
/// then the in-flight layer rotation about +Z.
pub fn sub_cube_model(cube: &SubCube, layer_angle: f32) -> Mat4 {
    Mat4::from_rotation_z(layer_angle)
        * Mat4::from_translation(cube.position().centered() * CELL_SPACING)
        * Mat4::from_rotation_z(cube.orientation_angle())
}

/// GPU-side resources for drawing the cube: one program and one mesh per
/// sub-cube, in grid storage order.
#[derive(Debug)]
pub struct CubeScene {
    program: ProgramHandle,
    meshes: Vec<MeshHandle>,
}

impl CubeScene {
    pub fn new(
        backend: &mut dyn RenderBackend,
        source: &ProgramSource<'_>,
        grid: &CubeGrid,
    ) -> Result<Self, RenderError> {
        let program = backend.compile_and_link(source)?;
        let meshes = grid
            .cubes()
            .iter()
            .map(|cube| {
                let (vertices, indices) = cube_mesh(cube.colors());
                backend.upload_mesh(&vertices, &indices)
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(program = program.0, meshes = meshes.len(), "cube scene ready");
        Ok(Self { program, meshes })
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Record one frame: clear, set view and projection once, then one model
    /// matrix and one indexed draw per sub-cube.
    pub fn draw(
        &self,
        backend: &mut dyn RenderBackend,
        view: &RenderView,
        cube: &Cube,
    ) -> Result<(), RenderError> {
        backend.clear(CLEAR_COLOR)?;
        backend.use_program(self.program)?;
        backend.set_uniform_mat4(self.program, VIEW_UNIFORM, &view.view_matrix())?;
        backend.set_uniform_mat4(self.program, PROJECTION_UNIFORM, &view.projection_matrix())?;

        for (sub, mesh) in cube.grid().cubes().iter().zip(&self.meshes) {
            let model = sub_cube_model(sub, cube.layer_angle(sub));
            backend.set_uniform_mat4(self.program, MODEL_UNIFORM, &model)?;
            backend.bind_and_draw_indexed(*mesh, CUBE_INDEX_COUNT)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::{BackendCall, RecordingBackend, DEBUG_PROGRAM};
    use cubegrid_common::{GridPos, TurnDirection};
    use glam::Vec3;

    fn model_origin(m: Mat4) -> Vec3 {
        m.transform_point3(Vec3::ZERO)
    }

    #[test]
    fn new_uploads_one_mesh_per_sub_cube() {
        let mut backend = RecordingBackend::new();
        let cube = Cube::new();
        let scene = CubeScene::new(&mut backend, &DEBUG_PROGRAM, cube.grid()).unwrap();
        assert_eq!(scene.mesh_count(), 27);
        assert_eq!(backend.mesh_count(), 27);
    }

    #[test]
    fn draw_sequence_matches_frame_layout() {
        let mut backend = RecordingBackend::new();
        let cube = Cube::new();
        let scene = CubeScene::new(&mut backend, &DEBUG_PROGRAM, cube.grid()).unwrap();
        backend.clear_calls();
        scene
            .draw(&mut backend, &RenderView::default(), &cube)
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 4 + 27 * 2);
        assert_eq!(calls[0], BackendCall::Clear(CLEAR_COLOR));
        assert_eq!(calls[1], BackendCall::UseProgram(scene.program()));
        assert!(matches!(&calls[2], BackendCall::SetUniform { name, .. } if name == VIEW_UNIFORM));
        assert!(
            matches!(&calls[3], BackendCall::SetUniform { name, .. } if name == PROJECTION_UNIFORM)
        );
        for pair in calls[4..].chunks(2) {
            assert!(
                matches!(&pair[0], BackendCall::SetUniform { name, .. } if name == MODEL_UNIFORM)
            );
            assert!(matches!(
                pair[1],
                BackendCall::Draw {
                    index_count: CUBE_INDEX_COUNT,
                    ..
                }
            ));
        }
    }

    #[test]
    fn idle_cube_models_are_pure_translations() {
        let cube = Cube::new();
        for sub in cube.grid().cubes() {
            let m = sub_cube_model(sub, cube.layer_angle(sub));
            let expected = sub.position().centered() * CELL_SPACING;
            assert!((model_origin(m) - expected).length() < 1e-5);
            assert!((m.transform_vector3(Vec3::X) - Vec3::X).length() < 1e-5);
        }
    }

    #[test]
    fn mid_turn_rotates_only_front_layer() {
        let mut cube = Cube::new();
        cube.rotate_front(TurnDirection::Clockwise);
        for _ in 0..10 {
            cube.step();
        }
        let angle = cube.rotation().current_angle();
        assert!(angle < 0.0);

        for sub in cube.grid().cubes() {
            let m = sub_cube_model(sub, cube.layer_angle(sub));
            let rest = sub.position().centered() * CELL_SPACING;
            if sub.in_front_layer() {
                let expected = Mat4::from_rotation_z(angle).transform_point3(rest);
                assert!((model_origin(m) - expected).length() < 1e-5);
            } else {
                assert!((model_origin(m) - rest).length() < 1e-5);
            }
        }
    }

    #[test]
    fn completed_turn_keeps_stickers_on_the_same_world_faces() {
        let mut cube = Cube::new();
        let corner = GridPos::new(0, 2, 2).unwrap();
        let up_color = cube.grid().at(corner).unwrap().colors().up;

        cube.rotate_front(TurnDirection::Clockwise);
        cube.settle();

        // The old top-left corner now sits top-right with its up sticker facing +X.
        let moved = cube.grid().at(GridPos::new(2, 2, 2).unwrap()).unwrap();
        assert_eq!(moved.home(), corner);
        let m = sub_cube_model(moved, cube.layer_angle(moved));
        assert!((m.transform_vector3(Vec3::Y) - Vec3::X).length() < 1e-5);
        assert_eq!(moved.sticker(cubegrid_common::Face::Right), up_color);
    }

    #[test]
    fn draw_propagates_backend_errors() {
        let mut backend = RecordingBackend::new();
        let cube = Cube::new();
        let scene = CubeScene::new(&mut backend, &DEBUG_PROGRAM, cube.grid()).unwrap();
        let mut other = RecordingBackend::new();
        let err = scene
            .draw(&mut other, &RenderView::default(), &cube)
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownProgram(_)));
    }
}
