use crate::camera::Camera;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 1024.0 / 768.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    /// Default projection with the aspect ratio of a `width` x `height` surface.
    pub fn for_size(width: u32, height: u32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }
}

/// Camera/view configuration for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 8.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::default(),
        }
    }
}

impl RenderView {
    /// Snapshot the current camera state.
    pub fn from_camera(camera: &dyn Camera, projection: Projection) -> Self {
        Self {
            eye: camera.position(),
            target: camera.target(),
            up: camera.up(),
            projection,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::OrbitCamera;
    use glam::Vec4Swizzles;

    #[test]
    fn default_projection_values() {
        let p = Projection::default();
        assert_eq!(p.fov_degrees, 45.0);
        assert_eq!(p.near, 0.1);
        assert_eq!(p.far, 100.0);
        assert!((p.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn for_size_guards_zero_height() {
        let p = Projection::for_size(800, 0);
        assert!(p.aspect.is_finite());
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let view = RenderView::default();
        let eye_in_view = view.view_matrix() * view.eye.extend(1.0);
        assert!(eye_in_view.xyz().length() < 1e-5);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let mut cam = OrbitCamera::default();
        cam.increase_angle_zy();
        cam.increase_angle_zx();
        let view = RenderView::from_camera(&cam, Projection::default());
        let clip = view.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn view_projection_has_no_nan() {
        let vp = RenderView::default().view_projection();
        assert!(!vp.is_nan());
    }
}
