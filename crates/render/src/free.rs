use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Distance moved per movement step.
pub const MOVE_STEP: f32 = 0.2;

/// Angle turned per rotation step (5 degrees).
pub const ROTATION_STEP: f32 = 5.0 * std::f32::consts::PI / 180.0;

/// Closest the view direction may get to `up` or `-up` (cosine of ~1 degree).
const MAX_UP_ALIGNMENT: f32 = 0.999_85;

/// Errors from building a free camera.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("camera position and target coincide")]
    ZeroDirection,
    #[error("up vector is zero or parallel to the view direction")]
    DegenerateUp,
}

/// Free-fly camera with explicit position, target and up.
///
/// Movement translates position and target together. Turning rotates the
/// target offset around the position, keeping its length.
///
/// # Invariants
/// - `up` is unit length and never parallel to `target - position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreeCamera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    speed: f32,
    rotation_step: f32,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 8.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            speed: MOVE_STEP,
            rotation_step: ROTATION_STEP,
        }
    }
}

impl FreeCamera {
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Result<Self, CameraError> {
        let offset = target - position;
        if offset.length_squared() < f32::EPSILON {
            return Err(CameraError::ZeroDirection);
        }
        let up = up.try_normalize().ok_or(CameraError::DegenerateUp)?;
        if offset.normalize().dot(up).abs() > MAX_UP_ALIGNMENT {
            return Err(CameraError::DegenerateUp);
        }
        Ok(Self {
            position,
            target,
            up,
            ..Self::default()
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit view direction.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Unit vector `up × direction`. For a right-handed frame this points to
    /// the camera's left.
    pub fn cross_direction(&self, direction: Vec3) -> Vec3 {
        self.up.cross(direction).normalize()
    }

    pub fn move_forward(&mut self) {
        self.translate(self.direction() * self.speed);
    }

    pub fn move_backward(&mut self) {
        self.translate(-self.direction() * self.speed);
    }

    pub fn move_left(&mut self) {
        let left = self.cross_direction(self.direction());
        self.translate(left * self.speed);
    }

    pub fn move_right(&mut self) {
        let left = self.cross_direction(self.direction());
        self.translate(-left * self.speed);
    }

    pub fn move_up(&mut self) {
        self.translate(self.up * self.speed);
    }

    pub fn move_down(&mut self) {
        self.translate(-self.up * self.speed);
    }

    pub fn turn_left(&mut self) {
        self.rotate_view(self.up, self.rotation_step);
    }

    pub fn turn_right(&mut self) {
        self.rotate_view(self.up, -self.rotation_step);
    }

    /// Tilt the view up. Returns `false` if the step would align the view with `up`.
    pub fn look_up(&mut self) -> bool {
        let axis = self.cross_direction(self.direction());
        self.pitch(axis, -self.rotation_step)
    }

    /// Tilt the view down. Returns `false` if the step would align the view with `-up`.
    pub fn look_down(&mut self) -> bool {
        let axis = self.cross_direction(self.direction());
        self.pitch(axis, self.rotation_step)
    }

    fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.target += delta;
    }

    fn rotated_offset(&self, axis: Vec3, angle: f32) -> Vec3 {
        Quat::from_axis_angle(axis, angle) * (self.target - self.position)
    }

    fn rotate_view(&mut self, axis: Vec3, angle: f32) {
        self.target = self.position + self.rotated_offset(axis, angle);
    }

    fn pitch(&mut self, axis: Vec3, angle: f32) -> bool {
        let offset = self.rotated_offset(axis, angle);
        if offset.normalize().dot(self.up).abs() > MAX_UP_ALIGNMENT {
            tracing::debug!("look step refused, view would align with up");
            return false;
        }
        self.target = self.position + offset;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn default_faces_origin() {
        let cam = FreeCamera::default();
        assert!(close(cam.direction(), Vec3::NEG_Z));
        assert!(close(cam.cross_direction(cam.direction()), Vec3::NEG_X));
    }

    #[test]
    fn new_rejects_degenerate_frames() {
        assert_eq!(
            FreeCamera::new(Vec3::ONE, Vec3::ONE, Vec3::Y),
            Err(CameraError::ZeroDirection)
        );
        assert_eq!(
            FreeCamera::new(Vec3::ZERO, Vec3::Y, Vec3::Y),
            Err(CameraError::DegenerateUp)
        );
        assert_eq!(
            FreeCamera::new(Vec3::ZERO, Vec3::Z, Vec3::ZERO),
            Err(CameraError::DegenerateUp)
        );
        assert!(FreeCamera::new(Vec3::ZERO, Vec3::Z, Vec3::Y * 3.0).is_ok());
    }

    #[test]
    fn forward_then_backward_round_trips() {
        let mut cam = FreeCamera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-2.0, 0.5, 0.0), Vec3::Y)
            .unwrap();
        let (p, t) = (cam.position(), cam.target());
        cam.move_forward();
        assert!(!close(cam.position(), p));
        cam.move_backward();
        assert!(close(cam.position(), p));
        assert!(close(cam.target(), t));
    }

    #[test]
    fn forward_moves_by_speed_along_direction() {
        let mut cam = FreeCamera::default();
        cam.move_forward();
        assert!(close(cam.position(), Vec3::new(0.0, 0.0, 8.0 - MOVE_STEP)));
        assert!(close(cam.target(), Vec3::new(0.0, 0.0, -MOVE_STEP)));
    }

    #[test]
    fn strafing_keeps_direction() {
        let mut cam = FreeCamera::default();
        let dir = cam.direction();
        cam.move_left();
        assert!(cam.position().x < 0.0);
        assert!(close(cam.direction(), dir));
        cam.move_right();
        cam.move_right();
        assert!(cam.position().x > 0.0);
        cam.move_up();
        assert!((cam.position().y - MOVE_STEP).abs() < 1e-5);
        assert!((cam.position().z - 8.0).abs() < 1e-5);
        cam.move_down();
        assert!(close(cam.direction(), dir));
    }

    #[test]
    fn turn_left_then_right_restores_target() {
        let mut cam = FreeCamera::default();
        let t = cam.target();
        cam.turn_left();
        assert!(!close(cam.target(), t));
        cam.turn_right();
        assert!(close(cam.target(), t));
    }

    #[test]
    fn turn_left_swings_toward_left_axis() {
        let mut cam = FreeCamera::default();
        let left = cam.cross_direction(cam.direction());
        cam.turn_left();
        assert!(cam.direction().dot(left) > 0.0);
        assert!((cam.direction().angle_between(Vec3::NEG_Z) - ROTATION_STEP).abs() < 1e-4);
    }

    #[test]
    fn turning_keeps_position_and_target_distance() {
        let mut cam = FreeCamera::default();
        let p = cam.position();
        let dist = (cam.target() - p).length();
        for _ in 0..10 {
            cam.turn_right();
        }
        assert_eq!(cam.position(), p);
        assert!(((cam.target() - p).length() - dist).abs() < 1e-3);
    }

    #[test]
    fn look_up_raises_view() {
        let mut cam = FreeCamera::default();
        assert!(cam.look_up());
        assert!(cam.direction().y > 0.0);
        assert!(cam.look_down());
        assert!(close(cam.direction(), Vec3::NEG_Z));
        assert!(cam.look_down());
        assert!(cam.direction().y < 0.0);
    }

    #[test]
    fn looking_up_stops_short_of_up_vector() {
        let mut cam = FreeCamera::default();
        let mut refused = false;
        for _ in 0..40 {
            if !cam.look_up() {
                refused = true;
                break;
            }
        }
        assert!(refused);
        assert!(cam.direction().dot(cam.up()) < 1.0);
        // Right axis is still well defined.
        assert!(cam.cross_direction(cam.direction()).is_finite());
    }

    #[test]
    fn looking_down_stops_short_of_down_vector() {
        let mut cam = FreeCamera::default();
        let mut refused = false;
        for _ in 0..40 {
            if !cam.look_down() {
                refused = true;
                break;
            }
        }
        assert!(refused);
        let dot = cam.direction().dot(cam.up());
        assert!(dot < -0.99 && dot > -1.0, "{dot}");
        assert!(cam.cross_direction(cam.direction()).is_finite());
        // Looking back up is still allowed.
        assert!(cam.look_up());
    }
}
