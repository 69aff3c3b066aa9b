use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Factor applied to the distance per zoom step.
pub const DISTANCE_SCALE_FACTOR: f64 = 1.1;

/// Starting distance from the origin.
pub const DEFAULT_DISTANCE: f64 = 8.0;

/// Angle added or removed per rotation step (5 degrees).
pub const ANGLE_STEP: f64 = 5.0 * std::f64::consts::PI / 180.0;

/// Camera on a sphere around the origin, always looking at the origin.
///
/// `angle_zy` swings the camera around the Y axis, `angle_zx` lifts it above
/// or below the XZ plane. Angles are unbounded; they only feed trig functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOrbitCamera")]
pub struct OrbitCamera {
    distance: f64,
    angle_zy: f64,
    angle_zx: f64,
}

#[derive(Deserialize)]
struct RawOrbitCamera {
    distance: f64,
    angle_zy: f64,
    angle_zx: f64,
}

impl From<RawOrbitCamera> for OrbitCamera {
    fn from(raw: RawOrbitCamera) -> Self {
        OrbitCamera::new(raw.distance, raw.angle_zy, raw.angle_zx)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE, 0.0, 0.0)
    }
}

impl OrbitCamera {
    /// Camera at `distance` from the origin. A distance that is not a positive
    /// finite number falls back to [`DEFAULT_DISTANCE`]; non-finite angles
    /// become zero.
    pub fn new(distance: f64, angle_zy: f64, angle_zx: f64) -> Self {
        let distance = if distance.is_finite() && distance > 0.0 {
            distance
        } else {
            tracing::warn!(distance, "invalid orbit distance, using default");
            DEFAULT_DISTANCE
        };
        let finite_or_zero = |angle: f64| if angle.is_finite() { angle } else { 0.0 };
        Self {
            distance,
            angle_zy: finite_or_zero(angle_zy),
            angle_zx: finite_or_zero(angle_zx),
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn angle_zy(&self) -> f64 {
        self.angle_zy
    }

    pub fn angle_zx(&self) -> f64 {
        self.angle_zx
    }

    // TODO: clamp distance once a minimum viewing distance is decided; repeated
    // zooming can currently approach zero or grow without bound.
    pub fn increase_distance(&mut self) {
        self.distance *= DISTANCE_SCALE_FACTOR;
    }

    pub fn decrease_distance(&mut self) {
        self.distance /= DISTANCE_SCALE_FACTOR;
    }

    pub fn increase_angle_zy(&mut self) {
        self.angle_zy += ANGLE_STEP;
    }

    pub fn decrease_angle_zy(&mut self) {
        self.angle_zy -= ANGLE_STEP;
    }

    pub fn increase_angle_zx(&mut self) {
        self.angle_zx += ANGLE_STEP;
    }

    pub fn decrease_angle_zx(&mut self) {
        self.angle_zx -= ANGLE_STEP;
    }

    pub fn position(&self) -> Vec3 {
        point_from_angles(self.distance, self.angle_zy, self.angle_zx).as_vec3()
    }

    /// Unit up vector: the position direction lifted by a further 90 degrees.
    pub fn up(&self) -> Vec3 {
        point_from_angles(self.distance, self.angle_zy, self.angle_zx + FRAC_PI_2)
            .normalize()
            .as_vec3()
    }

    pub fn target(&self) -> Vec3 {
        Vec3::ZERO
    }
}

fn point_from_angles(distance: f64, angle_zy: f64, angle_zx: f64) -> DVec3 {
    DVec3::new(
        distance * angle_zx.cos() * angle_zy.sin(),
        distance * angle_zx.sin(),
        distance * angle_zx.cos() * angle_zy.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cameras() -> Vec<OrbitCamera> {
        let mut out = Vec::new();
        for d in [0.5, 1.0, 8.0, 42.0] {
            for zy in [-3.0, -0.4, 0.0, 0.7, 2.5, 9.0] {
                for zx in [-1.5, -0.3, 0.0, 0.9, 1.4, 4.0] {
                    out.push(OrbitCamera::new(d, zy, zx));
                }
            }
        }
        out
    }

    #[test]
    fn invalid_distance_falls_back_to_default() {
        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let cam = OrbitCamera::new(bad, 0.3, f64::NAN);
            assert_eq!(cam.distance(), DEFAULT_DISTANCE);
            assert_eq!(cam.angle_zx(), 0.0);
            assert!(cam.position().is_finite());
            assert!((cam.position() - cam.target()).length() > 1.0);
        }
    }

    #[test]
    fn default_looks_down_positive_z() {
        let cam = OrbitCamera::default();
        assert!((cam.position() - Vec3::new(0.0, 0.0, 8.0)).length() < 1e-5);
        assert!((cam.up() - Vec3::Y).length() < 1e-5);
        assert_eq!(cam.target(), Vec3::ZERO);
    }

    #[test]
    fn position_lies_on_sphere() {
        for cam in sample_cameras() {
            let len = cam.position().length() as f64;
            assert!((len - cam.distance()).abs() < 1e-4 * cam.distance(), "{cam:?}");
        }
    }

    #[test]
    fn up_is_unit_and_perpendicular_to_view() {
        for cam in sample_cameras() {
            let up = cam.up();
            let view = (cam.target() - cam.position()).normalize();
            assert!((up.length() - 1.0).abs() < 1e-5);
            assert!(up.dot(view).abs() < 1e-4, "{cam:?}");
        }
    }

    #[test]
    fn distance_steps_scale_and_invert() {
        let mut cam = OrbitCamera::default();
        cam.increase_distance();
        assert!((cam.distance() - 8.8).abs() < 1e-9);
        cam.decrease_distance();
        assert!((cam.distance() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn angle_steps_are_five_degrees() {
        let mut cam = OrbitCamera::default();
        cam.increase_angle_zy();
        assert!((cam.angle_zy().to_degrees() - 5.0).abs() < 1e-9);
        cam.decrease_angle_zx();
        cam.decrease_angle_zx();
        assert!((cam.angle_zx().to_degrees() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn positive_zy_swings_toward_positive_x() {
        let mut cam = OrbitCamera::default();
        cam.increase_angle_zy();
        assert!(cam.position().x > 0.0);
        let mut cam = OrbitCamera::default();
        cam.increase_angle_zx();
        assert!(cam.position().y > 0.0);
    }

    #[test]
    fn angles_are_not_wrapped() {
        let mut cam = OrbitCamera::default();
        for _ in 0..100 {
            cam.increase_angle_zy();
        }
        assert!(cam.angle_zy() > std::f64::consts::TAU);
        assert!((cam.position().length() - 8.0).abs() < 1e-4);
    }
}
