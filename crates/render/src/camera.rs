use crate::free::FreeCamera;
use crate::orbit::OrbitCamera;
use cubegrid_input::{CameraAction, CameraScheme};
use glam::Vec3;

/// Shared view capability of every camera model.
pub trait Camera {
    fn position(&self) -> Vec3;
    fn target(&self) -> Vec3;
    fn up(&self) -> Vec3;

    /// Apply one discrete control step. Returns `false` when the action does
    /// not belong to this camera model or was refused.
    fn apply(&mut self, action: CameraAction) -> bool;
}

impl Camera for OrbitCamera {
    fn position(&self) -> Vec3 {
        OrbitCamera::position(self)
    }

    fn target(&self) -> Vec3 {
        OrbitCamera::target(self)
    }

    fn up(&self) -> Vec3 {
        OrbitCamera::up(self)
    }

    fn apply(&mut self, action: CameraAction) -> bool {
        match action {
            CameraAction::IncreaseDistance => self.increase_distance(),
            CameraAction::DecreaseDistance => self.decrease_distance(),
            CameraAction::IncreaseAngleZY => self.increase_angle_zy(),
            CameraAction::DecreaseAngleZY => self.decrease_angle_zy(),
            CameraAction::IncreaseAngleZX => self.increase_angle_zx(),
            CameraAction::DecreaseAngleZX => self.decrease_angle_zx(),
            _ => return false,
        }
        true
    }
}

impl Camera for FreeCamera {
    fn position(&self) -> Vec3 {
        FreeCamera::position(self)
    }

    fn target(&self) -> Vec3 {
        FreeCamera::target(self)
    }

    fn up(&self) -> Vec3 {
        FreeCamera::up(self)
    }

    fn apply(&mut self, action: CameraAction) -> bool {
        match action {
            CameraAction::MoveForward => self.move_forward(),
            CameraAction::MoveBackward => self.move_backward(),
            CameraAction::MoveLeft => self.move_left(),
            CameraAction::MoveRight => self.move_right(),
            CameraAction::MoveUp => self.move_up(),
            CameraAction::MoveDown => self.move_down(),
            CameraAction::TurnLeft => self.turn_left(),
            CameraAction::TurnRight => self.turn_right(),
            CameraAction::LookUp => return self.look_up(),
            CameraAction::LookDown => return self.look_down(),
            _ => return false,
        }
        true
    }
}

/// The camera model chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveCamera {
    Orbit(OrbitCamera),
    Free(FreeCamera),
}

impl ActiveCamera {
    /// Default camera for `scheme`.
    pub fn new(scheme: CameraScheme) -> Self {
        match scheme {
            CameraScheme::Orbit => ActiveCamera::Orbit(OrbitCamera::default()),
            CameraScheme::Free => ActiveCamera::Free(FreeCamera::default()),
        }
    }

    pub fn scheme(&self) -> CameraScheme {
        match self {
            ActiveCamera::Orbit(_) => CameraScheme::Orbit,
            ActiveCamera::Free(_) => CameraScheme::Free,
        }
    }

    fn inner(&self) -> &dyn Camera {
        match self {
            ActiveCamera::Orbit(c) => c,
            ActiveCamera::Free(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Camera {
        match self {
            ActiveCamera::Orbit(c) => c,
            ActiveCamera::Free(c) => c,
        }
    }
}

impl Camera for ActiveCamera {
    fn position(&self) -> Vec3 {
        self.inner().position()
    }

    fn target(&self) -> Vec3 {
        self.inner().target()
    }

    fn up(&self) -> Vec3 {
        self.inner().up()
    }

    fn apply(&mut self, action: CameraAction) -> bool {
        let applied = self.inner_mut().apply(action);
        if !applied {
            tracing::debug!(?action, scheme = ?self.scheme(), "camera action not applied");
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_selects_variant() {
        assert!(matches!(
            ActiveCamera::new(CameraScheme::Orbit),
            ActiveCamera::Orbit(_)
        ));
        assert_eq!(
            ActiveCamera::new(CameraScheme::Free).scheme(),
            CameraScheme::Free
        );
    }

    #[test]
    fn orbit_ignores_free_actions() {
        let mut cam = ActiveCamera::new(CameraScheme::Orbit);
        let before = cam.position();
        assert!(!cam.apply(CameraAction::MoveForward));
        assert_eq!(cam.position(), before);
        assert!(cam.apply(CameraAction::IncreaseDistance));
        assert!(cam.position().length() > before.length());
    }

    #[test]
    fn free_ignores_orbit_actions() {
        let mut cam = ActiveCamera::new(CameraScheme::Free);
        let before = cam.target();
        assert!(!cam.apply(CameraAction::IncreaseAngleZX));
        assert_eq!(cam.target(), before);
        assert!(cam.apply(CameraAction::TurnLeft));
        assert_ne!(cam.target(), before);
    }

    #[test]
    fn both_start_looking_at_the_cube() {
        for scheme in [CameraScheme::Orbit, CameraScheme::Free] {
            let cam = ActiveCamera::new(scheme);
            assert_eq!(cam.target(), Vec3::ZERO);
            assert!((cam.position() - Vec3::new(0.0, 0.0, 8.0)).length() < 1e-4);
            assert!((cam.up() - Vec3::Y).length() < 1e-4);
        }
    }
}
