use cubegrid_common::TurnDirection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which camera model is driven by the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraScheme {
    /// Spherical coordinates around the origin.
    Orbit,
    /// Free-fly position/target/up camera.
    Free,
}

impl fmt::Display for CameraScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraScheme::Orbit => f.write_str("orbit"),
            CameraScheme::Free => f.write_str("free"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown camera scheme {0:?}, expected `orbit` or `free`")]
pub struct ParseSchemeError(String);

impl FromStr for CameraScheme {
    type Err = ParseSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "orbit" => Ok(CameraScheme::Orbit),
            "free" => Ok(CameraScheme::Free),
            _ => Err(ParseSchemeError(s.to_owned())),
        }
    }
}

/// A single discrete camera adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraAction {
    // Orbit camera
    IncreaseDistance,
    DecreaseDistance,
    IncreaseAngleZY,
    DecreaseAngleZY,
    IncreaseAngleZX,
    DecreaseAngleZX,
    // Free camera
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    TurnLeft,
    TurnRight,
    LookUp,
    LookDown,
}

impl CameraAction {
    /// The scheme this action belongs to.
    pub fn scheme(self) -> CameraScheme {
        use CameraAction::*;
        match self {
            IncreaseDistance | DecreaseDistance | IncreaseAngleZY | DecreaseAngleZY
            | IncreaseAngleZX | DecreaseAngleZX => CameraScheme::Orbit,
            _ => CameraScheme::Free,
        }
    }
}

/// A high-level action produced from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Adjust the active camera.
    Camera(CameraAction),
    /// Start a quarter turn of the front layer.
    RotateFront(TurnDirection),
    /// Show or hide the on-screen HUD.
    ToggleHud,
    /// Close the application.
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_actions_report_orbit_scheme() {
        assert_eq!(CameraAction::IncreaseDistance.scheme(), CameraScheme::Orbit);
        assert_eq!(CameraAction::DecreaseAngleZX.scheme(), CameraScheme::Orbit);
    }

    #[test]
    fn free_actions_report_free_scheme() {
        assert_eq!(CameraAction::MoveForward.scheme(), CameraScheme::Free);
        assert_eq!(CameraAction::LookDown.scheme(), CameraScheme::Free);
    }

    #[test]
    fn scheme_parses_case_insensitively() {
        assert_eq!("Orbit".parse::<CameraScheme>(), Ok(CameraScheme::Orbit));
        assert_eq!("free".parse::<CameraScheme>(), Ok(CameraScheme::Free));
        assert!("fly".parse::<CameraScheme>().is_err());
        assert_eq!(CameraScheme::Free.to_string(), "free");
    }

    #[test]
    fn rotate_front_carries_direction() {
        let a = Action::RotateFront(TurnDirection::CounterClockwise);
        assert!(matches!(
            a,
            Action::RotateFront(TurnDirection::CounterClockwise)
        ));
    }
}
