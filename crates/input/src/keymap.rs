use crate::action::{Action, CameraAction, CameraScheme};
use cubegrid_common::TurnDirection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Keys the application reacts to, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    W,
    A,
    S,
    D,
    U,
    F,
    G,
    Space,
    Backspace,
    F1,
    Escape,
}

impl Key {
    pub const ALL: [Key; 15] = [
        Key::ArrowLeft,
        Key::ArrowRight,
        Key::ArrowUp,
        Key::ArrowDown,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::U,
        Key::F,
        Key::G,
        Key::Space,
        Key::Backspace,
        Key::F1,
        Key::Escape,
    ];

    /// Lower-case name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Key::ArrowLeft => "left",
            Key::ArrowRight => "right",
            Key::ArrowUp => "up",
            Key::ArrowDown => "down",
            Key::W => "w",
            Key::A => "a",
            Key::S => "s",
            Key::D => "d",
            Key::U => "u",
            Key::F => "f",
            Key::G => "g",
            Key::Space => "space",
            Key::Backspace => "backspace",
            Key::F1 => "f1",
            Key::Escape => "escape",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key {0:?}")]
pub struct ParseKeyError(String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Key::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| ParseKeyError(s.to_owned()))
    }
}

/// Key-down bindings for one camera scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keymap {
    scheme: CameraScheme,
    bindings: BTreeMap<Key, Action>,
}

impl Keymap {
    /// Default bindings for `scheme`.
    ///
    /// Orbit: arrows left/right change the ZY angle, up/down the distance,
    /// U/D the ZX angle. Free: WASD move, Space/Backspace rise/sink, arrows
    /// turn and look. Both: F turns the front layer clockwise, G
    /// counter-clockwise.
    pub fn for_scheme(scheme: CameraScheme) -> Self {
        use CameraAction::*;

        let camera: &[(Key, CameraAction)] = match scheme {
            CameraScheme::Orbit => &[
                (Key::ArrowLeft, DecreaseAngleZY),
                (Key::ArrowRight, IncreaseAngleZY),
                (Key::ArrowDown, IncreaseDistance),
                (Key::ArrowUp, DecreaseDistance),
                (Key::U, IncreaseAngleZX),
                (Key::D, DecreaseAngleZX),
            ],
            CameraScheme::Free => &[
                (Key::W, MoveForward),
                (Key::S, MoveBackward),
                (Key::A, MoveLeft),
                (Key::D, MoveRight),
                (Key::Space, MoveUp),
                (Key::Backspace, MoveDown),
                (Key::ArrowLeft, TurnLeft),
                (Key::ArrowRight, TurnRight),
                (Key::ArrowUp, LookUp),
                (Key::ArrowDown, LookDown),
            ],
        };

        let mut bindings: BTreeMap<Key, Action> = camera
            .iter()
            .map(|&(key, action)| (key, Action::Camera(action)))
            .collect();
        bindings.insert(Key::F, Action::RotateFront(TurnDirection::Clockwise));
        bindings.insert(Key::G, Action::RotateFront(TurnDirection::CounterClockwise));
        bindings.insert(Key::F1, Action::ToggleHud);
        bindings.insert(Key::Escape, Action::Quit);

        Self { scheme, bindings }
    }

    pub fn scheme(&self) -> CameraScheme {
        self.scheme
    }

    /// Action bound to `key`, if any.
    pub fn action(&self, key: Key) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    /// All bindings in key order.
    pub fn bindings(&self) -> impl Iterator<Item = (Key, Action)> + '_ {
        self.bindings.iter().map(|(k, a)| (*k, *a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_arrows_drive_angle_and_distance() {
        let map = Keymap::for_scheme(CameraScheme::Orbit);
        assert_eq!(
            map.action(Key::ArrowLeft),
            Some(Action::Camera(CameraAction::DecreaseAngleZY))
        );
        assert_eq!(
            map.action(Key::ArrowUp),
            Some(Action::Camera(CameraAction::DecreaseDistance))
        );
        assert_eq!(
            map.action(Key::U),
            Some(Action::Camera(CameraAction::IncreaseAngleZX))
        );
        assert_eq!(map.action(Key::W), None);
    }

    #[test]
    fn free_scheme_binds_wasd_and_arrows() {
        let map = Keymap::for_scheme(CameraScheme::Free);
        assert_eq!(
            map.action(Key::W),
            Some(Action::Camera(CameraAction::MoveForward))
        );
        assert_eq!(
            map.action(Key::Backspace),
            Some(Action::Camera(CameraAction::MoveDown))
        );
        assert_eq!(
            map.action(Key::ArrowRight),
            Some(Action::Camera(CameraAction::TurnRight))
        );
        assert_eq!(map.action(Key::U), None);
    }

    #[test]
    fn layer_keys_are_shared() {
        for scheme in [CameraScheme::Orbit, CameraScheme::Free] {
            let map = Keymap::for_scheme(scheme);
            assert_eq!(
                map.action(Key::F),
                Some(Action::RotateFront(TurnDirection::Clockwise))
            );
            assert_eq!(
                map.action(Key::G),
                Some(Action::RotateFront(TurnDirection::CounterClockwise))
            );
        }
    }

    #[test]
    fn camera_bindings_match_scheme() {
        for scheme in [CameraScheme::Orbit, CameraScheme::Free] {
            let map = Keymap::for_scheme(scheme);
            for (_, action) in map.bindings() {
                if let Action::Camera(c) = action {
                    assert_eq!(c.scheme(), scheme);
                }
            }
        }
    }

    #[test]
    fn key_names_parse_back() {
        for key in Key::ALL {
            assert_eq!(key.name().parse::<Key>(), Ok(key));
        }
        assert_eq!("Space".parse::<Key>(), Ok(Key::Space));
        assert!("ctrl".parse::<Key>().is_err());
    }
}
