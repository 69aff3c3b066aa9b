use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of sub-cubes along each axis of the grid.
pub const GRID_SIZE: u8 = 3;

const MAX_COORD: u8 = GRID_SIZE - 1;

/// Errors from constructing grid value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordError {
    #[error("grid coordinate ({x}, {y}, {z}) out of range 0..{size}", size = GRID_SIZE)]
    OutOfRange { x: u8, y: u8, z: u8 },
}

/// Logical (integer) position of a sub-cube in the 3x3x3 grid.
///
/// Every coordinate is in `0..GRID_SIZE`; deserialization goes through
/// [`GridPos::new`] so the range holds for values read back from JSON too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawGridPos")]
pub struct GridPos {
    x: u8,
    y: u8,
    z: u8,
}

#[derive(Deserialize)]
struct RawGridPos {
    x: u8,
    y: u8,
    z: u8,
}

impl TryFrom<RawGridPos> for GridPos {
    type Error = CoordError;

    fn try_from(raw: RawGridPos) -> Result<Self, CoordError> {
        GridPos::new(raw.x, raw.y, raw.z)
    }
}

impl GridPos {
    pub fn new(x: u8, y: u8, z: u8) -> Result<Self, CoordError> {
        if x > MAX_COORD || y > MAX_COORD || z > MAX_COORD {
            return Err(CoordError::OutOfRange { x, y, z });
        }
        Ok(Self { x, y, z })
    }

    pub fn x(self) -> u8 {
        self.x
    }

    pub fn y(self) -> u8 {
        self.y
    }

    pub fn z(self) -> u8 {
        self.z
    }

    /// All 27 grid positions in x-major, then y, then z order.
    pub fn all() -> impl Iterator<Item = GridPos> {
        (0..GRID_SIZE).flat_map(|x| {
            (0..GRID_SIZE).flat_map(move |y| (0..GRID_SIZE).map(move |z| GridPos { x, y, z }))
        })
    }

    /// Offset from the grid center, in whole cells (`-1.0..=1.0` per axis).
    pub fn centered(self) -> Vec3 {
        let c = f32::from(MAX_COORD) / 2.0;
        Vec3::new(
            f32::from(self.x) - c,
            f32::from(self.y) - c,
            f32::from(self.z) - c,
        )
    }

    /// Quarter turn of `(x, y)` about the Z axis, `z` unchanged.
    ///
    /// Clockwise as seen from +Z maps `(x, y)` to `(y, 2 - x)`; counter-clockwise
    /// is the inverse, `(2 - y, x)`.
    pub fn quarter_turn_z(self, direction: TurnDirection) -> Self {
        match direction {
            TurnDirection::Clockwise => Self {
                x: self.y,
                y: MAX_COORD - self.x,
                z: self.z,
            },
            TurnDirection::CounterClockwise => Self {
                x: MAX_COORD - self.y,
                y: self.x,
                z: self.z,
            },
        }
    }
}

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0.0, 0.0, 0.0, 1.0]);
    pub const WHITE: Rgba = Rgba([1.0, 1.0, 1.0, 1.0]);
    pub const RED: Rgba = Rgba([1.0, 0.0, 0.0, 1.0]);
    pub const GREEN: Rgba = Rgba([0.0, 1.0, 0.0, 1.0]);
    pub const BLUE: Rgba = Rgba([0.0, 0.0, 1.0, 1.0]);
    pub const MAGENTA: Rgba = Rgba([1.0, 0.0, 1.0, 1.0]);
    pub const CYAN: Rgba = Rgba([0.0, 1.0, 1.0, 1.0]);
    pub const YELLOW: Rgba = Rgba([1.0, 1.0, 0.0, 1.0]);
}

/// One of the six faces of a cube, named by the direction its normal points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Up,
    Front,
    Left,
    Down,
    Back,
    Right,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Up,
        Face::Front,
        Face::Left,
        Face::Down,
        Face::Back,
        Face::Right,
    ];

    /// Outward unit normal of the face.
    #[cfg(test)]
    fn normal(self) -> Vec3 {
        match self {
            Face::Up => Vec3::Y,
            Face::Down => Vec3::NEG_Y,
            Face::Front => Vec3::Z,
            Face::Back => Vec3::NEG_Z,
            Face::Right => Vec3::X,
            Face::Left => Vec3::NEG_X,
        }
    }

    /// The face this one points toward after a quarter turn about +Z.
    pub fn turned_z(self, direction: TurnDirection) -> Face {
        match (self, direction) {
            (Face::Front | Face::Back, _) => self,
            (Face::Up, TurnDirection::Clockwise) => Face::Right,
            (Face::Right, TurnDirection::Clockwise) => Face::Down,
            (Face::Down, TurnDirection::Clockwise) => Face::Left,
            (Face::Left, TurnDirection::Clockwise) => Face::Up,
            (Face::Up, TurnDirection::CounterClockwise) => Face::Left,
            (Face::Left, TurnDirection::CounterClockwise) => Face::Down,
            (Face::Down, TurnDirection::CounterClockwise) => Face::Right,
            (Face::Right, TurnDirection::CounterClockwise) => Face::Up,
        }
    }
}

/// Per-face colors of one sub-cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceColors {
    pub up: Rgba,
    pub front: Rgba,
    pub left: Rgba,
    pub down: Rgba,
    pub back: Rgba,
    pub right: Rgba,
}

impl FaceColors {
    pub fn uniform(color: Rgba) -> Self {
        Self {
            up: color,
            front: color,
            left: color,
            down: color,
            back: color,
            right: color,
        }
    }
}

impl Default for FaceColors {
    fn default() -> Self {
        Self::uniform(Rgba::BLACK)
    }
}

impl Index<Face> for FaceColors {
    type Output = Rgba;

    fn index(&self, face: Face) -> &Rgba {
        match face {
            Face::Up => &self.up,
            Face::Front => &self.front,
            Face::Left => &self.left,
            Face::Down => &self.down,
            Face::Back => &self.back,
            Face::Right => &self.right,
        }
    }
}

/// Direction of a quarter turn, as seen looking at the turning face from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnDirection {
    Clockwise,
    CounterClockwise,
}

impl TurnDirection {
    /// Sign of the rotation angle about the face normal (right-handed).
    ///
    /// Clockwise seen from outside the face is a negative angle about its normal.
    pub fn angle_sign(self) -> f32 {
        match self {
            TurnDirection::Clockwise => -1.0,
            TurnDirection::CounterClockwise => 1.0,
        }
    }
}
