use cubegrid_common::{Face, FaceColors, GRID_SIZE, GridPos, Rgba, TurnDirection};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;

/// The `z` coordinate of the front layer, the only layer that turns.
pub const FRONT_LAYER_Z: u8 = GRID_SIZE - 1;

/// Colors used when assigning sub-cube faces at setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Color of faces that are not on the grid boundary.
    pub interior: Rgba,
    pub front: Rgba,
    pub up: Rgba,
    pub right: Rgba,
    pub left: Rgba,
    pub back: Rgba,
    pub down: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            interior: Rgba::BLACK,
            front: Rgba::RED,
            up: Rgba::GREEN,
            right: Rgba::BLUE,
            left: Rgba::MAGENTA,
            back: Rgba::CYAN,
            down: Rgba::YELLOW,
        }
    }
}

impl Palette {
    /// Face colors for a sub-cube at `pos`: a face is colored only when the
    /// sub-cube sits on that side of the grid.
    pub fn colors_for(&self, pos: GridPos) -> FaceColors {
        let max = GRID_SIZE - 1;
        let pick = |on_side: bool, color: Rgba| if on_side { color } else { self.interior };
        FaceColors {
            up: pick(pos.y() == max, self.up),
            front: pick(pos.z() == max, self.front),
            left: pick(pos.x() == 0, self.left),
            down: pick(pos.y() == 0, self.down),
            back: pick(pos.z() == 0, self.back),
            right: pick(pos.x() == max, self.right),
        }
    }
}

/// One of the 27 small cubes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCube {
    home: GridPos,
    position: GridPos,
    /// Completed counter-clockwise quarter turns about +Z, modulo 4.
    quarter_turns: u8,
    colors: FaceColors,
}

impl SubCube {
    /// Position the sub-cube was created at. Never changes.
    pub fn home(&self) -> GridPos {
        self.home
    }

    /// Current logical position.
    pub fn position(&self) -> GridPos {
        self.position
    }

    /// Face colors in the sub-cube's own (unturned) frame.
    pub fn colors(&self) -> &FaceColors {
        &self.colors
    }

    /// Resting rotation about +Z accumulated from completed turns, in radians.
    pub fn orientation_angle(&self) -> f32 {
        f32::from(self.quarter_turns) * FRAC_PI_2
    }

    /// Color currently facing `face` in grid space.
    pub fn sticker(&self, face: Face) -> Rgba {
        let mut local = face;
        for _ in 0..self.quarter_turns {
            local = local.turned_z(TurnDirection::Clockwise);
        }
        self.colors[local]
    }

    fn apply_quarter_turn(&mut self, direction: TurnDirection) {
        self.position = self.position.quarter_turn_z(direction);
        self.quarter_turns = match direction {
            TurnDirection::CounterClockwise => (self.quarter_turns + 1) % 4,
            TurnDirection::Clockwise => (self.quarter_turns + 3) % 4,
        };
    }

    pub fn in_front_layer(&self) -> bool {
        self.position.z() == FRONT_LAYER_Z
    }
}

/// Why a deserialized grid was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("expected {expected} sub-cubes, found {found}")]
    WrongCount { expected: usize, found: usize },
    #[error("two sub-cubes share position {0:?}")]
    DuplicatePosition(GridPos),
    #[error("two sub-cubes share home {0:?}")]
    DuplicateHome(GridPos),
    #[error("sub-cube at {position:?} has {quarter_turns} quarter turns, expected 0..4")]
    BadOrientation { position: GridPos, quarter_turns: u8 },
}

/// The 3x3x3 arrangement of sub-cubes.
///
/// Sub-cubes keep a fixed storage order (by home position) for the whole
/// lifetime of the grid; only their logical positions move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCubeGrid")]
pub struct CubeGrid {
    cubes: Vec<SubCube>,
}

#[derive(Deserialize)]
struct RawCubeGrid {
    cubes: Vec<SubCube>,
}

impl TryFrom<RawCubeGrid> for CubeGrid {
    type Error = GridError;

    fn try_from(raw: RawCubeGrid) -> Result<Self, GridError> {
        let expected = usize::from(GRID_SIZE).pow(3);
        if raw.cubes.len() != expected {
            return Err(GridError::WrongCount {
                expected,
                found: raw.cubes.len(),
            });
        }
        let mut positions = HashSet::new();
        let mut homes = HashSet::new();
        for cube in &raw.cubes {
            if !positions.insert(cube.position) {
                return Err(GridError::DuplicatePosition(cube.position));
            }
            if !homes.insert(cube.home) {
                return Err(GridError::DuplicateHome(cube.home));
            }
            if cube.quarter_turns > 3 {
                return Err(GridError::BadOrientation {
                    position: cube.position,
                    quarter_turns: cube.quarter_turns,
                });
            }
        }
        // 27 distinct in-range positions cover the whole grid, and storage
        // order follows home position.
        let mut cubes = raw.cubes;
        cubes.sort_by_key(|c| c.home);
        Ok(Self { cubes })
    }
}

impl Default for CubeGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl CubeGrid {
    /// Build the grid with the default palette.
    pub fn new() -> Self {
        Self::with_palette(&Palette::default())
    }

    pub fn with_palette(palette: &Palette) -> Self {
        let cubes = GridPos::all()
            .map(|pos| SubCube {
                home: pos,
                position: pos,
                quarter_turns: 0,
                colors: palette.colors_for(pos),
            })
            .collect();
        Self { cubes }
    }

    pub fn cubes(&self) -> &[SubCube] {
        &self.cubes
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// The sub-cube currently at `pos`.
    pub fn at(&self, pos: GridPos) -> Option<&SubCube> {
        self.cubes.iter().find(|c| c.position == pos)
    }

    pub fn front_layer(&self) -> impl Iterator<Item = &SubCube> {
        self.cubes.iter().filter(|c| c.in_front_layer())
    }

    /// Every sub-cube is back at its home position and orientation.
    pub fn is_solved(&self) -> bool {
        self.cubes
            .iter()
            .all(|c| c.position == c.home && c.quarter_turns == 0)
    }

    /// The 3x3 stickers visible on one outer face, as seen from outside.
    ///
    /// Rows run top to bottom and columns left to right in that view; the up
    /// and down faces are viewed with the front edge on the bottom row.
    pub fn face_stickers(&self, face: Face) -> [[Rgba; 3]; 3] {
        let max = GRID_SIZE - 1;
        let cell = |row: u8, col: u8| -> (u8, u8, u8) {
            match face {
                Face::Front => (col, max - row, max),
                Face::Back => (max - col, max - row, 0),
                Face::Right => (max, max - row, max - col),
                Face::Left => (0, max - row, col),
                Face::Up => (col, max, row),
                Face::Down => (max - col, 0, row),
            }
        };
        let mut out = [[Rgba::BLACK; 3]; 3];
        for (row, line) in out.iter_mut().enumerate() {
            for (col, slot) in line.iter_mut().enumerate() {
                let (x, y, z) = cell(row as u8, col as u8);
                let cube = GridPos::new(x, y, z).ok().and_then(|pos| self.at(pos));
                if let Some(cube) = cube {
                    *slot = cube.sticker(face);
                }
            }
        }
        out
    }

    /// Apply a completed quarter turn of the front layer to the logical
    /// positions. Returns the number of sub-cubes that were re-bucketed.
    pub(crate) fn rebucket_front_layer(&mut self, direction: TurnDirection) -> usize {
        let mut moved = 0;
        for cube in self.cubes.iter_mut().filter(|c| c.in_front_layer()) {
            cube.apply_quarter_turn(direction);
            moved += 1;
        }
        moved
    }
}
