//! Cube kernel: the 3x3x3 grid, the front-layer rotation state machine and
//! the event log of turns.
//!
//! # Invariants
//! - The 27 logical positions are always a permutation of `{0,1,2}^3`.
//! - At most one layer turn is in progress; requests during a turn are dropped.
//! - Logical positions change only when a turn completes.

pub mod cube;
pub mod grid;
pub mod rotation;

pub use cube::{Cube, CubeEvent};
pub use grid::{CubeGrid, FRONT_LAYER_Z, GridError, Palette, SubCube};
pub use rotation::{LayerRotationController, RotationPhase, Tick};
