//! Shared value types for the cube grid.
//!
//! # Invariants
//! - A `GridPos` coordinate is always in `0..GRID_SIZE`.
//! - `TurnDirection` is defined as seen from the front (+Z) face.

mod types;

pub use types::{CoordError, Face, FaceColors, GRID_SIZE, GridPos, Rgba, TurnDirection};
