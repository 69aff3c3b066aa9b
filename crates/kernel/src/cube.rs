use crate::grid::{CubeGrid, SubCube};
use crate::rotation::{LayerRotationController, Tick};
use cubegrid_common::TurnDirection;
use serde::{Deserialize, Serialize};

/// An event record produced by every turn request and completion.
///
/// The log is append-only; replaying the completed turns onto a fresh grid
/// reproduces the logical state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CubeEvent {
    /// A front-layer turn was armed.
    TurnStarted { tick: u64, direction: TurnDirection },
    /// A turn request arrived while another turn was in flight and was dropped.
    TurnIgnored { tick: u64, direction: TurnDirection },
    /// A turn finished and `moved` sub-cubes were re-bucketed.
    TurnCompleted {
        tick: u64,
        direction: TurnDirection,
        moved: usize,
    },
}

/// The cube: grid state plus the front-layer rotation animation.
///
/// All mutations go through `rotate_front` and `step`. Renderers only read.
#[derive(Debug, Clone)]
pub struct Cube {
    grid: CubeGrid,
    rotation: LayerRotationController,
    tick: u64,
    turns_completed: u64,
    event_log: Vec<CubeEvent>,
}

impl Default for Cube {
    fn default() -> Self {
        Self::new()
    }
}

impl Cube {
    pub fn new() -> Self {
        Self::with_rotation(LayerRotationController::new())
    }

    pub fn with_rotation(rotation: LayerRotationController) -> Self {
        Self {
            grid: CubeGrid::new(),
            rotation,
            tick: 0,
            turns_completed: 0,
            event_log: Vec::new(),
        }
    }

    pub fn grid(&self) -> &CubeGrid {
        &self.grid
    }

    pub fn rotation(&self) -> &LayerRotationController {
        &self.rotation
    }

    /// Number of update ticks stepped so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn turns_completed(&self) -> u64 {
        self.turns_completed
    }

    pub fn events(&self) -> &[CubeEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<CubeEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn is_solved(&self) -> bool {
        self.grid.is_solved()
    }

    /// Request a quarter turn of the front layer. Dropped if one is running.
    pub fn rotate_front(&mut self, direction: TurnDirection) -> bool {
        let tick = self.tick;
        if self.rotation.rotate(direction) {
            tracing::debug!(?direction, tick, "front turn started");
            self.event_log
                .push(CubeEvent::TurnStarted { tick, direction });
            true
        } else {
            tracing::debug!(?direction, tick, "turn in progress, request ignored");
            self.event_log
                .push(CubeEvent::TurnIgnored { tick, direction });
            false
        }
    }

    /// Advance one fixed update tick.
    pub fn step(&mut self) -> Tick {
        self.tick += 1;
        let outcome = self.rotation.advance();
        if let Tick::Completed(direction) = outcome {
            let moved = self.grid.rebucket_front_layer(direction);
            self.turns_completed += 1;
            tracing::info!(
                ?direction,
                moved,
                turns = self.turns_completed,
                "front turn completed"
            );
            self.event_log.push(CubeEvent::TurnCompleted {
                tick: self.tick,
                direction,
                moved,
            });
        }
        outcome
    }

    /// Step until no turn is in progress. Returns the number of ticks taken.
    pub fn settle(&mut self) -> u64 {
        let start = self.tick;
        while self.rotation.in_progress() {
            self.step();
        }
        self.tick - start
    }

    /// Rotation about +Z currently applied to `cube` at render time.
    pub fn layer_angle(&self, cube: &SubCube) -> f32 {
        if self.rotation.in_progress() && cube.in_front_layer() {
            self.rotation.current_angle()
        } else {
            0.0
        }
    }

    /// Rebuild the logical grid from an event log. Only completed turns matter.
    pub fn replay(events: &[CubeEvent]) -> Self {
        let mut cube = Self::new();
        for event in events {
            if let CubeEvent::TurnCompleted {
                tick, direction, ..
            } = event
            {
                cube.grid.rebucket_front_layer(*direction);
                cube.turns_completed += 1;
                cube.tick = *tick;
            }
        }
        cube
    }
}
