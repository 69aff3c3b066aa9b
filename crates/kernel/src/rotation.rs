use cubegrid_common::TurnDirection;
use std::f32::consts::FRAC_PI_2;

/// Angle of one quarter turn, in radians.
pub const QUARTER_TURN: f32 = FRAC_PI_2;

/// Angle advanced per update tick (2 degrees), so a quarter turn takes 45 ticks.
pub const DEFAULT_ANGULAR_SPEED: f32 = std::f32::consts::PI / 90.0;

/// Distance from the target angle at which a turn snaps and completes.
pub const ANGLE_EPSILON: f32 = 0.01;

/// Phase of the layer rotation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPhase {
    Idle,
    Rotating,
}

/// What a single `advance` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No turn in progress.
    Idle,
    /// The current angle moved one step toward the target.
    Advanced,
    /// The turn reached its target; the layer must now be re-bucketed.
    Completed(TurnDirection),
}

/// Animates a quarter turn of a layer, one fixed angular step per tick.
///
/// At most one turn is in flight. `rotate` while a turn is in progress is
/// ignored. When a turn completes both angles return to zero: the caller
/// re-buckets the logical positions, which absorbs the rotation.
#[derive(Debug, Clone)]
pub struct LayerRotationController {
    target_angle: f32,
    current_angle: f32,
    direction: TurnDirection,
    angular_speed: f32,
    in_progress: bool,
}

impl Default for LayerRotationController {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerRotationController {
    pub fn new() -> Self {
        Self::with_angular_speed(DEFAULT_ANGULAR_SPEED)
    }

    /// Controller advancing `angular_speed` radians per tick.
    ///
    /// Non-positive or non-finite speeds fall back to the default.
    pub fn with_angular_speed(angular_speed: f32) -> Self {
        let angular_speed = if angular_speed.is_finite() && angular_speed > 0.0 {
            angular_speed
        } else {
            DEFAULT_ANGULAR_SPEED
        };
        Self {
            target_angle: 0.0,
            current_angle: 0.0,
            direction: TurnDirection::Clockwise,
            angular_speed,
            in_progress: false,
        }
    }

    pub fn target_angle(&self) -> f32 {
        self.target_angle
    }

    /// Signed rotation of the turning layer about +Z, in radians.
    pub fn current_angle(&self) -> f32 {
        self.current_angle
    }

    /// Direction of the current (or most recent) turn.
    pub fn direction(&self) -> TurnDirection {
        self.direction
    }

    pub fn angular_speed(&self) -> f32 {
        self.angular_speed
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn phase(&self) -> RotationPhase {
        if self.in_progress {
            RotationPhase::Rotating
        } else {
            RotationPhase::Idle
        }
    }

    /// Arm a quarter turn. Returns `false` (and changes nothing) if a turn is
    /// already in progress.
    pub fn rotate(&mut self, direction: TurnDirection) -> bool {
        if self.in_progress {
            return false;
        }
        self.target_angle += direction.angle_sign() * QUARTER_TURN;
        self.direction = direction;
        self.in_progress = true;
        true
    }

    /// Advance the animation by one fixed step.
    pub fn advance(&mut self) -> Tick {
        if !self.in_progress {
            return Tick::Idle;
        }

        let sign = self.direction.angle_sign();
        self.current_angle += sign * self.angular_speed;

        let remaining = self.target_angle - self.current_angle;
        let overshot = remaining * sign < 0.0;
        if remaining.abs() < ANGLE_EPSILON || overshot {
            // Snapping to the target and re-bucketing is equivalent to
            // resetting the angle once positions have been updated.
            self.in_progress = false;
            self.current_angle = 0.0;
            self.target_angle = 0.0;
            return Tick::Completed(self.direction);
        }
        Tick::Advanced
    }
}
