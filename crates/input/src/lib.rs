//! Input mapping: backend-neutral keys translated into high-level actions.
//!
//! # Invariants
//! - Camera and cube logic consume `Action`s, never raw key events.
//! - Each camera scheme has its own bindings; layer-turn keys are shared.

pub mod action;
pub mod keymap;

pub use action::{Action, CameraAction, CameraScheme, ParseSchemeError};
pub use keymap::{Key, Keymap, ParseKeyError};
