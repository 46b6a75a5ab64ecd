//! Animation model and playback

pub mod engine;
pub mod model;

pub use engine::{AnimationEngine, Termination};
pub use model::{Animation, AnimationKind, Direction, ModelError, MAX_PAYLOAD, POWER_DOWN_IMAGE};
