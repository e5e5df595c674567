mod config;
mod engine;

pub use config::{WinddownConfig, MAX_FRAMES_PER_MINUTE, MAX_MINUTES, MIN_FRAMES_PER_MINUTE};
pub use engine::{target_saturation, BreakTimer, Phase, SATURATION_EPSILON};
