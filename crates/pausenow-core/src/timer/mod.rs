mod engine;

pub use engine::{TimerConfig, TimerEngine, TimerPhase};
