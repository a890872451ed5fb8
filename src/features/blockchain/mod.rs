pub mod collector;

pub use collector::{BlockCountCollector, DifficultyCollector};
