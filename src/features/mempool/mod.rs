pub mod collector;

pub use collector::MempoolCollector;
