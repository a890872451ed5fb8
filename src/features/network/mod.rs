pub mod collector;
pub mod models;

pub use collector::NetworkConnectionsCollector;
pub use models::NetworkInfo;
