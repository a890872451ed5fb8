pub mod config;
pub mod features;
pub mod server;
pub mod shared;

// Re-export commonly used items from features
pub use features::blockchain::{BlockCountCollector, DifficultyCollector};
pub use features::mempool::MempoolCollector;
pub use features::network::{NetworkConnectionsCollector, NetworkInfo};

// Re-export shared functionality
pub use shared::collector::{
    render,
    CollectorRegistry,
    FailurePolicy,
    Sample,
    ScrapeResult,
};
pub use shared::error::{CollectError, ExporterError};
pub use shared::rpc::RpcSession;
pub use shared::traits::{MetricCollector, MetricDescriptor, NodeRpc};
