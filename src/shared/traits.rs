use async_trait::async_trait;
use serde_json::Value;

use crate::shared::error::CollectError;

/// The RPC capability collectors are written against. `RpcSession` is the
/// production implementation; tests substitute fixture nodes.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn get_block_count(&self) -> Result<u64, CollectError>;

    async fn get_difficulty(&self) -> Result<f64, CollectError>;

    /// Hashes of all transactions currently in the node's mempool.
    async fn get_raw_mempool(&self) -> Result<Vec<String>, CollectError>;

    /// Generic call by bare method name with no params. The caller owns
    /// decoding the untyped payload.
    async fn raw_request(&self, method: &str) -> Result<Value, CollectError>;
}

/// Static identity of one published gauge. Defined once at startup, never
/// mutated; the full metric name is `{namespace}_{subsystem}_{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub namespace: &'static str,
    pub subsystem: &'static str,
    pub name: &'static str,
    pub help: &'static str,
}

impl MetricDescriptor {
    pub fn full_name(&self) -> String {
        format!("{}_{}_{}", self.namespace, self.subsystem, self.name)
    }
}

/// One published measurement: issues a single RPC call per invocation and
/// yields one float. Collectors hold no state and never cache; every scrape
/// invokes each of them fresh.
#[async_trait]
pub trait MetricCollector: Send + Sync {
    fn descriptor(&self) -> &MetricDescriptor;

    async fn collect(&self, node: &dyn NodeRpc) -> Result<f64, CollectError>;
}
