use async_trait::async_trait;

use crate::shared::error::CollectError;
use crate::shared::traits::{MetricCollector, MetricDescriptor, NodeRpc};

const TRANSACTION_COUNT: MetricDescriptor = MetricDescriptor {
    namespace: "bitcoind",
    subsystem: "mempool",
    name: "transaction_count",
    help: "bitcoind's current transaction count in mempool",
};

/// Counts pending transactions by length of the mempool hash listing; the
/// hashes themselves are discarded. An empty mempool is a valid zero.
pub struct MempoolCollector;

#[async_trait]
impl MetricCollector for MempoolCollector {
    fn descriptor(&self) -> &MetricDescriptor {
        &TRANSACTION_COUNT
    }

    async fn collect(&self, node: &dyn NodeRpc) -> Result<f64, CollectError> {
        let hashes = node.get_raw_mempool().await?;
        Ok(hashes.len() as f64)
    }
}
