use async_trait::async_trait;

use crate::shared::error::CollectError;
use crate::shared::traits::{MetricCollector, MetricDescriptor, NodeRpc};

const BLOCK_COUNT: MetricDescriptor = MetricDescriptor {
    namespace: "bitcoind",
    subsystem: "blockchain",
    name: "block_count",
    help: "bitcoind's current block count",
};

const DIFFICULTY: MetricDescriptor = MetricDescriptor {
    namespace: "bitcoind",
    subsystem: "blockchain",
    name: "difficulty",
    help: "bitcoind's current difficulty",
};

pub struct BlockCountCollector;

#[async_trait]
impl MetricCollector for BlockCountCollector {
    fn descriptor(&self) -> &MetricDescriptor {
        &BLOCK_COUNT
    }

    async fn collect(&self, node: &dyn NodeRpc) -> Result<f64, CollectError> {
        let count = node.get_block_count().await?;
        Ok(count as f64)
    }
}

pub struct DifficultyCollector;

#[async_trait]
impl MetricCollector for DifficultyCollector {
    fn descriptor(&self) -> &MetricDescriptor {
        &DIFFICULTY
    }

    async fn collect(&self, node: &dyn NodeRpc) -> Result<f64, CollectError> {
        node.get_difficulty().await
    }
}
