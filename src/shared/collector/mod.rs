use log::warn;
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::features::blockchain::{BlockCountCollector, DifficultyCollector};
use crate::features::mempool::MempoolCollector;
use crate::features::network::NetworkConnectionsCollector;
use crate::shared::error::CollectError;
use crate::shared::traits::{MetricCollector, MetricDescriptor, NodeRpc};

/// What a collector failure does to the scrape that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// First failed collector aborts the whole scrape; the process exits
    /// non-zero. Loud, for setups that want the exporter itself to page.
    FailFast,
    /// A failed collector is logged and its metric omitted from the payload;
    /// the remaining collectors still run.
    Degrade,
}

#[derive(Debug, Clone)]
pub struct Sample {
    pub descriptor: MetricDescriptor,
    pub value: f64,
}

/// Ephemeral outcome of one scrape: the samples that collected successfully,
/// in registration order. Built fresh per scrape, discarded after rendering.
#[derive(Debug, Default)]
pub struct ScrapeResult {
    pub samples: Vec<Sample>,
}

/// Ordered table of every published metric. Built once at startup; iterated
/// on every scrape.
pub struct CollectorRegistry {
    collectors: Vec<Box<dyn MetricCollector>>,
}

impl CollectorRegistry {
    pub fn new(collectors: Vec<Box<dyn MetricCollector>>) -> Self {
        Self { collectors }
    }

    /// The four bitcoind gauges this exporter publishes.
    pub fn bitcoind() -> Self {
        Self::new(vec![
            Box::new(BlockCountCollector),
            Box::new(DifficultyCollector),
            Box::new(MempoolCollector),
            Box::new(NetworkConnectionsCollector),
        ])
    }

    /// Runs every collector against the node, sequentially. Each collector
    /// re-issues its RPC call; nothing is cached between scrapes.
    pub async fn scrape(
        &self,
        node: &dyn NodeRpc,
        policy: FailurePolicy,
    ) -> Result<ScrapeResult, CollectError> {
        let mut result = ScrapeResult::default();

        for collector in &self.collectors {
            let descriptor = collector.descriptor();
            match collector.collect(node).await {
                Ok(value) => result.samples.push(Sample {
                    descriptor: *descriptor,
                    value,
                }),
                Err(e) => match policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::Degrade => {
                        warn!("collector {} failed, omitting metric: {}", descriptor.full_name(), e);
                    }
                },
            }
        }

        Ok(result)
    }
}

/// Renders a scrape into the Prometheus text exposition format: HELP and
/// TYPE annotations plus one `{namespace}_{subsystem}_{name} {value}` line
/// per collected sample. An empty scrape renders an empty payload.
pub fn render(scrape: &ScrapeResult) -> Result<String, prometheus::Error> {
    let registry = Registry::new();

    for sample in &scrape.samples {
        let opts = Opts::new(sample.descriptor.name, sample.descriptor.help)
            .namespace(sample.descriptor.namespace)
            .subsystem(sample.descriptor.subsystem);
        let gauge = Gauge::with_opts(opts)?;
        gauge.set(sample.value);
        registry.register(Box::new(gauge))?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;

    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct FixtureNode {
        block_count: u64,
        difficulty: f64,
        mempool: Vec<String>,
        network_info: Value,
        fail_mempool: bool,
    }

    impl FixtureNode {
        fn healthy() -> Self {
            Self {
                block_count: 812345,
                difficulty: 7.89e13,
                mempool: vec![
                    "3e0a...".to_string(),
                    "91cd...".to_string(),
                    "f00d...".to_string(),
                ],
                network_info: json!({ "version": 270000, "connections": 12 }),
                fail_mempool: false,
            }
        }
    }

    #[async_trait]
    impl NodeRpc for FixtureNode {
        async fn get_block_count(&self) -> Result<u64, CollectError> {
            Ok(self.block_count)
        }

        async fn get_difficulty(&self) -> Result<f64, CollectError> {
            Ok(self.difficulty)
        }

        async fn get_raw_mempool(&self) -> Result<Vec<String>, CollectError> {
            if self.fail_mempool {
                return Err(CollectError::Transport("connection reset".to_string()));
            }
            Ok(self.mempool.clone())
        }

        async fn raw_request(&self, _method: &str) -> Result<Value, CollectError> {
            Ok(self.network_info.clone())
        }
    }

    fn value_lines(payload: &str) -> Vec<&str> {
        payload
            .lines()
            .filter(|line| !line.starts_with('#') && !line.is_empty())
            .collect()
    }

    #[tokio::test]
    async fn renders_all_four_fixture_metrics() {
        let node = FixtureNode::healthy();
        let scrape = CollectorRegistry::bitcoind()
            .scrape(&node, FailurePolicy::FailFast)
            .await
            .unwrap();
        let payload = render(&scrape).unwrap();

        let lines = value_lines(&payload);
        assert!(lines.contains(&"bitcoind_blockchain_block_count 812345"));
        assert!(lines.contains(&"bitcoind_blockchain_difficulty 78900000000000"));
        assert!(lines.contains(&"bitcoind_mempool_transaction_count 3"));
        assert!(lines.contains(&"bitcoind_network_connections_count 12"));
        assert_eq!(lines.len(), 4);
    }

    #[tokio::test]
    async fn consecutive_scrapes_render_identical_value_lines() {
        let node = FixtureNode::healthy();
        let registry = CollectorRegistry::bitcoind();

        let first = render(&registry.scrape(&node, FailurePolicy::Degrade).await.unwrap()).unwrap();
        let second =
            render(&registry.scrape(&node, FailurePolicy::Degrade).await.unwrap()).unwrap();

        assert_eq!(value_lines(&first), value_lines(&second));
    }

    #[tokio::test]
    async fn degrade_omits_only_the_failed_metric() {
        let node = FixtureNode {
            fail_mempool: true,
            ..FixtureNode::healthy()
        };
        let scrape = CollectorRegistry::bitcoind()
            .scrape(&node, FailurePolicy::Degrade)
            .await
            .unwrap();
        let payload = render(&scrape).unwrap();

        let lines = value_lines(&payload);
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"bitcoind_blockchain_block_count 812345"));
        assert!(lines.contains(&"bitcoind_blockchain_difficulty 78900000000000"));
        assert!(lines.contains(&"bitcoind_network_connections_count 12"));
        assert!(!payload.contains("bitcoind_mempool_transaction_count"));
    }

    #[tokio::test]
    async fn fail_fast_aborts_the_scrape() {
        let node = FixtureNode {
            fail_mempool: true,
            ..FixtureNode::healthy()
        };
        let err = CollectorRegistry::bitcoind()
            .scrape(&node, FailurePolicy::FailFast)
            .await
            .unwrap_err();

        assert!(matches!(err, CollectError::Transport(_)));
    }

    #[tokio::test]
    async fn empty_mempool_renders_zero() {
        let node = FixtureNode {
            mempool: Vec::new(),
            ..FixtureNode::healthy()
        };
        let scrape = CollectorRegistry::bitcoind()
            .scrape(&node, FailurePolicy::FailFast)
            .await
            .unwrap();
        let payload = render(&scrape).unwrap();

        assert!(value_lines(&payload).contains(&"bitcoind_mempool_transaction_count 0"));
    }

    #[tokio::test]
    async fn malformed_network_info_is_a_decode_error_under_fail_fast() {
        let node = FixtureNode {
            network_info: json!({ "version": 270000 }),
            ..FixtureNode::healthy()
        };
        let err = CollectorRegistry::bitcoind()
            .scrape(&node, FailurePolicy::FailFast)
            .await
            .unwrap_err();

        assert!(matches!(err, CollectError::Decode(_)));
    }
}
