use async_trait::async_trait;

use crate::features::network::models::NetworkInfo;
use crate::shared::error::CollectError;
use crate::shared::traits::{MetricCollector, MetricDescriptor, NodeRpc};

const CONNECTIONS_COUNT: MetricDescriptor = MetricDescriptor {
    namespace: "bitcoind",
    subsystem: "network",
    name: "connections_count",
    help: "bitcoind's current connections count",
};

/// No typed RPC method exists for the connection count, so this collector
/// issues a raw `getnetworkinfo` call and decodes the untyped payload into
/// `NetworkInfo` itself. A response that does not match the schema surfaces
/// as a decode failure, not a transport one.
pub struct NetworkConnectionsCollector;

#[async_trait]
impl MetricCollector for NetworkConnectionsCollector {
    fn descriptor(&self) -> &MetricDescriptor {
        &CONNECTIONS_COUNT
    }

    async fn collect(&self, node: &dyn NodeRpc) -> Result<f64, CollectError> {
        let raw = node.raw_request("getnetworkinfo").await?;
        let info: NetworkInfo =
            serde_json::from_value(raw).map_err(|e| CollectError::Decode(e.to_string()))?;

        Ok(info.connections as f64)
    }
}
