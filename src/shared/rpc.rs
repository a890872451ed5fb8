use log::info;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::shared::error::{CollectError, ExporterError};
use crate::shared::traits::NodeRpc;

// Bitcoin Core speaks the original JSON-RPC 1.0 dialect over HTTP POST.
const JSONRPC_VERSION: &str = "1.0";
const CLIENT_ID: &str = "bitcoind-exporter";

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<Value>,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Long-lived session against bitcoind's RPC interface. Created once at
/// startup, shared read-only by every collector; the underlying
/// `reqwest::Client` pools connections and is safe for concurrent use.
/// Dropping the session closes the connection pool.
#[derive(Debug)]
pub struct RpcSession {
    http: reqwest::Client,
    endpoint: Url,
    user: String,
    password: String,
}

impl RpcSession {
    /// Opens a session and probes the node with a `getblockcount` call
    /// before handing it out. An unreachable or unauthenticated node fails
    /// here, so the process never starts serving scrapes it cannot answer.
    pub async fn connect(config: &Config) -> Result<Self, ExporterError> {
        // Bitcoin Core does not provide TLS by default
        let endpoint = Url::parse(&format!("http://{}", config.bitcoind_host))
            .map_err(|e| ExporterError::Connection(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.rpc_timeout_secs))
            .build()
            .map_err(|e| ExporterError::Connection(e.to_string()))?;

        let session = Self {
            http,
            endpoint,
            user: config.bitcoind_user.clone(),
            password: config.rpc_pass.clone(),
        };

        info!("trying to connect to bitcoind at {:?}...", config.bitcoind_host);
        session
            .get_block_count()
            .await
            .map_err(|e| ExporterError::Connection(e.to_string()))?;
        info!("successfully connected to bitcoind");

        Ok(session)
    }

    pub async fn call(&self, method: &str, params: &[Value]) -> Result<Value, CollectError> {
        let body = json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": CLIENT_ID,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(&self.user, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| CollectError::Transport(e.to_string()))?;

        // bitcoind answers RPC-level failures with a non-2xx status and a
        // JSON-RPC error body, so the status alone is not conclusive. An
        // auth rejection carries no parseable body at all.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(CollectError::Transport(
                "bitcoind rejected RPC credentials (401)".to_string(),
            ));
        }

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| CollectError::Decode(e.to_string()))?;

        extract_result(response)
    }
}

/// Splits a parsed JSON-RPC envelope into its payload or its error object.
pub fn extract_result(response: RpcResponse) -> Result<Value, CollectError> {
    if let Some(err) = response.error {
        return Err(CollectError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    response
        .result
        .ok_or_else(|| CollectError::Decode("response carries neither result nor error".to_string()))
}

#[async_trait::async_trait]
impl NodeRpc for RpcSession {
    async fn get_block_count(&self) -> Result<u64, CollectError> {
        let result = self.call("getblockcount", &[]).await?;
        serde_json::from_value(result).map_err(|e| CollectError::Decode(e.to_string()))
    }

    async fn get_difficulty(&self) -> Result<f64, CollectError> {
        let result = self.call("getdifficulty", &[]).await?;
        serde_json::from_value(result).map_err(|e| CollectError::Decode(e.to_string()))
    }

    async fn get_raw_mempool(&self) -> Result<Vec<String>, CollectError> {
        let result = self.call("getrawmempool", &[]).await?;
        serde_json::from_value(result).map_err(|e| CollectError::Decode(e.to_string()))
    }

    async fn raw_request(&self, method: &str) -> Result<Value, CollectError> {
        self.call(method, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> RpcResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn extracts_result_payload() {
        let response = parse(r#"{"result": 812345, "error": null, "id": "bitcoind-exporter"}"#);
        let value = extract_result(response).unwrap();
        assert_eq!(value, json!(812345));
    }

    #[test]
    fn maps_error_object_to_rpc_error() {
        let response =
            parse(r#"{"result": null, "error": {"code": -32601, "message": "Method not found"}}"#);
        match extract_result(response) {
            Err(CollectError::Rpc { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("expected Rpc error, got {:?}", other),
        }
    }

    #[test]
    fn empty_envelope_is_a_decode_error() {
        let response = parse(r#"{"result": null, "error": null}"#);
        assert!(matches!(
            extract_result(response),
            Err(CollectError::Decode(_))
        ));
    }

    // Port 9 (discard) is closed on any sane test host, so the liveness
    // probe fails and startup must stop here, before any listener binds.
    #[tokio::test]
    async fn connect_to_unreachable_node_fails_with_connection_error() {
        use clap::Parser;

        let config = Config::parse_from([
            "bitcoind-exporter",
            "-H",
            "127.0.0.1:9",
            "--rpc-timeout-secs",
            "1",
        ]);

        let err = RpcSession::connect(&config).await.unwrap_err();
        assert!(matches!(err, ExporterError::Connection(_)));
    }
}
