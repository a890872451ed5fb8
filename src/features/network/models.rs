use serde::Deserialize;

/// Typed view of bitcoind's `getnetworkinfo` result. Only the fields the
/// exporter reads are required; the node sends many more, which serde
/// ignores. A payload without `connections` fails the decode.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkInfo {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub subversion: String,
    #[serde(default)]
    pub protocolversion: u64,
    pub connections: u64,
    #[serde(default)]
    pub networkactive: bool,
}
