use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Connection to bitcoind failed: {0}")]
    Connection(String),

    #[error("Collection failed: {0}")]
    Collection(#[from] CollectError),

    #[error("Failed to bind listen address: {0}")]
    Listen(String),
}

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("RPC error response (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Failed to decode RPC response: {0}")]
    Decode(String),
}
