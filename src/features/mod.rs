pub mod blockchain;
pub mod mempool;
pub mod network;
