use clap::Parser;

use crate::shared::collector::FailurePolicy;

/// Prometheus exporter for a Bitcoin Core node's RPC interface.
#[derive(Debug, Parser)]
#[command(name = "bitcoind-exporter")]
pub struct Config {
    /// bitcoind's RPC address (host:port)
    #[arg(short = 'H', long, default_value = "127.0.0.1:9332")]
    pub bitcoind_host: String,

    /// bitcoind's RPC user
    #[arg(short = 'u', long, default_value = "bitcoind")]
    pub bitcoind_user: String,

    /// bitcoind's RPC password, taken from the environment
    #[arg(long, env = "RPC_PASS", hide_env_values = true, default_value = "")]
    pub rpc_pass: String,

    /// the network address and port the exporter will expose its metrics on
    #[arg(short = 'l', long, default_value = "0.0.0.0:8452")]
    pub listen_to: String,

    /// abort the whole scrape (and the process) on any single collector
    /// failure instead of omitting the failed metric
    #[arg(long)]
    pub fail_fast: bool,

    /// timeout applied to every individual RPC call, in seconds
    #[arg(long, default_value_t = 10)]
    pub rpc_timeout_secs: u64,
}

impl Config {
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Degrade
        }
    }
}
