//! Configuration types for the TRON wallet client.

use serde::{Deserialize, Serialize};

/// Public TronGrid full node.
pub const DEFAULT_FULL_HOST: &str = "https://api.trongrid.io";

/// Energy fee cap attached to every contract call, in sun (100 TRX).
pub const DEFAULT_FEE_LIMIT: u64 = 100_000_000;

/// Configuration for TronWallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TronWalletConfig {
    /// Base URL of the full node HTTP API
    pub full_host: String,
    /// TronGrid API key, sent as `TRON-PRO-API-KEY` when present
    pub api_key: Option<String>,
    /// Maximum fee a contract call may burn, in sun
    pub fee_limit: u64,
}

impl Default for TronWalletConfig {
    fn default() -> Self {
        Self {
            full_host: DEFAULT_FULL_HOST.to_string(),
            api_key: None,
            fee_limit: DEFAULT_FEE_LIMIT,
        }
    }
}
