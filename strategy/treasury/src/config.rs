//! Configuration types for the treasury strategies.

use clients_tron::TronAddress;

/// Default NFT id of the managed liquidity position.
pub const DEFAULT_POSITION_ID: u64 = 765;

/// Configuration for WithdrawStrategy (parameters only; clients are passed to
/// `WithdrawStrategy::new`).
#[derive(Debug, Clone)]
pub struct WithdrawStrategyConfig {
    /// Token contract that accumulates TRX and exposes `withdrawLiquidity(uint256)`
    pub token_contract: TronAddress,
    /// Receiver of the expense share of every withdrawal
    pub expense_wallet: TronAddress,
}

/// Configuration for LiquidityStrategy (parameters only; clients are passed to
/// `LiquidityStrategy::new`).
#[derive(Debug, Clone)]
pub struct LiquidityStrategyConfig {
    /// WTRX, token0 of the position
    pub wrapped_token: TronAddress,
    /// Paired TRC-20 token, token1 of the position
    pub paired_token: TronAddress,
    /// NonfungiblePositionManager holding the position
    pub position_manager: TronAddress,
    /// NFT id of the position to increase
    pub position_id: u64,
}

/// Labels and links used when rendering operator reports.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Ticker of the paired token
    pub token_symbol: String,
    /// "Buy directly" page
    pub buy_url: String,
    /// Lock & unlock timeline page
    pub timeline_url: String,
    /// Pool address used for GeckoTerminal, Sun.io and CoinMarketCap links
    pub pool_address: String,
    /// Block explorer root, e.g. `https://tronscan.org/#`
    pub explorer_url: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            token_symbol: "QSI".to_string(),
            buy_url: "https://quickshooters.com/buyqsi".to_string(),
            timeline_url: "https://quickshooters.com/swapqsi".to_string(),
            pool_address: "TCGYUS35aVemngWEbLfX5FmrktcsRuHGbt".to_string(),
            explorer_url: "https://tronscan.org/#".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn transaction_url(&self, tx: impl std::fmt::Display) -> String {
        format!("{}/transaction/{}", self.explorer_url, tx)
    }

    pub fn address_url(&self, address: &TronAddress) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }

    pub fn gecko_terminal_url(&self) -> String {
        format!(
            "https://www.geckoterminal.com/tron/pools/{}",
            self.pool_address
        )
    }

    pub fn sun_io_url(&self) -> String {
        format!(
            "https://sun.io/?lang=en-US#/scan/pairDetail?pairAddress={}&version=v3",
            self.pool_address
        )
    }

    pub fn coin_market_cap_url(&self) -> String {
        format!(
            "https://coinmarketcap.com/dexscan/tron/{}/",
            self.pool_address
        )
    }
}
