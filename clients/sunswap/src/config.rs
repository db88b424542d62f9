use serde::{Deserialize, Serialize};

/// Default swap-router quote endpoint.
pub const DEFAULT_ROUTER_URL: &str = "https://rot.endjgfsv.link/swap/router";

/// Configuration for SunswapRouter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunswapRouterConfig {
    /// Quote endpoint, queried with `fromToken`, `toToken`, `amountIn` and `typeList`
    pub base_url: String,
    /// Router pool families to route through (e.g. "SUNSWAP_V3")
    pub type_list: String,
}

impl Default for SunswapRouterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ROUTER_URL.to_string(),
            type_list: "SUNSWAP_V3".to_string(),
        }
    }
}
