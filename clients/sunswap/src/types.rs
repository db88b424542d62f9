//! Router response envelope and the derived price quote.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Response envelope of the router quote endpoint. `code == 0` means success.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<RouteQuote>,
}

/// One candidate route. Amounts are human-readable decimal strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuote {
    #[serde(default)]
    pub amount_in: Option<String>,
    pub amount_out: String,
    pub in_usd: String,
    #[serde(default)]
    pub out_usd: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// Quote derived from the best route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    /// Expected output in the output token's smallest unit
    pub amount_out: U256,
    /// USD value of one output token; `None` when the route quoted zero output
    pub usd_price: Option<Decimal>,
}

impl PriceQuote {
    /// USD price rounded to cents, `"0.00"` when undefined.
    pub fn usd_price_display(&self) -> String {
        self.usd_price
            .map(|price| utils::format_decimal(price, 2))
            .unwrap_or_else(|| "0.00".to_string())
    }
}
