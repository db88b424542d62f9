//! Swap-router quote client used as the price oracle.

mod config;
mod router;
mod types;

pub use config::{SunswapRouterConfig, DEFAULT_ROUTER_URL};
pub use router::{QuoteError, SunswapRouter};
pub use types::{PriceQuote, RouteQuote, RouterEnvelope};
