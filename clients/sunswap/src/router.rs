//! SunswapRouter: fetches swap quotes and turns them into `PriceQuote`s.

use std::str::FromStr;

use alloy::primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::config::SunswapRouterConfig;
use crate::types::{PriceQuote, RouterEnvelope};

/// Errors returned while fetching or interpreting a quote.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no route available (code {code}): {message}")]
    NoRoute { code: i64, message: String },

    #[error("router returned no quotes")]
    EmptyRoute,

    #[error("invalid {field} in quote: {value}")]
    InvalidAmount { field: &'static str, value: String },
}

/// Client for the swap-router quote API.
pub struct SunswapRouter {
    client: reqwest::Client,
    config: SunswapRouterConfig,
}

impl SunswapRouter {
    /// Creates a new `SunswapRouter` with the given HTTP client and configuration.
    pub fn new(client: reqwest::Client, config: SunswapRouterConfig) -> Self {
        Self { client, config }
    }

    /// Quotes `amount_in` (smallest units of `from_token`) into `to_token`.
    ///
    /// # Arguments
    /// * `from_token` - Input token address (base58)
    /// * `to_token` - Output token address (base58)
    /// * `amount_in` - Input amount in smallest units
    /// * `out_decimals` - Decimals of the output token, used to express `amount_out`
    ///   in smallest units
    ///
    /// # Returns
    /// The first route's quote, or a `QuoteError` when the router reports no usable route.
    pub async fn quote(
        &self,
        from_token: &str,
        to_token: &str,
        amount_in: U256,
        out_decimals: u32,
    ) -> Result<PriceQuote, QuoteError> {
        let amount_in = amount_in.to_string();
        debug!(from_token, to_token, amount_in = %amount_in, "requesting swap quote");
        let envelope: RouterEnvelope = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("fromToken", from_token),
                ("toToken", to_token),
                ("amountIn", amount_in.as_str()),
                ("typeList", self.config.type_list.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(code = envelope.code, routes = envelope.data.len(), "swap quote received");
        price_quote(envelope, out_decimals)
    }
}

/// Extracts the first route from an envelope.
///
/// `usd_price = inUsd / amountOut`, left undefined when `amountOut` is zero.
pub(crate) fn price_quote(
    envelope: RouterEnvelope,
    out_decimals: u32,
) -> Result<PriceQuote, QuoteError> {
    if envelope.code != 0 {
        return Err(QuoteError::NoRoute {
            code: envelope.code,
            message: envelope.message.unwrap_or_default(),
        });
    }
    let route = envelope
        .data
        .into_iter()
        .next()
        .ok_or(QuoteError::EmptyRoute)?;

    let amount_out = parse_amount("amountOut", &route.amount_out)?;
    let in_usd = parse_amount("inUsd", &route.in_usd)?;

    let amount_out_units = utils::to_smallest_units(amount_out, out_decimals).ok_or_else(|| {
        QuoteError::InvalidAmount {
            field: "amountOut",
            value: route.amount_out.clone(),
        }
    })?;
    let usd_price = if amount_out.is_zero() {
        None
    } else {
        in_usd.checked_div(amount_out)
    };

    Ok(PriceQuote {
        amount_out: amount_out_units,
        usd_price,
    })
}

fn parse_amount(field: &'static str, value: &str) -> Result<Decimal, QuoteError> {
    Decimal::from_str(value.trim())
        .or_else(|_| Decimal::from_scientific(value.trim()))
        .map_err(|_| QuoteError::InvalidAmount {
            field,
            value: value.to_string(),
        })
}
