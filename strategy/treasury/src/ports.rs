//! Traits the strategies depend on.
//!
//! Amounts are always integers in the token's smallest unit.

use std::sync::Arc;

use alloy::primitives::U256;
use anyhow::Result;
use async_trait::async_trait;
use clients_sunswap::PriceQuote;
use clients_telegrambot::LinkButton;
use clients_tron::{TronAddress, TxId};

use crate::types::LiquidityParams;

/// Signing session of the managing wallet.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Address of the managing account.
    fn address(&self) -> TronAddress;

    /// TRX balance of any account, in sun.
    async fn native_balance(&self, account: &TronAddress) -> Result<U256>;

    /// TRC-20 balance of `owner`.
    async fn token_balance(&self, token: &TronAddress, owner: &TronAddress) -> Result<U256>;

    /// Calls `withdrawLiquidity(amount)` on the token contract.
    async fn withdraw_liquidity(&self, contract: &TronAddress, amount: U256) -> Result<TxId>;

    /// Sends TRX from the managing account.
    async fn transfer(&self, to: &TronAddress, amount: U256) -> Result<TxId>;

    /// Wraps `amount` sun of TRX through `deposit()` on the wrapped token.
    async fn wrap(&self, wrapped_token: &TronAddress, amount: U256) -> Result<TxId>;

    /// Sets the allowance of `spender` on `token`.
    async fn approve(&self, token: &TronAddress, spender: &TronAddress, amount: U256)
        -> Result<TxId>;

    /// Calls `increaseLiquidity` on the position manager.
    async fn increase_liquidity(
        &self,
        position_manager: &TronAddress,
        params: &LiquidityParams,
    ) -> Result<TxId>;
}

/// Source of swap quotes.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Quotes `amount_in` of `from` into `to`; `amount_out` is expressed with `out_decimals`.
    async fn quote(
        &self,
        from: &TronAddress,
        to: &TronAddress,
        amount_in: U256,
        out_decimals: u32,
    ) -> Result<PriceQuote>;
}

/// A chat report: Markdown text and optional link buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub buttons: Vec<LinkButton>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<LinkButton>) -> Self {
        self.buttons = buttons;
        self
    }
}

/// One-way chat channel. Delivery failures stay inside the implementation.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn notify(&self, message: &ChatMessage);
}

/// One-way webhook sink. Delivery failures stay inside the implementation.
#[async_trait]
pub trait WebhookNotifier: Send + Sync {
    async fn notify(&self, payload: &serde_json::Value);
}

/// Both notification channels, shared by the strategies.
#[derive(Clone)]
pub struct Notifiers {
    pub chat: Arc<dyn ChatNotifier>,
    pub webhook: Arc<dyn WebhookNotifier>,
}
