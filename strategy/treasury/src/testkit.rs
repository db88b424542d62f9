//! In-memory doubles for the strategy ports.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use clients_sunswap::PriceQuote;
use clients_tron::{TronAddress, TxId};

use crate::ports::{ChatMessage, ChatNotifier, PriceOracle, Wallet, WebhookNotifier};
use crate::types::LiquidityParams;

/// Deterministic test address built from one repeated byte.
pub fn address(n: u8) -> TronAddress {
    TronAddress::from_evm(Address::repeat_byte(n))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Wallet operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    NativeBalance,
    TokenBalance,
    WithdrawLiquidity,
    Transfer,
    Wrap,
    Approve,
    IncreaseLiquidity,
}

/// A state-changing call that reached the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCall {
    WithdrawLiquidity {
        contract: TronAddress,
        amount: U256,
    },
    Transfer {
        to: TronAddress,
        amount: U256,
    },
    Wrap {
        token: TronAddress,
        amount: U256,
    },
    Approve {
        token: TronAddress,
        spender: TronAddress,
        amount: U256,
    },
    IncreaseLiquidity {
        position_manager: TronAddress,
        params: LiquidityParams,
    },
}

/// Wallet with fixed balances that records every write.
///
/// The n-th successful write returns [`MockWallet::tx_id`]`(n)`. Failing
/// writes are not recorded.
pub struct MockWallet {
    address: TronAddress,
    native: HashMap<TronAddress, U256>,
    tokens: HashMap<(TronAddress, TronAddress), U256>,
    failing: HashSet<Operation>,
    latency: HashMap<Operation, Duration>,
    calls: Mutex<Vec<WalletCall>>,
}

impl MockWallet {
    pub fn new(address: TronAddress) -> Self {
        Self {
            address,
            native: HashMap::new(),
            tokens: HashMap::new(),
            failing: HashSet::new(),
            latency: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_native_balance(mut self, account: TronAddress, amount: U256) -> Self {
        self.native.insert(account, amount);
        self
    }

    pub fn with_token_balance(
        mut self,
        token: TronAddress,
        owner: TronAddress,
        amount: U256,
    ) -> Self {
        self.tokens.insert((token, owner), amount);
        self
    }

    pub fn failing_on(mut self, operation: Operation) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Delays every `operation` call by `delay` before it lands.
    pub fn with_latency(mut self, operation: Operation, delay: Duration) -> Self {
        self.latency.insert(operation, delay);
        self
    }

    /// Transaction id returned for the n-th write, counting from 1.
    pub fn tx_id(n: u8) -> TxId {
        TxId(B256::with_last_byte(n))
    }

    pub fn calls(&self) -> Vec<WalletCall> {
        lock(&self.calls).clone()
    }

    fn check(&self, operation: Operation) -> Result<()> {
        if self.failing.contains(&operation) {
            bail!("{operation:?} rejected: REVERT opcode executed");
        }
        Ok(())
    }

    async fn record(&self, operation: Operation, call: WalletCall) -> Result<TxId> {
        if let Some(delay) = self.latency.get(&operation) {
            tokio::time::sleep(*delay).await;
        }
        self.check(operation)?;
        let mut calls = lock(&self.calls);
        calls.push(call);
        Ok(Self::tx_id(calls.len() as u8))
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn address(&self) -> TronAddress {
        self.address
    }

    async fn native_balance(&self, account: &TronAddress) -> Result<U256> {
        self.check(Operation::NativeBalance)?;
        Ok(self.native.get(account).copied().unwrap_or_default())
    }

    async fn token_balance(&self, token: &TronAddress, owner: &TronAddress) -> Result<U256> {
        self.check(Operation::TokenBalance)?;
        Ok(self.tokens.get(&(*token, *owner)).copied().unwrap_or_default())
    }

    async fn withdraw_liquidity(&self, contract: &TronAddress, amount: U256) -> Result<TxId> {
        self.record(
            Operation::WithdrawLiquidity,
            WalletCall::WithdrawLiquidity {
                contract: *contract,
                amount,
            },
        )
        .await
    }

    async fn transfer(&self, to: &TronAddress, amount: U256) -> Result<TxId> {
        self.record(Operation::Transfer, WalletCall::Transfer { to: *to, amount })
            .await
    }

    async fn wrap(&self, wrapped_token: &TronAddress, amount: U256) -> Result<TxId> {
        self.record(
            Operation::Wrap,
            WalletCall::Wrap {
                token: *wrapped_token,
                amount,
            },
        )
        .await
    }

    async fn approve(
        &self,
        token: &TronAddress,
        spender: &TronAddress,
        amount: U256,
    ) -> Result<TxId> {
        self.record(
            Operation::Approve,
            WalletCall::Approve {
                token: *token,
                spender: *spender,
                amount,
            },
        )
        .await
    }

    async fn increase_liquidity(
        &self,
        position_manager: &TronAddress,
        params: &LiquidityParams,
    ) -> Result<TxId> {
        self.record(
            Operation::IncreaseLiquidity,
            WalletCall::IncreaseLiquidity {
                position_manager: *position_manager,
                params: params.clone(),
            },
        )
        .await
    }
}

/// Oracle answering every request with the same quote or error.
pub struct StaticOracle {
    quote: std::result::Result<PriceQuote, String>,
    requests: Mutex<Vec<(TronAddress, TronAddress, U256)>>,
}

impl StaticOracle {
    pub fn new(quote: PriceQuote) -> Self {
        Self {
            quote: Ok(quote),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            quote: Err(error.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `(from, to, amount_in)` of every request so far.
    pub fn requests(&self) -> Vec<(TronAddress, TronAddress, U256)> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl PriceOracle for StaticOracle {
    async fn quote(
        &self,
        from: &TronAddress,
        to: &TronAddress,
        amount_in: U256,
        _out_decimals: u32,
    ) -> Result<PriceQuote> {
        lock(&self.requests).push((*from, *to, amount_in));
        self.quote.clone().map_err(|e| anyhow!(e))
    }
}

#[derive(Default)]
pub struct RecordingChat {
    messages: Mutex<Vec<ChatMessage>>,
}

impl RecordingChat {
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.messages).clone()
    }
}

#[async_trait]
impl ChatNotifier for RecordingChat {
    async fn notify(&self, message: &ChatMessage) {
        lock(&self.messages).push(message.clone());
    }
}

#[derive(Default)]
pub struct RecordingWebhook {
    payloads: Mutex<Vec<serde_json::Value>>,
}

impl RecordingWebhook {
    pub fn payloads(&self) -> Vec<serde_json::Value> {
        lock(&self.payloads).clone()
    }
}

#[async_trait]
impl WebhookNotifier for RecordingWebhook {
    async fn notify(&self, payload: &serde_json::Value) {
        lock(&self.payloads).push(payload.clone());
    }
}
