//! Treasury automation strategies.
//!
//! Two flows run against a TRON managing wallet: withdrawing the TRX a token
//! contract accumulates, and feeding part of the wallet back into a liquidity
//! position. Chain access, price quotes and notifications sit behind the traits
//! in [`ports`] so the flows can run against real clients or test doubles.

mod adapters;
pub mod config;
mod liquidity;
pub mod ports;
mod report;
mod types;
mod withdraw;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use adapters::NullWebhook;
pub use config::{LiquidityStrategyConfig, ReportConfig, WithdrawStrategyConfig};
pub use liquidity::{
    contribution_trx, slippage_minimum, wrap_deficit, LiquidityStrategy, CONTRIBUTION_RATE,
    DEADLINE_SECS, MIN_CONTRIBUTION_TRX, MIN_WALLET_BALANCE,
};
pub use ports::{ChatMessage, ChatNotifier, Notifiers, PriceOracle, Wallet, WebhookNotifier};
pub use types::{
    FlowResult, LiquidityOutcome, LiquidityParams, LiquidityReceipt, TxInfo, WithdrawOutcome,
    WithdrawReceipt,
};
pub use withdraw::{expense_amount, WithdrawStrategy, EXPENSE_PERCENT, MIN_WITHDRAW_BALANCE};
