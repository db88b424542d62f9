use alloy::primitives::U256;
use chrono::{DateTime, SecondsFormat, Utc};
use clients_tron::{TronAddress, TxId};
use rust_decimal::Decimal;
use serde::Serialize;
use utils::{format_units, TRX_DECIMALS};

/// Arguments of `increaseLiquidity`, in smallest units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityParams {
    pub position_id: U256,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    /// Unix seconds
    pub deadline: u64,
}

/// Everything that happened during a successful withdrawal.
#[derive(Debug, Clone)]
pub struct WithdrawReceipt {
    pub timestamp: DateTime<Utc>,
    /// Contract balance before the withdrawal, in sun
    pub balance_before: U256,
    pub withdrawal_tx: TxId,
    pub expense_tx: TxId,
    /// Amount sent to the expense wallet, in sun
    pub expense_amount: U256,
    /// Display-only energy label
    pub energy_used: &'static str,
    /// Display-only bandwidth label
    pub bandwidth_used: &'static str,
    pub managing_wallet: TronAddress,
}

impl WithdrawReceipt {
    pub fn tx_info(&self) -> TxInfo {
        TxInfo {
            timestamp: iso_timestamp(&self.timestamp),
            balance_before: format_units(self.balance_before, TRX_DECIMALS, 2),
            withdrawal_tx: self.withdrawal_tx,
            expense_tx: self.expense_tx,
            expense_amount_trx: format_units(self.expense_amount, TRX_DECIMALS, 2),
            energy_used: self.energy_used.to_string(),
            bandwidth_used: self.bandwidth_used.to_string(),
        }
    }
}

/// Result of one withdrawal run.
#[derive(Debug, Clone)]
pub enum WithdrawOutcome {
    /// Balance at or below the threshold; nothing was sent on chain.
    Insufficient { balance: U256 },
    Withdrawn(WithdrawReceipt),
}

/// Everything that happened during a successful liquidity addition.
#[derive(Debug, Clone)]
pub struct LiquidityReceipt {
    pub tx_hash: TxId,
    /// Managing wallet TRX balance before the addition, in sun
    pub wallet_balance: U256,
    /// TRX contribution, human units
    pub contribution: Decimal,
    /// WTRX desired, in sun
    pub amount0: U256,
    /// Paired token desired, in smallest units
    pub amount1: U256,
    /// TRX per paired token; the contribution itself when the quote returned zero
    pub trx_per_token: Decimal,
    /// USD per paired token, already rounded for display
    pub usd_price: String,
    pub position_id: u64,
    pub timestamp: DateTime<Utc>,
}

/// Result of one liquidity-addition run. The flow never fails with `Err`.
#[derive(Debug, Clone)]
pub enum LiquidityOutcome {
    Added(LiquidityReceipt),
    /// Precondition not met; nothing was sent on chain.
    Declined { reason: String, balance: U256 },
    /// An external call failed part way through.
    Failed { error: String },
}

/// Withdrawal details reported to the HTTP caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInfo {
    pub timestamp: String,
    pub balance_before: String,
    pub withdrawal_tx: TxId,
    pub expense_tx: TxId,
    #[serde(rename = "expenseAmountTRX")]
    pub expense_amount_trx: String,
    pub energy_used: String,
    pub bandwidth_used: String,
}

/// JSON body returned by the write endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_info: Option<TxInfo>,
}

impl FlowResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

impl From<&WithdrawOutcome> for FlowResult {
    fn from(outcome: &WithdrawOutcome) -> Self {
        match outcome {
            WithdrawOutcome::Insufficient { balance } => Self {
                message: Some(format!(
                    "Balance too low: {} TRX. Withdrawal postponed until tomorrow.",
                    format_units(*balance, TRX_DECIMALS, 2)
                )),
                ..Self::default()
            },
            WithdrawOutcome::Withdrawn(receipt) => Self {
                success: true,
                message: Some("Liquidity withdrawn successfully!".to_string()),
                tx_info: Some(receipt.tx_info()),
                ..Self::default()
            },
        }
    }
}

impl From<&LiquidityOutcome> for FlowResult {
    fn from(outcome: &LiquidityOutcome) -> Self {
        match outcome {
            LiquidityOutcome::Added(receipt) => Self {
                success: true,
                tx_hash: Some(receipt.tx_hash),
                ..Self::default()
            },
            LiquidityOutcome::Declined { reason, .. } => Self::failure(reason.clone()),
            LiquidityOutcome::Failed { error } => Self::failure(error.clone()),
        }
    }
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-05-01T23:00:00.000Z`.
pub(crate) fn iso_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
