//! Operator-facing chat messages and webhook payloads.

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use clients_telegrambot::LinkButton;
use clients_tron::TxId;
use serde_json::{json, Value};
use utils::{format_decimal, format_units, TRX_DECIMALS};

use crate::config::ReportConfig;
use crate::ports::ChatMessage;
use crate::types::{iso_timestamp, LiquidityReceipt, WithdrawReceipt};

const WITHDRAW_THRESHOLD_LABEL: &str = "500.00";

fn withdraw_title(report: &ReportConfig) -> String {
    format!(
        "Liquidity Withdrawal Report - Daily automatic withdrawal from {} contract balance",
        report.token_symbol
    )
}

fn static_buttons(report: &ReportConfig) -> Vec<LinkButton> {
    vec![
        LinkButton::new(
            format!("💰 Buy {} Directly", report.token_symbol),
            report.buy_url.as_str(),
        ),
        LinkButton::new(
            format!("⏳ {} Lock & Unlock Timeline", report.token_symbol),
            report.timeline_url.as_str(),
        ),
    ]
}

pub(crate) fn withdraw_insufficient(
    balance: U256,
    timestamp: &DateTime<Utc>,
    report: &ReportConfig,
) -> (ChatMessage, Value) {
    let balance = format_units(balance, TRX_DECIMALS, 2);
    let notice = format!(
        "Insufficient balance for withdrawal ({WITHDRAW_THRESHOLD_LABEL} TRX required). \
         Withdrawal postponed until tomorrow."
    );
    let text = format!("💰 Contract Balance: {balance} TRX\n⚠️ *{notice}*");
    let payload = json!({
        "type": "withdrawal",
        "report": withdraw_title(report),
        "status": "insufficient",
        "timestamp": iso_timestamp(timestamp),
        "balanceBefore": balance,
        "message": notice,
    });
    (ChatMessage::new(text).with_buttons(static_buttons(report)), payload)
}

pub(crate) fn withdraw_success(
    receipt: &WithdrawReceipt,
    report: &ReportConfig,
) -> (ChatMessage, Value) {
    let info = receipt.tx_info();
    let text = format!(
        "🚀 {title}\n\n\
         💰 Contract Balance Before Withdrawal: {balance} TRX\n\
         💲 Withdrawn: {balance} TRX\n\
         🔋 Energy & Taxes: Energy: {energy} , Bandwidth: {bandwidth} \n\
         💸 Expense Transaction (5%): {expense} TRX\n\
         ⏰ Time: {time}",
        title = withdraw_title(report),
        balance = info.balance_before,
        energy = info.energy_used,
        bandwidth = info.bandwidth_used,
        expense = info.expense_amount_trx,
        time = info.timestamp,
    );

    let mut buttons = static_buttons(report);
    buttons.extend([
        LinkButton::new("Withdrawal TX", report.transaction_url(receipt.withdrawal_tx)),
        LinkButton::new("Expense TX (5%)", report.transaction_url(receipt.expense_tx)),
        LinkButton::new("Managing Wallet", report.address_url(&receipt.managing_wallet)),
    ]);

    let payload = json!({
        "type": "withdrawal",
        "report": withdraw_title(report),
        "status": "success",
        "timestamp": info.timestamp,
        "balanceBefore": info.balance_before,
        "withdrawalTx": info.withdrawal_tx,
        "expenseTx": info.expense_tx,
        "expenseAmountTRX": info.expense_amount_trx,
        "energyUsed": info.energy_used,
        "bandwidthUsed": info.bandwidth_used,
        "managingWallet": receipt.managing_wallet,
    });
    (ChatMessage::new(text).with_buttons(buttons), payload)
}

/// Alert for a withdrawal whose expense transfer did not go through.
pub(crate) fn withdraw_partial_failure(
    balance: U256,
    withdrawal_tx: TxId,
    error: &str,
    report: &ReportConfig,
) -> ChatMessage {
    let text = format!(
        "🚀 {title}\n\n\
         💲 Withdrawn: {balance} TRX\n\
         ❌ Expense transfer failed. Reason: {error}\n\
         Manual expense transfer required.",
        title = withdraw_title(report),
        balance = format_units(balance, TRX_DECIMALS, 2),
    );
    ChatMessage::new(text).with_buttons(vec![LinkButton::new(
        "Withdrawal TX",
        report.transaction_url(withdrawal_tx),
    )])
}

const LIQUIDITY_TITLE: &str = "🚀 Liquidity Addition Report - Daily automatic Liquidity Addition";

pub(crate) fn liquidity_low_balance(balance: U256) -> ChatMessage {
    ChatMessage::new(format!(
        "{LIQUIDITY_TITLE}\n\n\
         💰 Managing wallet balance is too low: {} TRX\n\
         ⚠️ Not enough TRX to add liquidity. We will try again tomorrow.",
        format_units(balance, TRX_DECIMALS, 2)
    ))
}

pub(crate) fn liquidity_success(
    receipt: &LiquidityReceipt,
    paired_decimals: u32,
    report: &ReportConfig,
) -> (ChatMessage, Value) {
    let symbol = &report.token_symbol;
    let amount1 = format_units(receipt.amount1, paired_decimals, 2);
    let ratio = format_decimal(receipt.trx_per_token, 2);
    let time = iso_timestamp(&receipt.timestamp);

    let text = format!(
        "{LIQUIDITY_TITLE}\n\n\
         💰 Managing wallet balance: {balance} TRX\n\
         📥 Added to the pool: +{contribution} TRX & +{amount1} {symbol}\n\
         💵 1 {symbol} = {ratio} TRX\n\
         💲 1 {symbol} = {usd} USD\n\
         ⏰ Time: {time}",
        balance = format_units(receipt.wallet_balance, TRX_DECIMALS, 2),
        contribution = format_decimal(receipt.contribution, 2),
        usd = receipt.usd_price,
    );

    let mut buttons = static_buttons(report);
    buttons.extend([
        LinkButton::new("🌐 GeckoTerminal", report.gecko_terminal_url()),
        LinkButton::new("☀️ Sun.io Liquidity Pool", report.sun_io_url()),
        LinkButton::new("🔎 CoinMarketCap DexScan", report.coin_market_cap_url()),
        LinkButton::new("🔗 View TX", report.transaction_url(receipt.tx_hash)),
    ]);

    let payload = json!({
        "success": true,
        "tokenId": receipt.position_id,
        "amount0": format_decimal(receipt.contribution, 6),
        "amount1": format_units(receipt.amount1, paired_decimals, 6),
        "txHash": receipt.tx_hash,
        "time": time,
    });
    (ChatMessage::new(text).with_buttons(buttons), payload)
}

pub(crate) fn liquidity_failure(error: &str) -> ChatMessage {
    ChatMessage::new(format!(
        "{LIQUIDITY_TITLE}\n\n\
         ❌ Operation failed. Reason: {error}\n\
         We will try again tomorrow."
    ))
}
