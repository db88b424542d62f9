use std::sync::Arc;

use alloy::primitives::U256;
use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, error, info};
use utils::{format_decimal, format_units, to_decimal, to_smallest_units, TRX_DECIMALS};

use crate::config::{LiquidityStrategyConfig, ReportConfig};
use crate::ports::{Notifiers, PriceOracle, Wallet};
use crate::report;
use crate::types::{LiquidityOutcome, LiquidityParams, LiquidityReceipt};

/// Wallets holding less than 10 TRX (in sun) skip the run.
pub const MIN_WALLET_BALANCE: u64 = 10_000_000;

/// Share of the wallet balance contributed per run.
pub const CONTRIBUTION_RATE: Decimal = dec!(0.0211);

/// Lower bound of a contribution, in TRX.
pub const MIN_CONTRIBUTION_TRX: Decimal = dec!(50);

/// Validity window of the `increaseLiquidity` call.
pub const DEADLINE_SECS: u64 = 600;

const PAIRED_TOKEN_DECIMALS: u32 = 6;

/// TRX to contribute for a wallet holding `balance_trx`.
pub fn contribution_trx(balance_trx: Decimal) -> Decimal {
    (balance_trx * CONTRIBUTION_RATE).max(MIN_CONTRIBUTION_TRX)
}

/// Amount of TRX to wrap so the wrapped balance covers `contribution`, if any.
pub fn wrap_deficit(contribution: U256, wrapped_balance: U256) -> Option<U256> {
    (contribution > wrapped_balance).then(|| contribution - wrapped_balance)
}

/// `desired * 0.000001`, rounded half up.
///
/// NOTE: the factor matches the deployed behaviour and accepts almost any
/// price movement. It is not a 1% slippage bound.
pub fn slippage_minimum(desired: U256) -> U256 {
    let scale = U256::from(1_000_000u64);
    desired.saturating_add(scale / U256::from(2u64)) / scale
}

/// Daily top-up of the WTRX / paired-token liquidity position.
pub struct LiquidityStrategy {
    config: LiquidityStrategyConfig,
    wallet: Arc<dyn Wallet>,
    oracle: Arc<dyn PriceOracle>,
    notifiers: Notifiers,
    report: ReportConfig,
}

impl LiquidityStrategy {
    /// Creates a new liquidity strategy.
    ///
    /// # Arguments
    /// * `config` - Token addresses, position manager and position id
    /// * `wallet` - Managing wallet that wraps, approves and adds liquidity
    /// * `oracle` - Quote source used to size the paired-token amount
    /// * `notifiers` - Chat and webhook channels for the run report
    /// * `report` - Labels and links used in the report
    pub fn new(
        config: LiquidityStrategyConfig,
        wallet: Arc<dyn Wallet>,
        oracle: Arc<dyn PriceOracle>,
        notifiers: Notifiers,
        report: ReportConfig,
    ) -> Self {
        Self {
            config,
            wallet,
            oracle,
            notifiers,
            report,
        }
    }

    /// Runs one liquidity addition.
    ///
    /// Failures of any external call are reported to the chat channel and
    /// returned as [`LiquidityOutcome::Failed`].
    pub async fn execute(&self) -> LiquidityOutcome {
        match self.try_execute().await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = format!("{e:#}");
                error!(error = %reason, "liquidity addition failed");
                self.notifiers
                    .chat
                    .notify(&report::liquidity_failure(&reason))
                    .await;
                LiquidityOutcome::Failed { error: reason }
            }
        }
    }

    async fn try_execute(&self) -> Result<LiquidityOutcome> {
        let me = self.wallet.address();
        info!(wallet = %me, "managing wallet");

        let balance = self
            .wallet
            .native_balance(&me)
            .await
            .context("failed to read wallet balance")?;
        info!(balance = %format_units(balance, TRX_DECIMALS, 6), "wallet TRX balance");

        if balance < U256::from(MIN_WALLET_BALANCE) {
            info!("not enough TRX to add liquidity");
            self.notifiers
                .chat
                .notify(&report::liquidity_low_balance(balance))
                .await;
            return Ok(LiquidityOutcome::Declined {
                reason: "Insufficient TRX".to_string(),
                balance,
            });
        }

        let balance_trx = to_decimal(balance, TRX_DECIMALS).context("wallet balance out of range")?;
        let contribution = contribution_trx(balance_trx);
        let amount0 = to_smallest_units(contribution, TRX_DECIMALS)
            .context("contribution out of range")?;
        info!(
            contribution = %format_decimal(contribution, 6),
            sun = %amount0,
            "amount0 desired"
        );

        let wrapped = &self.config.wrapped_token;
        let wrapped_balance = self
            .wallet
            .token_balance(wrapped, &me)
            .await
            .context("failed to read WTRX balance")?;
        if let Some(deficit) = wrap_deficit(amount0, wrapped_balance) {
            info!(deficit = %deficit, "wrapping TRX deficit");
            self.wallet
                .wrap(wrapped, deficit)
                .await
                .context("WTRX deposit failed")?;
        }

        let paired = &self.config.paired_token;
        let quote = self
            .oracle
            .quote(wrapped, paired, amount0, PAIRED_TOKEN_DECIMALS)
            .await?;
        let amount1 = quote.amount_out;
        let usd_price = quote.usd_price_display();
        info!(
            amount1 = %format_units(amount1, PAIRED_TOKEN_DECIMALS, 6),
            usd_price = %usd_price,
            "amount1 desired"
        );

        let manager = &self.config.position_manager;
        self.wallet
            .approve(wrapped, manager, U256::MAX)
            .await
            .context("WTRX approval failed")?;
        self.wallet
            .approve(paired, manager, U256::MAX)
            .await
            .context("paired token approval failed")?;

        let now = Utc::now();
        let deadline = u64::try_from(now.timestamp()).context("system clock before epoch")?
            + DEADLINE_SECS;
        let params = LiquidityParams {
            position_id: U256::from(self.config.position_id),
            amount0_desired: amount0,
            amount1_desired: amount1,
            amount0_min: slippage_minimum(amount0),
            amount1_min: slippage_minimum(amount1),
            deadline,
        };
        debug!(?params, "increaseLiquidity params");

        let tx_hash = self
            .wallet
            .increase_liquidity(manager, &params)
            .await
            .context("increaseLiquidity call failed")?;
        info!(tx = %tx_hash, "liquidity added");

        // A zero quote divides by one.
        let trx_per_token = match to_decimal(amount1, PAIRED_TOKEN_DECIMALS) {
            Some(paired_amount) if paired_amount.is_zero() => contribution,
            Some(paired_amount) => contribution.checked_div(paired_amount).unwrap_or_default(),
            None => Decimal::ZERO,
        };
        let receipt = LiquidityReceipt {
            tx_hash,
            wallet_balance: balance,
            contribution,
            amount0,
            amount1,
            trx_per_token,
            usd_price,
            position_id: self.config.position_id,
            timestamp: now,
        };
        let (chat, payload) =
            report::liquidity_success(&receipt, PAIRED_TOKEN_DECIMALS, &self.report);
        self.notifiers.chat.notify(&chat).await;
        self.notifiers.webhook.notify(&payload).await;

        Ok(LiquidityOutcome::Added(receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{
        address, MockWallet, Operation, RecordingChat, RecordingWebhook, StaticOracle, WalletCall,
    };
    use clients_sunswap::PriceQuote;

    const MANAGER: u8 = 1;
    const WTRX: u8 = 2;
    const QSI: u8 = 3;
    const POSITION_MANAGER: u8 = 4;

    struct Harness {
        strategy: LiquidityStrategy,
        wallet: Arc<MockWallet>,
        oracle: Arc<StaticOracle>,
        chat: Arc<RecordingChat>,
        webhook: Arc<RecordingWebhook>,
    }

    fn harness(wallet: MockWallet, oracle: StaticOracle) -> Harness {
        let wallet = Arc::new(wallet);
        let oracle = Arc::new(oracle);
        let chat = Arc::new(RecordingChat::default());
        let webhook = Arc::new(RecordingWebhook::default());
        let config = LiquidityStrategyConfig {
            wrapped_token: address(WTRX),
            paired_token: address(QSI),
            position_manager: address(POSITION_MANAGER),
            position_id: 765,
        };
        let strategy = LiquidityStrategy::new(
            config,
            wallet.clone(),
            oracle.clone(),
            Notifiers {
                chat: chat.clone(),
                webhook: webhook.clone(),
            },
            ReportConfig::default(),
        );
        Harness {
            strategy,
            wallet,
            oracle,
            chat,
            webhook,
        }
    }

    fn quote(amount_out: u64, usd_price: Option<Decimal>) -> StaticOracle {
        StaticOracle::new(PriceQuote {
            amount_out: U256::from(amount_out),
            usd_price,
        })
    }

    fn wallet(trx_sun: u64, wtrx_sun: u64) -> MockWallet {
        MockWallet::new(address(MANAGER))
            .with_native_balance(address(MANAGER), U256::from(trx_sun))
            .with_token_balance(address(WTRX), address(MANAGER), U256::from(wtrx_sun))
    }

    #[test]
    fn contribution_has_a_floor() {
        assert_eq!(contribution_trx(dec!(1000)), dec!(50));
        assert_eq!(contribution_trx(dec!(10)), dec!(50));
        assert_eq!(contribution_trx(dec!(10000)), dec!(211));
        assert_eq!(contribution_trx(dec!(2500.5)), dec!(52.76055));
    }

    #[test]
    fn deficit_covers_only_the_gap() {
        let contribution = U256::from(50_000_000u64);
        assert_eq!(
            wrap_deficit(contribution, U256::from(20_000_000u64)),
            Some(U256::from(30_000_000u64))
        );
        assert_eq!(wrap_deficit(contribution, contribution), None);
        assert_eq!(wrap_deficit(contribution, U256::from(60_000_000u64)), None);
    }

    #[test]
    fn minimum_is_desired_times_one_millionth_rounded_half_up() {
        assert_eq!(slippage_minimum(U256::from(50_000_000u64)), U256::from(50u64));
        assert_eq!(slippage_minimum(U256::from(45_499_999u64)), U256::from(45u64));
        assert_eq!(slippage_minimum(U256::from(45_500_000u64)), U256::from(46u64));
        assert_eq!(slippage_minimum(U256::from(499_999u64)), U256::ZERO);
        assert_eq!(slippage_minimum(U256::ZERO), U256::ZERO);
    }

    #[tokio::test]
    async fn low_balance_declines_without_writes() {
        let h = harness(wallet(9_999_999, 0), quote(45_000_000, None));

        let outcome = h.strategy.execute().await;

        assert!(matches!(
            outcome,
            LiquidityOutcome::Declined { ref reason, .. } if reason == "Insufficient TRX"
        ));
        assert!(h.wallet.calls().is_empty());
        assert!(h.oracle.requests().is_empty());
        assert_eq!(h.chat.messages().len(), 1);
        assert!(h.chat.messages()[0].text.contains("too low: 10.00 TRX"));
        assert!(h.webhook.payloads().is_empty());
    }

    #[tokio::test]
    async fn adds_liquidity_with_floor_contribution() {
        let h = harness(
            wallet(1_000_000_000, 20_000_000),
            quote(45_000_000, Some(dec!(0.2))),
        );

        let outcome = h.strategy.execute().await;

        let LiquidityOutcome::Added(receipt) = outcome else {
            panic!("expected liquidity to be added");
        };
        let calls = h.wallet.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls[0],
            WalletCall::Wrap {
                token: address(WTRX),
                amount: U256::from(30_000_000u64),
            }
        );
        assert_eq!(
            calls[1],
            WalletCall::Approve {
                token: address(WTRX),
                spender: address(POSITION_MANAGER),
                amount: U256::MAX,
            }
        );
        assert_eq!(
            calls[2],
            WalletCall::Approve {
                token: address(QSI),
                spender: address(POSITION_MANAGER),
                amount: U256::MAX,
            }
        );
        let WalletCall::IncreaseLiquidity {
            position_manager,
            params,
        } = &calls[3]
        else {
            panic!("expected increaseLiquidity last");
        };
        assert_eq!(*position_manager, address(POSITION_MANAGER));
        assert_eq!(params.position_id, U256::from(765u64));
        assert_eq!(params.amount0_desired, U256::from(50_000_000u64));
        assert_eq!(params.amount1_desired, U256::from(45_000_000u64));
        assert_eq!(params.amount0_min, U256::from(50u64));
        assert_eq!(params.amount1_min, U256::from(45u64));
        let now = Utc::now().timestamp() as u64;
        assert!(params.deadline > now && params.deadline <= now + DEADLINE_SECS);

        assert_eq!(
            h.oracle.requests(),
            vec![(address(WTRX), address(QSI), U256::from(50_000_000u64))]
        );
        assert_eq!(receipt.tx_hash, MockWallet::tx_id(4));
        assert_eq!(receipt.usd_price, "0.20");
        assert_eq!(receipt.contribution, dec!(50));

        let chat = h.chat.messages();
        assert_eq!(chat.len(), 1);
        assert!(chat[0].text.contains("💲 1 QSI = 0.20 USD"));
        assert!(chat[0].text.contains("💵 1 QSI = 1.11 TRX"));
        let payloads = h.webhook.payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["success"], true);
        assert_eq!(payloads[0]["tokenId"], 765);
        assert_eq!(payloads[0]["txHash"], receipt.tx_hash.to_string());
    }

    #[tokio::test]
    async fn enough_wrapped_balance_skips_deposit() {
        let h = harness(
            wallet(10_000_000_000, 211_000_000),
            quote(100_000_000, Some(dec!(0.5))),
        );

        let LiquidityOutcome::Added(receipt) = h.strategy.execute().await else {
            panic!("expected liquidity to be added");
        };

        assert_eq!(receipt.amount0, U256::from(211_000_000u64));
        assert!(!h
            .wallet
            .calls()
            .iter()
            .any(|call| matches!(call, WalletCall::Wrap { .. })));
    }

    #[tokio::test]
    async fn zero_quote_still_adds_at_contribution_ratio() {
        let h = harness(wallet(100_000_000, 50_000_000), quote(0, None));

        let LiquidityOutcome::Added(receipt) = h.strategy.execute().await else {
            panic!("expected liquidity to be added");
        };

        assert_eq!(receipt.amount1, U256::ZERO);
        assert_eq!(receipt.trx_per_token, dec!(50));
        assert_eq!(receipt.usd_price, "0.00");
        assert!(h.chat.messages()[0].text.contains("💵 1 QSI = 50.00 TRX"));
    }

    #[tokio::test]
    async fn oracle_failure_becomes_failed_outcome() {
        let h = harness(
            wallet(1_000_000_000, 50_000_000),
            StaticOracle::failing("no route: code 1"),
        );

        let outcome = h.strategy.execute().await;

        let LiquidityOutcome::Failed { error } = outcome else {
            panic!("expected a failed outcome");
        };
        assert!(error.contains("no route"));
        assert!(h
            .wallet
            .calls()
            .iter()
            .all(|call| !matches!(call, WalletCall::IncreaseLiquidity { .. })));
        let chat = h.chat.messages();
        assert_eq!(chat.len(), 1);
        assert!(chat[0].text.contains("❌ Operation failed. Reason:"));
        assert!(h.webhook.payloads().is_empty());
    }

    #[tokio::test]
    async fn contract_revert_becomes_failed_outcome() {
        let h = harness(
            wallet(1_000_000_000, 50_000_000).failing_on(Operation::IncreaseLiquidity),
            quote(45_000_000, Some(dec!(0.2))),
        );

        let outcome = h.strategy.execute().await;

        assert!(matches!(
            outcome,
            LiquidityOutcome::Failed { ref error }
                if error.contains("increaseLiquidity call failed")
        ));
    }
}
