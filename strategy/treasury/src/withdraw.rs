use std::sync::Arc;

use alloy::primitives::U256;
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info};
use utils::{format_units, TRX_DECIMALS};

use crate::config::{ReportConfig, WithdrawStrategyConfig};
use crate::ports::{Notifiers, Wallet};
use crate::report;
use crate::types::{WithdrawOutcome, WithdrawReceipt};

/// Contract balances at or below this amount (500 TRX, in sun) are left in place.
pub const MIN_WITHDRAW_BALANCE: u64 = 500_000_000;

/// Share of every withdrawal forwarded to the expense wallet.
pub const EXPENSE_PERCENT: u64 = 5;

const ENERGY_LABEL: &str = "7,361";
const BANDWIDTH_LABEL: &str = "313";

/// `floor(balance * EXPENSE_PERCENT / 100)` without intermediate overflow.
pub fn expense_amount(balance: U256) -> U256 {
    let hundred = U256::from(100u64);
    let percent = U256::from(EXPENSE_PERCENT);
    let (whole, rest) = balance.div_rem(hundred);
    whole * percent + rest * percent / hundred
}

/// Daily withdrawal of the TRX accumulated in the token contract.
pub struct WithdrawStrategy {
    config: WithdrawStrategyConfig,
    wallet: Arc<dyn Wallet>,
    notifiers: Notifiers,
    report: ReportConfig,
}

impl WithdrawStrategy {
    /// Creates a new withdrawal strategy.
    ///
    /// # Arguments
    /// * `config` - Token contract and expense wallet
    /// * `wallet` - Managing wallet that signs the withdrawal and the expense transfer
    /// * `notifiers` - Chat and webhook channels for the run report
    /// * `report` - Labels and links used in the report
    pub fn new(
        config: WithdrawStrategyConfig,
        wallet: Arc<dyn Wallet>,
        notifiers: Notifiers,
        report: ReportConfig,
    ) -> Self {
        Self {
            config,
            wallet,
            notifiers,
            report,
        }
    }

    /// Runs one withdrawal.
    ///
    /// # Returns
    /// `Insufficient` when the contract holds at most [`MIN_WITHDRAW_BALANCE`],
    /// otherwise `Withdrawn` with both transaction ids. Chain failures are
    /// returned as errors; a withdrawal already sent is not rolled back.
    pub async fn execute(&self) -> Result<WithdrawOutcome> {
        let contract = &self.config.token_contract;
        let balance = self
            .wallet
            .native_balance(contract)
            .await
            .context("failed to read contract balance")?;
        let timestamp = Utc::now();
        info!(
            contract = %contract,
            balance = %format_units(balance, TRX_DECIMALS, 2),
            "contract balance"
        );

        if balance <= U256::from(MIN_WITHDRAW_BALANCE) {
            info!(
                threshold = %format_units(U256::from(MIN_WITHDRAW_BALANCE), TRX_DECIMALS, 2),
                "balance below threshold, withdrawal postponed until tomorrow"
            );
            let (chat, payload) = report::withdraw_insufficient(balance, &timestamp, &self.report);
            self.notifiers.chat.notify(&chat).await;
            self.notifiers.webhook.notify(&payload).await;
            return Ok(WithdrawOutcome::Insufficient { balance });
        }

        let withdrawal_tx = self
            .wallet
            .withdraw_liquidity(contract, balance)
            .await
            .context("withdrawLiquidity call failed")?;
        info!(tx = %withdrawal_tx, "liquidity withdrawn");

        let expense = expense_amount(balance);
        let expense_tx = match self.wallet.transfer(&self.config.expense_wallet, expense).await {
            Ok(tx) => tx,
            Err(e) => {
                error!(
                    withdrawal_tx = %withdrawal_tx,
                    error = %format!("{e:#}"),
                    "expense transfer failed after withdrawal"
                );
                let alert = report::withdraw_partial_failure(
                    balance,
                    withdrawal_tx,
                    &format!("{e:#}"),
                    &self.report,
                );
                self.notifiers.chat.notify(&alert).await;
                return Err(e.context(format!(
                    "expense transfer failed after withdrawal {withdrawal_tx}"
                )));
            }
        };
        info!(
            tx = %expense_tx,
            amount = %format_units(expense, TRX_DECIMALS, 2),
            "expense transaction sent"
        );

        let receipt = WithdrawReceipt {
            timestamp,
            balance_before: balance,
            withdrawal_tx,
            expense_tx,
            expense_amount: expense,
            energy_used: ENERGY_LABEL,
            bandwidth_used: BANDWIDTH_LABEL,
            managing_wallet: self.wallet.address(),
        };
        let (chat, payload) = report::withdraw_success(&receipt, &self.report);
        self.notifiers.chat.notify(&chat).await;
        self.notifiers.webhook.notify(&payload).await;

        Ok(WithdrawOutcome::Withdrawn(receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{
        address, MockWallet, Operation, RecordingChat, RecordingWebhook, WalletCall,
    };

    const CONTRACT: u8 = 1;
    const EXPENSE: u8 = 2;
    const MANAGER: u8 = 3;

    fn strategy(
        wallet: Arc<MockWallet>,
    ) -> (WithdrawStrategy, Arc<RecordingChat>, Arc<RecordingWebhook>) {
        let chat = Arc::new(RecordingChat::default());
        let webhook = Arc::new(RecordingWebhook::default());
        let notifiers = Notifiers {
            chat: chat.clone(),
            webhook: webhook.clone(),
        };
        let config = WithdrawStrategyConfig {
            token_contract: address(CONTRACT),
            expense_wallet: address(EXPENSE),
        };
        let strategy = WithdrawStrategy::new(config, wallet, notifiers, ReportConfig::default());
        (strategy, chat, webhook)
    }

    fn wallet_with_contract_balance(sun: u64) -> Arc<MockWallet> {
        Arc::new(
            MockWallet::new(address(MANAGER))
                .with_native_balance(address(CONTRACT), U256::from(sun)),
        )
    }

    #[test]
    fn expense_is_floored_five_percent() {
        assert_eq!(expense_amount(U256::from(1_000_000_000u64)), U256::from(50_000_000u64));
        assert_eq!(expense_amount(U256::from(500_000_019u64)), U256::from(25_000_000u64));
        assert_eq!(expense_amount(U256::from(500_000_039u64)), U256::from(25_000_001u64));
        assert_eq!(expense_amount(U256::from(19u64)), U256::ZERO);
        assert_eq!(expense_amount(U256::MAX), U256::MAX / U256::from(20u64));
    }

    #[tokio::test]
    async fn balance_at_threshold_is_postponed_without_writes() {
        for sun in [0, 1_000_000, MIN_WITHDRAW_BALANCE] {
            let wallet = wallet_with_contract_balance(sun);
            let (strategy, chat, webhook) = strategy(wallet.clone());

            let outcome = strategy.execute().await.unwrap();

            assert!(matches!(
                outcome,
                WithdrawOutcome::Insufficient { balance } if balance == U256::from(sun)
            ));
            assert!(wallet.calls().is_empty());
            assert_eq!(chat.messages().len(), 1);
            assert_eq!(chat.messages()[0].buttons.len(), 2);
            let payloads = webhook.payloads();
            assert_eq!(payloads.len(), 1);
            assert_eq!(payloads[0]["status"], "insufficient");
        }
    }

    #[tokio::test]
    async fn withdraws_full_balance_and_sends_expense() {
        let balance = U256::from(1_234_567_891u64);
        let wallet = Arc::new(
            MockWallet::new(address(MANAGER)).with_native_balance(address(CONTRACT), balance),
        );
        let (strategy, chat, webhook) = strategy(wallet.clone());

        let outcome = strategy.execute().await.unwrap();

        let WithdrawOutcome::Withdrawn(receipt) = outcome else {
            panic!("expected a withdrawal");
        };
        assert_eq!(
            wallet.calls(),
            vec![
                WalletCall::WithdrawLiquidity {
                    contract: address(CONTRACT),
                    amount: balance,
                },
                WalletCall::Transfer {
                    to: address(EXPENSE),
                    amount: U256::from(61_728_394u64),
                },
            ]
        );
        assert_eq!(receipt.balance_before, balance);
        assert_eq!(receipt.expense_amount, U256::from(61_728_394u64));
        assert_eq!(receipt.withdrawal_tx, MockWallet::tx_id(1));
        assert_eq!(receipt.expense_tx, MockWallet::tx_id(2));
        assert_eq!(receipt.managing_wallet, address(MANAGER));
        assert_eq!(chat.messages()[0].buttons.len(), 5);
        assert_eq!(webhook.payloads()[0]["status"], "success");
        assert_eq!(webhook.payloads()[0]["expenseAmountTRX"], "61.73");
    }

    #[tokio::test]
    async fn balance_read_failure_propagates_without_notification() {
        let wallet =
            Arc::new(MockWallet::new(address(MANAGER)).failing_on(Operation::NativeBalance));
        let (strategy, chat, webhook) = strategy(wallet.clone());

        let err = strategy.execute().await.unwrap_err();

        assert!(format!("{err:#}").contains("failed to read contract balance"));
        assert!(wallet.calls().is_empty());
        assert!(chat.messages().is_empty());
        assert!(webhook.payloads().is_empty());
    }

    #[tokio::test]
    async fn withdrawal_revert_propagates_before_expense() {
        let wallet = Arc::new(
            MockWallet::new(address(MANAGER))
                .with_native_balance(address(CONTRACT), U256::from(600_000_000u64))
                .failing_on(Operation::WithdrawLiquidity),
        );
        let (strategy, _chat, webhook) = strategy(wallet.clone());

        assert!(strategy.execute().await.is_err());
        assert!(!wallet
            .calls()
            .iter()
            .any(|call| matches!(call, WalletCall::Transfer { .. })));
        assert!(webhook.payloads().is_empty());
    }

    #[tokio::test]
    async fn failed_expense_transfer_alerts_and_names_withdrawal() {
        let wallet = Arc::new(
            MockWallet::new(address(MANAGER))
                .with_native_balance(address(CONTRACT), U256::from(600_000_000u64))
                .failing_on(Operation::Transfer),
        );
        let (strategy, chat, webhook) = strategy(wallet.clone());

        let err = strategy.execute().await.unwrap_err();

        let withdrawal_tx = MockWallet::tx_id(1);
        assert!(err.to_string().contains(&withdrawal_tx.to_string()));
        let messages = chat.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("Expense transfer failed"));
        assert!(webhook.payloads().is_empty());
    }
}
