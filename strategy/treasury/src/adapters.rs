//! Port implementations backed by the workspace clients.

use alloy::primitives::U256;
use anyhow::{Context, Result};
use async_trait::async_trait;
use clients_sunswap::{PriceQuote, SunswapRouter};
use clients_telegrambot::TelegramBot;
use clients_tron::contracts::{
    INonfungiblePositionManager, ITokenTreasury, IWrappedTrx, IncreaseLiquidityParams, ITRC20,
};
use clients_tron::{TronAddress, TronWallet, TxId};
use clients_webhook::WebhookClient;
use tracing::{debug, info, warn};

use crate::ports::{ChatMessage, ChatNotifier, PriceOracle, Wallet, WebhookNotifier};
use crate::types::LiquidityParams;

impl From<&LiquidityParams> for IncreaseLiquidityParams {
    fn from(params: &LiquidityParams) -> Self {
        IncreaseLiquidityParams {
            tokenId: params.position_id,
            amount0Desired: params.amount0_desired,
            amount1Desired: params.amount1_desired,
            amount0Min: params.amount0_min,
            amount1Min: params.amount1_min,
            deadline: U256::from(params.deadline),
        }
    }
}

#[async_trait]
impl Wallet for TronWallet {
    fn address(&self) -> TronAddress {
        *TronWallet::address(self)
    }

    async fn native_balance(&self, account: &TronAddress) -> Result<U256> {
        Ok(self.get_balance(account).await?)
    }

    async fn token_balance(&self, token: &TronAddress, owner: &TronAddress) -> Result<U256> {
        Ok(self.trc20_balance(token, owner).await?)
    }

    async fn withdraw_liquidity(&self, contract: &TronAddress, amount: U256) -> Result<TxId> {
        let call = ITokenTreasury::withdrawLiquidityCall { amount };
        Ok(self.trigger(contract, &call, U256::ZERO).await?)
    }

    async fn transfer(&self, to: &TronAddress, amount: U256) -> Result<TxId> {
        Ok(TronWallet::transfer(self, to, amount).await?)
    }

    async fn wrap(&self, wrapped_token: &TronAddress, amount: U256) -> Result<TxId> {
        let call = IWrappedTrx::depositCall {};
        Ok(self.trigger(wrapped_token, &call, amount).await?)
    }

    async fn approve(
        &self,
        token: &TronAddress,
        spender: &TronAddress,
        amount: U256,
    ) -> Result<TxId> {
        let call = ITRC20::approveCall {
            spender: spender.to_evm(),
            value: amount,
        };
        Ok(self.trigger(token, &call, U256::ZERO).await?)
    }

    async fn increase_liquidity(
        &self,
        position_manager: &TronAddress,
        params: &LiquidityParams,
    ) -> Result<TxId> {
        let call = INonfungiblePositionManager::increaseLiquidityCall {
            params: params.into(),
        };
        Ok(self.trigger(position_manager, &call, U256::ZERO).await?)
    }
}

#[async_trait]
impl PriceOracle for SunswapRouter {
    async fn quote(
        &self,
        from: &TronAddress,
        to: &TronAddress,
        amount_in: U256,
        out_decimals: u32,
    ) -> Result<PriceQuote> {
        SunswapRouter::quote(
            self,
            &from.to_base58(),
            &to.to_base58(),
            amount_in,
            out_decimals,
        )
        .await
        .context("swap router quote failed")
    }
}

#[async_trait]
impl ChatNotifier for TelegramBot {
    async fn notify(&self, message: &ChatMessage) {
        match self
            .push_message_with_buttons(&message.text, &message.buttons)
            .await
        {
            Ok(()) => info!("Telegram notification sent"),
            Err(e) => warn!(error = %e, "Telegram notification failed"),
        }
    }
}

#[async_trait]
impl WebhookNotifier for WebhookClient {
    async fn notify(&self, payload: &serde_json::Value) {
        match self.send(payload).await {
            Ok(status) => info!(status, "webhook sent"),
            Err(e) => warn!(error = %e, url = %self.url(), "webhook delivery failed"),
        }
    }
}

/// Webhook sink used when no webhook URL is configured.
pub struct NullWebhook;

#[async_trait]
impl WebhookNotifier for NullWebhook {
    async fn notify(&self, _payload: &serde_json::Value) {
        debug!("webhook disabled, payload dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use clients_telegrambot::LinkButton;
    use reqwest::Client;
    use serde_json::json;
    use url::Url;

    use crate::config::{ReportConfig, WithdrawStrategyConfig};
    use crate::ports::Notifiers;
    use crate::testkit::{address, MockWallet};
    use crate::types::WithdrawOutcome;
    use crate::withdraw::WithdrawStrategy;

    /// Base URL of a local port nobody listens on.
    async fn closed_port() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    async fn unreachable_notifiers() -> Notifiers {
        let base = closed_port().await;
        let bot = TelegramBot::new(Client::new(), "123:abc".into(), "@channel".into())
            .with_api_base(base.clone());
        let url = Url::parse(&format!("{base}/hook")).unwrap();
        let hook = WebhookClient::new(Client::new(), url);
        Notifiers {
            chat: Arc::new(bot),
            webhook: Arc::new(hook),
        }
    }

    #[tokio::test]
    async fn notifiers_swallow_delivery_failures() {
        let notifiers = unreachable_notifiers().await;
        let message = ChatMessage::new("*hello*")
            .with_buttons(vec![LinkButton::new("Tx", "https://tronscan.org")]);

        notifiers.chat.notify(&message).await;
        notifiers.webhook.notify(&json!({"success": true})).await;
        NullWebhook.notify(&json!({"success": true})).await;
    }

    #[tokio::test]
    async fn withdrawal_succeeds_when_notifications_fail() {
        let wallet = Arc::new(
            MockWallet::new(address(3)).with_native_balance(address(1), U256::from(600_000_000u64)),
        );
        let config = WithdrawStrategyConfig {
            token_contract: address(1),
            expense_wallet: address(2),
        };
        let strategy = WithdrawStrategy::new(
            config,
            wallet.clone(),
            unreachable_notifiers().await,
            ReportConfig::default(),
        );

        let outcome = strategy.execute().await.unwrap();

        assert!(matches!(outcome, WithdrawOutcome::Withdrawn(_)));
        assert_eq!(wallet.calls().len(), 2);
    }

    #[test]
    fn liquidity_params_map_field_by_field() {
        let params = LiquidityParams {
            position_id: U256::from(765u64),
            amount0_desired: U256::from(50_000_000u64),
            amount1_desired: U256::from(45_000_000u64),
            amount0_min: U256::from(50u64),
            amount1_min: U256::from(45u64),
            deadline: 1_700_000_600,
        };
        let abi: IncreaseLiquidityParams = (&params).into();
        assert_eq!(abi.tokenId, U256::from(765u64));
        assert_eq!(abi.amount0Desired, params.amount0_desired);
        assert_eq!(abi.amount1Desired, params.amount1_desired);
        assert_eq!(abi.amount0Min, params.amount0_min);
        assert_eq!(abi.amount1Min, params.amount1_min);
        assert_eq!(abi.deadline, U256::from(1_700_000_600u64));
    }
}
