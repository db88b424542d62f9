//! Token manager service: HTTP triggers for the daily withdrawal and liquidity flows.
//!
//! Usage: token-manager
//!
//! Configuration is read from the environment (and `.env` if present).

mod config;
mod logging;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clients_sunswap::SunswapRouter;
use clients_telegrambot::TelegramBot;
use clients_tron::TronWallet;
use clients_webhook::WebhookClient;
use tracing::info;
use treasury::{
    LiquidityStrategy, LiquidityStrategyConfig, Notifiers, NullWebhook, ReportConfig, Wallet,
    WebhookNotifier, WithdrawStrategy, WithdrawStrategyConfig,
};

use crate::config::Config;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;
    config.logging.init();

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let wallet: Arc<dyn Wallet> = Arc::new(
        TronWallet::new(client.clone(), config.tron.clone(), &config.private_key)
            .context("failed to load managing wallet")?,
    );
    let oracle = Arc::new(SunswapRouter::new(client.clone(), config.router.clone()));

    let telegram = TelegramBot::new(
        client.clone(),
        config.telegram_bot_token.clone(),
        config.telegram_channel_id.clone(),
    );
    let webhook: Arc<dyn WebhookNotifier> = match config.webhook_url.clone() {
        Some(url) => Arc::new(WebhookClient::new(client.clone(), url)),
        None => {
            info!("MAKE_WEBHOOK_URL not set, webhooks disabled");
            Arc::new(NullWebhook)
        }
    };
    let notifiers = Notifiers {
        chat: Arc::new(telegram),
        webhook,
    };

    let withdraw = WithdrawStrategy::new(
        WithdrawStrategyConfig {
            token_contract: config.token_address,
            expense_wallet: config.expense_wallet,
        },
        wallet.clone(),
        notifiers.clone(),
        ReportConfig::default(),
    );
    let liquidity = LiquidityStrategy::new(
        LiquidityStrategyConfig {
            wrapped_token: config.wtrx_address,
            paired_token: config.token_address,
            position_manager: config.position_manager,
            position_id: config.position_id,
        },
        wallet,
        oracle,
        notifiers,
        ReportConfig::default(),
    );

    let state = Arc::new(AppState::new(config.secret.clone(), withdraw, liquidity));
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server is running");
    axum::serve(listener, app).await?;

    Ok(())
}
