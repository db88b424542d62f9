//! Process configuration read from the environment.

use std::time::Duration;

use clients_sunswap::{SunswapRouterConfig, DEFAULT_ROUTER_URL};
use clients_tron::{TronAddress, TronWalletConfig};
use thiserror::Error;
use treasury::config::DEFAULT_POSITION_ID;
use url::Url;

use crate::logging::LoggingConfig;

const DEFAULT_WTRX_ADDRESS: &str = "TNUC9Qb1rRpS5CbWLmNMxXBjyFoydXjWFR";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything the service needs to start.
pub struct Config {
    pub private_key: String,
    pub tron: TronWalletConfig,
    /// Token contract: withdrawal source and paired token of the position
    pub token_address: TronAddress,
    pub wtrx_address: TronAddress,
    pub position_manager: TronAddress,
    pub position_id: u64,
    pub expense_wallet: TronAddress,
    /// Expected `x-secret-key` header on write endpoints
    pub secret: String,
    pub router: SunswapRouterConfig,
    pub telegram_bot_token: String,
    pub telegram_channel_id: String,
    /// Webhooks are disabled when unset
    pub webhook_url: Option<Url>,
    pub port: u16,
    pub logging: LoggingConfig,
    pub http_timeout: Duration,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let full_host = env.optional("TRON_FULL_HOST");
        if let Some(host) = &full_host {
            parse_url("TRON_FULL_HOST", host)?;
        }
        let tron = TronWalletConfig {
            full_host: full_host.unwrap_or_else(|| TronWalletConfig::default().full_host),
            api_key: env.optional("API_KEY"),
            ..TronWalletConfig::default()
        };

        let router_url = env
            .optional("SUN_IO_API_URL")
            .unwrap_or_else(|| DEFAULT_ROUTER_URL.to_string());
        parse_url("SUN_IO_API_URL", &router_url)?;

        let webhook_url = env
            .optional("MAKE_WEBHOOK_URL")
            .map(|raw| parse_url("MAKE_WEBHOOK_URL", &raw))
            .transpose()?;

        let logging = LoggingConfig {
            level: env.optional("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            format: env.optional("LOG_FORMAT").unwrap_or_else(|| "pretty".into()),
        };

        Ok(Self {
            private_key: env.required("PRIVATE_KEY")?,
            tron,
            token_address: env.address("QSI_TOKEN_ADDRESS", None)?,
            wtrx_address: env.address("WTRX_ADDRESS", Some(DEFAULT_WTRX_ADDRESS))?,
            position_manager: env.address("NONFUNGIBLE_POSITION_MANAGER_ADDRESS", None)?,
            position_id: env.parsed("POSITION_ID", DEFAULT_POSITION_ID)?,
            expense_wallet: env.address("EXPENSE_WALLET", None)?,
            secret: env.required("LIQUIDITY_SECRET")?,
            router: SunswapRouterConfig {
                base_url: router_url,
                ..SunswapRouterConfig::default()
            },
            telegram_bot_token: env.required("TELEGRAM_BOT_TOKEN")?,
            telegram_channel_id: env.required("TELEGRAM_CHANNEL_ID")?,
            webhook_url,
            port: env.parsed("PORT", DEFAULT_PORT)?,
            logging,
            http_timeout: Duration::from_secs(
                env.parsed("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            ),
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn address(
        &self,
        name: &'static str,
        default: Option<&str>,
    ) -> Result<TronAddress, ConfigError> {
        let raw = match (self.optional(name), default) {
            (Some(value), _) => value,
            (None, Some(default)) => default.to_string(),
            (None, None) => return Err(ConfigError::Missing(name)),
        };
        raw.parse().map_err(|e: clients_tron::AddressError| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        })
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
