//! TronWallet: signing session for one managing account on a TRON full node.

use std::str::FromStr;

use alloy::primitives::{B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use alloy::sol_types::SolCall;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::address::TronAddress;
use crate::config::TronWalletConfig;
use crate::contracts::ITRC20;
use crate::error::TronError;
use crate::types::{
    decode_message, AccountResponse, BroadcastResponse, ReturnStatus, TriggerResponse, TxId,
    UnsignedTransaction,
};

const API_KEY_HEADER: &str = "TRON-PRO-API-KEY";

/// TronWallet talks to the full node HTTP API and signs transactions locally.
///
/// Constructed once at startup; every method takes `&self` so a single
/// instance can be shared behind an `Arc`.
pub struct TronWallet {
    /// Shared HTTP client
    client: reqwest::Client,
    /// Node endpoint, API key and fee limit
    config: TronWalletConfig,
    /// secp256k1 key of the managing account
    signer: PrivateKeySigner,
    /// Address derived from `signer`
    address: TronAddress,
}

impl TronWallet {
    /// Creates a new `TronWallet` from a hex private key.
    ///
    /// # Arguments
    /// * `client` - HTTP client used for every node request
    /// * `config` - Node endpoint and fee settings
    /// * `private_key` - Hex-encoded secp256k1 key, with or without `0x`
    pub fn new(
        client: reqwest::Client,
        config: TronWalletConfig,
        private_key: &str,
    ) -> Result<Self, TronError> {
        let key = private_key.trim();
        let signer = PrivateKeySigner::from_str(key.strip_prefix("0x").unwrap_or(key))
            .map_err(|e| TronError::InvalidKey(e.to_string()))?;
        let address = TronAddress::from_evm(signer.address());
        info!(address = %address, node = %config.full_host, "TRON wallet connected");
        Ok(Self {
            client,
            config,
            signer,
            address,
        })
    }

    /// Address of the managing account.
    pub fn address(&self) -> &TronAddress {
        &self.address
    }

    /// Returns the TRX balance of any account, in sun. Unactivated accounts report zero.
    pub async fn get_balance(&self, account: &TronAddress) -> Result<U256, TronError> {
        let body = json!({
            "address": account.to_base58(),
            "visible": true,
        });
        let response: AccountResponse = self.post("/wallet/getaccount", &body).await?;
        Ok(U256::from(response.balance.unwrap_or(0)))
    }

    /// Reads `balanceOf(owner)` on a TRC-20 token without creating a transaction.
    pub async fn trc20_balance(
        &self,
        token: &TronAddress,
        owner: &TronAddress,
    ) -> Result<U256, TronError> {
        const ENDPOINT: &str = "/wallet/triggerconstantcontract";
        let call = ITRC20::balanceOfCall {
            owner: owner.to_evm(),
        };
        let body = json!({
            "owner_address": owner.to_base58(),
            "contract_address": token.to_base58(),
            "function_selector": ITRC20::balanceOfCall::SIGNATURE,
            "parameter": encode_parameters(&call),
            "visible": true,
        });
        let response: TriggerResponse = self.post(ENDPOINT, &body).await?;
        ensure_accepted(ENDPOINT, &response.result)?;
        let word = response
            .constant_result
            .first()
            .ok_or_else(|| malformed(ENDPOINT, "empty constant_result"))?;
        U256::from_str_radix(word, 16).map_err(|e| malformed(ENDPOINT, e.to_string()))
    }

    /// Calls a state-changing contract method, then signs and broadcasts the transaction.
    ///
    /// # Arguments
    /// * `contract` - Contract to call
    /// * `call` - ABI call generated by `sol!`; its signature becomes the function selector
    /// * `call_value` - TRX attached to the call, in sun
    pub async fn trigger<C: SolCall>(
        &self,
        contract: &TronAddress,
        call: &C,
        call_value: U256,
    ) -> Result<TxId, TronError> {
        const ENDPOINT: &str = "/wallet/triggersmartcontract";
        let body = json!({
            "owner_address": self.address.to_base58(),
            "contract_address": contract.to_base58(),
            "function_selector": C::SIGNATURE,
            "parameter": encode_parameters(call),
            "fee_limit": self.config.fee_limit,
            "call_value": to_sun(call_value)?,
            "visible": true,
        });
        debug!(contract = %contract, method = C::SIGNATURE, "triggering contract");
        let response: TriggerResponse = self.post(ENDPOINT, &body).await?;
        ensure_accepted(ENDPOINT, &response.result)?;
        let transaction = response
            .transaction
            .ok_or_else(|| malformed(ENDPOINT, "missing transaction"))?;
        self.sign_and_broadcast(ENDPOINT, transaction).await
    }

    /// Sends `amount` sun from the managing account to `to`.
    pub async fn transfer(&self, to: &TronAddress, amount: U256) -> Result<TxId, TronError> {
        const ENDPOINT: &str = "/wallet/createtransaction";
        let body = json!({
            "owner_address": self.address.to_base58(),
            "to_address": to.to_base58(),
            "amount": to_sun(amount)?,
            "visible": true,
        });
        let transaction: Value = self.post(ENDPOINT, &body).await?;
        if let Some(reason) = transaction.get("Error").and_then(Value::as_str) {
            return Err(TronError::Rejected {
                endpoint: ENDPOINT,
                reason: reason.to_string(),
            });
        }
        self.sign_and_broadcast(ENDPOINT, transaction).await
    }

    async fn sign_and_broadcast(
        &self,
        origin: &'static str,
        mut transaction: Value,
    ) -> Result<TxId, TronError> {
        const ENDPOINT: &str = "/wallet/broadcasttransaction";
        let unsigned: UnsignedTransaction = serde_json::from_value(transaction.clone())?;
        let hash = verify_tx_id(origin, &unsigned)?;
        let signature = self.signer.sign_hash_sync(&hash)?;
        transaction["signature"] = json!([hex::encode(signature.as_bytes())]);

        let response: BroadcastResponse = self.post(ENDPOINT, &transaction).await?;
        if !response.result {
            let message = response
                .message
                .as_deref()
                .map(decode_message)
                .unwrap_or_default();
            return Err(TronError::Rejected {
                endpoint: ENDPOINT,
                reason: format!(
                    "{}: {}",
                    response.code.as_deref().unwrap_or("UNKNOWN"),
                    message
                ),
            });
        }

        let tx_id = TxId(hash);
        info!(tx_id = %tx_id, "transaction broadcast");
        Ok(tx_id)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        body: &Value,
    ) -> Result<T, TronError> {
        let url = format!("{}{}", self.config.full_host.trim_end_matches('/'), endpoint);
        let mut request = self.client.post(&url).json(body);
        if let Some(api_key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }
        let response = request
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;
        Ok(response)
    }
}

/// ABI-encodes call arguments without the 4-byte selector; the node derives it
/// from `function_selector`.
fn encode_parameters<C: SolCall>(call: &C) -> String {
    let mut out = Vec::new();
    call.abi_encode_raw(&mut out);
    hex::encode(out)
}

/// Recomputes `sha256(raw_data)` and checks it against the id reported by the node.
fn verify_tx_id(origin: &'static str, unsigned: &UnsignedTransaction) -> Result<B256, TronError> {
    let raw = hex::decode(&unsigned.raw_data_hex).map_err(|e| malformed(origin, e.to_string()))?;
    let computed = B256::from_slice(&Sha256::digest(&raw));
    let reported =
        B256::from_str(&unsigned.tx_id).map_err(|e| malformed(origin, e.to_string()))?;
    if computed != reported {
        return Err(TronError::TxIdMismatch {
            reported: unsigned.tx_id.clone(),
            computed: hex::encode(computed),
        });
    }
    Ok(computed)
}

fn ensure_accepted(endpoint: &'static str, status: &ReturnStatus) -> Result<(), TronError> {
    if status.result {
        return Ok(());
    }
    let message = status
        .message
        .as_deref()
        .map(decode_message)
        .unwrap_or_default();
    Err(TronError::Rejected {
        endpoint,
        reason: format!("{}: {}", status.code.as_deref().unwrap_or("UNKNOWN"), message),
    })
}

/// TRX amounts travel as signed 64-bit integers.
fn to_sun(amount: U256) -> Result<i64, TronError> {
    if amount > U256::from(i64::MAX as u64) {
        return Err(TronError::AmountOverflow(amount.to_string()));
    }
    Ok(amount.to::<u64>() as i64)
}

fn malformed(endpoint: &'static str, reason: impl Into<String>) -> TronError {
    TronError::Malformed {
        endpoint,
        reason: reason.into(),
    }
}
