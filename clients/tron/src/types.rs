//! Transaction ids and full-node wire types.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::B256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A TRON transaction id: `sha256(raw_data)`, shown as lowercase hex without `0x`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub B256);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self)
    }
}

impl FromStr for TxId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(raw, &mut bytes)?;
        Ok(Self(B256::from(bytes)))
    }
}

impl Serialize for TxId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// `/wallet/getaccount` response. Unactivated accounts come back as `{}`.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountResponse {
    #[serde(default)]
    pub balance: Option<u64>,
}

/// `result` object attached to contract trigger responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReturnStatus {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `/wallet/triggersmartcontract` and `/wallet/triggerconstantcontract` response.
#[derive(Debug, Deserialize)]
pub(crate) struct TriggerResponse {
    #[serde(default)]
    pub result: ReturnStatus,
    #[serde(default)]
    pub transaction: Option<serde_json::Value>,
    #[serde(default)]
    pub constant_result: Vec<String>,
}

/// Fields of an unsigned transaction needed to sign it.
#[derive(Debug, Deserialize)]
pub(crate) struct UnsignedTransaction {
    #[serde(rename = "txID")]
    pub tx_id: String,
    pub raw_data_hex: String,
}

/// `/wallet/broadcasttransaction` response.
#[derive(Debug, Deserialize)]
pub(crate) struct BroadcastResponse {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Full nodes hex-encode most error messages; fall back to the raw text otherwise.
pub(crate) fn decode_message(message: &str) -> String {
    hex::decode(message)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| message.to_string())
}
