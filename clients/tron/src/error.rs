use thiserror::Error;

/// Errors produced while parsing a TRON address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58 address: {0}")]
    InvalidBase58(String),

    #[error("invalid hex address: {0}")]
    InvalidHex(String),

    #[error("invalid address length: {0} bytes")]
    InvalidLength(usize),

    #[error("invalid address prefix: 0x{0:02x}")]
    InvalidPrefix(u8),

    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// Errors returned by the TRON wallet client.
#[derive(Error, Debug)]
pub enum TronError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node rejected {endpoint}: {reason}")]
    Rejected {
        endpoint: &'static str,
        reason: String,
    },

    #[error("malformed response from {endpoint}: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: String,
    },

    #[error("transaction id mismatch: node reported {reported}, raw data hashes to {computed}")]
    TxIdMismatch { reported: String, computed: String },

    #[error("amount {0} does not fit a TRX value")]
    AmountOverflow(String),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(#[from] alloy::signers::Error),
}
