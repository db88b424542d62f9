//! TRON account addresses.
//!
//! A TRON address is the 20-byte account id used by the EVM, prefixed with the
//! version byte `0x41`. Users see it in base58check form (`T...`); contract ABI
//! parameters carry only the 20-byte id.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use base58::{FromBase58, ToBase58};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::AddressError;

/// Version byte of every mainnet address.
pub const ADDRESS_PREFIX: u8 = 0x41;

const ADDRESS_LEN: usize = 21;
const CHECKSUM_LEN: usize = 4;

/// A 21-byte TRON address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TronAddress([u8; ADDRESS_LEN]);

impl TronAddress {
    /// Builds a TRON address from the 20-byte account id.
    pub fn from_evm(address: Address) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[0] = ADDRESS_PREFIX;
        bytes[1..].copy_from_slice(address.as_slice());
        Self(bytes)
    }

    /// Returns the 20-byte account id used in ABI-encoded parameters.
    pub fn to_evm(&self) -> Address {
        Address::from_slice(&self.0[1..])
    }

    /// Hex form including the `41` prefix, without `0x`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Base58check form, e.g. `TNUC9Qb1rRpS5CbWLmNMxXBjyFoydXjWFR`.
    pub fn to_base58(&self) -> String {
        let mut payload = self.0.to_vec();
        payload.extend_from_slice(&checksum(&self.0));
        payload.to_base58()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        if bytes[0] != ADDRESS_PREFIX {
            return Err(AddressError::InvalidPrefix(bytes[0]));
        }
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    fn from_base58_str(s: &str) -> Result<Self, AddressError> {
        let decoded = s
            .from_base58()
            .map_err(|e| AddressError::InvalidBase58(format!("{:?}", e)))?;
        if decoded.len() != ADDRESS_LEN + CHECKSUM_LEN {
            return Err(AddressError::InvalidLength(decoded.len()));
        }
        let (payload, sum) = decoded.split_at(ADDRESS_LEN);
        if checksum(payload).as_slice() != sum {
            return Err(AddressError::ChecksumMismatch);
        }
        Self::from_bytes(payload)
    }

    fn from_hex_str(s: &str) -> Result<Self, AddressError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        match bytes.len() {
            20 => Ok(Self::from_evm(Address::from_slice(&bytes))),
            _ => Self::from_bytes(&bytes),
        }
    }
}

/// First four bytes of a double SHA-256.
fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(Sha256::digest(payload));
    [digest[0], digest[1], digest[2], digest[3]]
}

impl FromStr for TronAddress {
    type Err = AddressError;

    /// Accepts base58check (`T...`), prefixed hex (`41...`, `0x41...`) or a bare 20-byte hex id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('T') {
            Self::from_base58_str(s)
        } else {
            Self::from_hex_str(s)
        }
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TronAddress({})", self.to_base58())
    }
}

impl Serialize for TronAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for TronAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const USDT_BASE58: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
    const USDT_HEX: &str = "41a614f803b6fd780986a42c78ec9c7f77e6ded13c";

    #[test]
    fn base58_and_hex_agree() {
        let from_base58: TronAddress = USDT_BASE58.parse().unwrap();
        let from_hex: TronAddress = USDT_HEX.parse().unwrap();
        assert_eq!(from_base58, from_hex);
        assert_eq!(from_base58.to_hex(), USDT_HEX);
        assert_eq!(from_hex.to_string(), USDT_BASE58);
    }

    #[test]
    fn accepts_0x_and_bare_account_id() {
        let with_prefix: TronAddress = format!("0x{}", USDT_HEX).parse().unwrap();
        let bare: TronAddress = "0xa614f803b6fd780986a42c78ec9c7f77e6ded13c".parse().unwrap();
        assert_eq!(with_prefix, bare);
    }

    #[test]
    fn evm_conversion_round_trips() {
        let evm = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let tron = TronAddress::from_evm(evm);
        assert_eq!(tron.to_hex(), "41f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert_eq!(tron.to_evm(), evm);
        let reparsed: TronAddress = tron.to_string().parse().unwrap();
        assert_eq!(reparsed, tron);
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let mut corrupted = USDT_BASE58.to_string();
        corrupted.pop();
        corrupted.push('u');
        assert!(corrupted.parse::<TronAddress>().is_err());
    }

    #[test]
    fn rejects_wrong_prefix_and_length() {
        assert_eq!(
            "42a614f803b6fd780986a42c78ec9c7f77e6ded13c".parse::<TronAddress>(),
            Err(AddressError::InvalidPrefix(0x42))
        );
        assert_eq!(
            "41a614f803".parse::<TronAddress>(),
            Err(AddressError::InvalidLength(5))
        );
        assert!("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6".parse::<TronAddress>().is_err());
    }

    #[test]
    fn serializes_as_base58() {
        let addr: TronAddress = USDT_HEX.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", USDT_BASE58));
        let back: TronAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
