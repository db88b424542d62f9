//! TRON full-node client: addresses, contract ABI and a signing wallet.

mod address;
mod config;
pub mod contracts;
mod error;
mod types;
mod wallet;

pub use address::{TronAddress, ADDRESS_PREFIX};
pub use config::TronWalletConfig;
pub use error::{AddressError, TronError};
pub use types::TxId;
pub use wallet::TronWallet;
