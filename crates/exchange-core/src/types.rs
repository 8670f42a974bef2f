//! Core type definitions for the exchange

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account or contract address (20 bytes, `0x`-prefixed hex)
///
/// Addresses are kept lowercase so that two spellings of the same account
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that this is a well-formed 20-byte hex address
    pub fn is_valid(&self) -> bool {
        match self.0.strip_prefix("0x") {
            Some(body) => body.len() == 40 && hex::decode(body).is_ok(),
            None => false,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

/// Transaction hash (32 bytes, hex-encoded)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset held by an address on the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    /// Native currency, in wei
    Eth,
    /// The pool's token, in base units
    Token,
    /// LP entitlement recorded by the exchange contract
    Liquidity,
}

impl Asset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eth => "eth",
            Self::Token => "token",
            Self::Liquidity => "liquidity",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Amount in the ledger's smallest unit (wei or token base units)
pub type Wei = U256;

/// Ledger timestamp in unix seconds
pub type Timestamp = u64;

/// Constants
pub mod constants {
    use primitive_types::U256;

    /// Fixed-point scale of every "per" rate (10^18)
    pub const RATE_DECIMALS: usize = 18;

    /// Seconds in one future-contract duration day
    pub const SECONDS_PER_DAY: u64 = 86_400;

    /// Upper bound of a slippage percentage
    pub const MAX_SLIPPAGE_PCT: u32 = 100;

    /// 10^18, the rate scale as a 256-bit integer
    pub fn rate_scale() -> U256 {
        U256::exp10(RATE_DECIMALS)
    }
}

/// Parse a decimal amount string into a `U256`
pub fn parse_amount(s: &str) -> Option<U256> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    U256::from_dec_str(s).ok()
}
