//! Configuration types for the exchange

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::types::Address;

/// Where pool reserves are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReserveSource {
    /// Exchange contract reserve getters
    Getters,
    /// ETH and token balances held by the exchange address
    Balances,
}

/// Ledger connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger endpoint (e.g., "http://localhost:8545")
    pub url: String,

    /// Exchange (pool) contract address
    pub exchange_address: Address,

    /// Token contract address
    pub token_address: Address,

    /// Futures contract address
    pub futures_address: Address,

    /// Seconds to wait for a ledger call or settlement
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// How reserves are obtained
    #[serde(default = "default_reserve_source")]
    pub reserve_source: ReserveSource,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_reserve_source() -> ReserveSource {
    ReserveSource::Getters
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            exchange_address: Address::new("0x380f560152542a4157d1a729c0cfafdbbd5453d4"),
            token_address: Address::new("0xb1ced0ea42dff0c0b408168952279968169cb437"),
            futures_address: Address::new("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
            request_timeout_secs: default_request_timeout(),
            reserve_source: default_reserve_source(),
        }
    }
}

/// Pool seeding used when the exchange starts against an empty pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Account that mints the seed tokens and funds the pool
    pub operator: Address,

    /// Token base units placed in a fresh pool
    pub token_reserve: u64,

    /// Wei placed in a fresh pool
    pub eth_reserve: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            operator: Address::new("0x14dc79964da2c08b23698b3d3cc7ca32193d9955"),
            token_reserve: 5000,
            eth_reserve: 5000,
        }
    }
}

/// Display metadata for the exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeInfo {
    pub name: String,
    pub token_name: String,
    pub token_symbol: String,
}

impl Default for ExchangeInfo {
    fn default() -> Self {
        Self {
            name: "BBC".to_string(),
            token_name: "Bib Black TOKEN".to_string(),
            token_symbol: "BBC wei".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ledger connection settings
    pub ledger: LedgerConfig,

    /// Pool seeding
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    /// Display metadata
    #[serde(default)]
    pub exchange: ExchangeInfo,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    18545
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            bootstrap: BootstrapConfig::default(),
            exchange: ExchangeInfo::default(),
            api_port: default_api_port(),
        }
    }
}

impl AppConfig {
    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }
}
