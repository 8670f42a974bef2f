//! Application state shared across API handlers

use std::sync::Arc;

use amm::ExchangeContext;
use exchange_core::{Address, AppConfig};
use ledger_client::LedgerClient;
use thiserror::Error;

/// Errors that can occur in the API layer
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed account address
    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    /// Callers may not act as one of the exchange's own contracts
    #[error("Address {address} belongs to the {contract} contract")]
    ContractAddress {
        address: String,
        contract: &'static str,
    },

    /// Listener could not be bound or served
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Parse and validate a `0x`-prefixed 20-byte hex address
pub fn parse_address(raw: &str) -> Result<Address, ApiError> {
    let address = Address::new(raw.trim());
    if !address.is_valid() {
        return Err(ApiError::InvalidAddress {
            reason: format!("'{}' is not a 0x-prefixed 20-byte hex address", raw),
        });
    }
    Ok(address)
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    ledger: LedgerClient,
}

impl AppState {
    pub fn new(config: AppConfig, ledger: LedgerClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, ledger }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn ledger(&self) -> &LedgerClient {
        &self.inner.ledger
    }

    /// Context acting as `from`, which must not be a contract address
    pub fn context(&self, from: &str) -> Result<ExchangeContext, ApiError> {
        let account = parse_address(from)?;
        let ledger = &self.inner.config.ledger;
        let contract = if account == ledger.exchange_address {
            Some("exchange")
        } else if account == ledger.futures_address {
            Some("futures")
        } else {
            None
        };
        if let Some(contract) = contract {
            return Err(ApiError::ContractAddress {
                address: account.to_string(),
                contract,
            });
        }
        Ok(ExchangeContext::new(self.inner.ledger.clone(), account))
    }

    /// Context for reads that do not act on behalf of a caller
    pub fn reader(&self) -> ExchangeContext {
        ExchangeContext::new(
            self.inner.ledger.clone(),
            self.inner.config.bootstrap.operator.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let addr = parse_address(" 0x14DC79964DA2C08B23698B3D3CC7CA32193D9955 ").unwrap();
        assert_eq!(addr.as_str(), "0x14dc79964da2c08b23698b3d3cc7ca32193d9955");
        assert!(matches!(
            parse_address("0x1234"),
            Err(ApiError::InvalidAddress { .. })
        ));
        assert!(parse_address("not an address").is_err());
    }

    #[test]
    fn test_context_rejects_contract_addresses() {
        let config = AppConfig::default();
        let sim = ledger_client::SimulatedLedger::new(&config.ledger);
        let ledger = LedgerClient::new(Arc::new(sim), config.ledger.clone());
        let exchange = config.ledger.exchange_address.to_string();
        let futures = format!("0x{}", config.ledger.futures_address.as_str()[2..].to_uppercase());
        let state = AppState::new(config, ledger);

        assert!(matches!(
            state.context(&exchange),
            Err(ApiError::ContractAddress {
                contract: "exchange",
                ..
            })
        ));
        assert!(matches!(
            state.context(&futures),
            Err(ApiError::ContractAddress {
                contract: "futures",
                ..
            })
        ));
        let caller = state
            .context("0x0000000000000000000000000000000000000002")
            .unwrap();
        assert_eq!(caller.account.as_str(), "0x0000000000000000000000000000000000000002");
    }
}
