//! ledger-client: The ledger port consumed by the exchange core
//!
//! The ledger (token, exchange and futures contracts plus their execution
//! layer) is external. This crate defines the small set of operations the
//! core needs from it, wraps every call in a settlement timeout, and ships an
//! in-process [`SimulatedLedger`] for tests and local runs.

pub mod simulated;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use exchange_core::{Address, Asset, LedgerConfig, LedgerError, Timestamp, Wei};

pub use simulated::{FeeConfig, SimulatedLedger};
pub use types::{FutureContract, LedgerCall, TxReceipt, TxStatus};

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Operations the exchange core needs from the ledger.
///
/// Implementations own serialization of ledger state; `submit` resolves only
/// once the call has settled (successfully or not).
#[async_trait]
pub trait LedgerPort: Send + Sync {
    /// Reserve getters of the exchange contract: `(token_reserve, eth_reserve)`
    async fn get_reserves(&self) -> Result<(Wei, Wei)>;

    async fn get_balance(&self, address: &Address, asset: Asset) -> Result<Wei>;

    async fn get_allowance(&self, owner: &Address, spender: &Address) -> Result<Wei>;

    /// Future contract at `id`, or `None` past the last one
    async fn get_future(&self, id: u64) -> Result<Option<FutureContract>>;

    /// Current ledger time in unix seconds
    async fn now(&self) -> Result<Timestamp>;

    /// Submit a call as `from` and wait for it to settle
    async fn submit(&self, from: &Address, call: LedgerCall) -> Result<TxReceipt>;
}

/// Ledger handle with per-request timeouts
#[derive(Clone)]
pub struct LedgerClient {
    inner: Arc<dyn LedgerPort>,
    config: LedgerConfig,
}

impl LedgerClient {
    pub fn new(inner: Arc<dyn LedgerPort>, config: LedgerConfig) -> Self {
        Self { inner, config }
    }

    /// Get the underlying port (for advanced usage)
    pub fn inner(&self) -> &dyn LedgerPort {
        self.inner.as_ref()
    }

    /// Get the current ledger configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn exchange_address(&self) -> &Address {
        &self.config.exchange_address
    }

    pub fn futures_address(&self) -> &Address {
        &self.config.futures_address
    }

    pub async fn reserves(&self) -> Result<(Wei, Wei)> {
        self.timed(self.inner.get_reserves()).await
    }

    pub async fn balance(&self, address: &Address, asset: Asset) -> Result<Wei> {
        self.timed(self.inner.get_balance(address, asset)).await
    }

    pub async fn allowance(&self, owner: &Address, spender: &Address) -> Result<Wei> {
        self.timed(self.inner.get_allowance(owner, spender)).await
    }

    pub async fn future(&self, id: u64) -> Result<Option<FutureContract>> {
        self.timed(self.inner.get_future(id)).await
    }

    pub async fn now(&self) -> Result<Timestamp> {
        self.timed(self.inner.now()).await
    }

    /// Submit a call and wait for its receipt.
    ///
    /// A failed receipt is returned as `Ok`; only transport problems are errors.
    pub async fn submit(&self, from: &Address, call: LedgerCall) -> Result<TxReceipt> {
        let operation = call.name();
        tracing::info!(from = %from, operation, "Submitting transaction");

        let receipt = self.timed(self.inner.submit(from, call)).await?;

        match &receipt.status {
            TxStatus::Success => tracing::info!(
                tx_hash = %receipt.tx_hash,
                block = receipt.block_number,
                operation,
                "Transaction settled"
            ),
            TxStatus::Failed { reason } => tracing::warn!(
                tx_hash = %receipt.tx_hash,
                operation,
                reason = %reason,
                "Transaction failed on-chain"
            ),
        }

        Ok(receipt)
    }

    /// Wrap a ledger call with the configured timeout
    async fn timed<T>(&self, fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        let secs = self.config.request_timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), fut)
            .await
            .map_err(|_| LedgerError::Timeout { secs })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StalledLedger;

    #[async_trait]
    impl LedgerPort for StalledLedger {
        async fn get_reserves(&self) -> Result<(Wei, Wei)> {
            std::future::pending().await
        }

        async fn get_balance(&self, _address: &Address, _asset: Asset) -> Result<Wei> {
            Ok(Wei::zero())
        }

        async fn get_allowance(&self, _owner: &Address, _spender: &Address) -> Result<Wei> {
            Ok(Wei::zero())
        }

        async fn get_future(&self, _id: u64) -> Result<Option<FutureContract>> {
            Ok(None)
        }

        async fn now(&self) -> Result<Timestamp> {
            Ok(0)
        }

        async fn submit(&self, _from: &Address, _call: LedgerCall) -> Result<TxReceipt> {
            Err(LedgerError::Unreachable {
                url: "stalled".into(),
            })
        }
    }

    fn stalled_client() -> LedgerClient {
        let config = LedgerConfig {
            request_timeout_secs: 1,
            ..LedgerConfig::default()
        };
        LedgerClient::new(Arc::new(StalledLedger), config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_as_ledger_error() {
        let client = stalled_client();
        let err = client.reserves().await.unwrap_err();
        assert!(matches!(err, LedgerError::Timeout { secs: 1 }));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let client = stalled_client();
        let from = Address::new("0x0000000000000000000000000000000000000001");
        let err = client
            .submit(&from, LedgerCall::ExecuteFuture { id: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unreachable { .. }));
    }
}
