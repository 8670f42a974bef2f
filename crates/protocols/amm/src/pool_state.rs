//! Pool reserve sources
//!
//! Reserves can be read two ways: from the exchange contract's getters or
//! from the balances the exchange address holds. Which one is used is fixed
//! when the [`ExchangeContext`](crate::context::ExchangeContext) is built.
//! Snapshots are never cached; every operation reads afresh.

use std::sync::Arc;

use async_trait::async_trait;
use exchange_core::{Asset, LedgerError, ReserveSource};
use ledger_client::LedgerClient;

use crate::state::Pool;

/// Something that can produce a reserve snapshot
#[async_trait]
pub trait PoolSource: Send + Sync {
    async fn read(&self, ledger: &LedgerClient) -> Result<Pool, LedgerError>;

    fn name(&self) -> &'static str;
}

/// Reserves from the exchange contract getters
#[derive(Debug, Clone, Copy, Default)]
pub struct ReserveGetters;

#[async_trait]
impl PoolSource for ReserveGetters {
    async fn read(&self, ledger: &LedgerClient) -> Result<Pool, LedgerError> {
        let (token_reserve, eth_reserve) = ledger.reserves().await?;
        Ok(Pool::new(token_reserve, eth_reserve))
    }

    fn name(&self) -> &'static str {
        "getters"
    }
}

/// Reserves as the exchange address's ETH and token balances
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceDerived;

#[async_trait]
impl PoolSource for BalanceDerived {
    async fn read(&self, ledger: &LedgerClient) -> Result<Pool, LedgerError> {
        let exchange = ledger.exchange_address();
        let token_reserve = ledger.balance(exchange, Asset::Token).await?;
        let eth_reserve = ledger.balance(exchange, Asset::Eth).await?;
        Ok(Pool::new(token_reserve, eth_reserve))
    }

    fn name(&self) -> &'static str {
        "balances"
    }
}

/// Source matching the configured reserve mode
pub fn source_for(mode: ReserveSource) -> Arc<dyn PoolSource> {
    match mode {
        ReserveSource::Getters => Arc::new(ReserveGetters),
        ReserveSource::Balances => Arc::new(BalanceDerived),
    }
}

/// Read a fresh snapshot, rejecting half-initialized reserves
pub async fn snapshot(source: &dyn PoolSource, ledger: &LedgerClient) -> Result<Pool, LedgerError> {
    let pool = source.read(ledger).await?;
    if !pool.is_consistent() {
        return Err(LedgerError::InvalidState {
            reason: format!("{} via {}: exactly one reserve is zero", pool, source.name()),
        });
    }
    tracing::debug!(
        source = source.name(),
        token_reserve = %pool.token_reserve,
        eth_reserve = %pool.eth_reserve,
        "Pool snapshot"
    );
    Ok(pool)
}

/// Whether the pool holds both assets
pub fn is_initialized(pool: &Pool) -> bool {
    pool.is_initialized()
}
