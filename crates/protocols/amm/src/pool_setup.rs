//! Pool Setup
//!
//! Seeds an empty pool in three settled steps:
//!
//! 1. **Mint** the seed tokens to the operator
//! 2. **Approve** the exchange to pull them
//! 3. **Create** the pool with the tokens and the operator's ETH
//!
//! Each step waits for its receipt before the next is submitted. The first
//! failure aborts the chain with `LedgerRejected`.

use exchange_core::{Asset, BootstrapConfig, ProtocolError, Result, Wei};
use ledger_client::{LedgerCall, TxReceipt};

use crate::context::ExchangeContext;
use crate::state::Pool;

/// What `ensure_initialized` found or did
#[derive(Debug, Clone)]
pub enum BootstrapOutcome {
    AlreadyInitialized(Pool),
    Initialized { pool: Pool, receipts: Vec<TxReceipt> },
}

impl BootstrapOutcome {
    pub fn pool(&self) -> &Pool {
        match self {
            Self::AlreadyInitialized(pool) => pool,
            Self::Initialized { pool, .. } => pool,
        }
    }
}

/// Mint, approve and create a pool holding `token_amount` and `eth_amount`
pub async fn initialize_pool(
    ctx: &ExchangeContext,
    token_amount: Wei,
    eth_amount: Wei,
) -> Result<Vec<TxReceipt>> {
    if token_amount.is_zero() || eth_amount.is_zero() {
        return Err(ProtocolError::InvalidAmount {
            message: "pool needs both tokens and ETH".to_string(),
        }
        .into());
    }

    tracing::info!(
        operator = %ctx.account,
        tokens = %token_amount,
        eth = %eth_amount,
        "Initializing pool"
    );

    let steps = [
        LedgerCall::Mint {
            amount: token_amount,
        },
        LedgerCall::Approve {
            spender: ctx.exchange_address().clone(),
            amount: token_amount,
        },
        LedgerCall::CreatePool {
            token_amount,
            eth_amount,
        },
    ];

    let mut receipts = Vec::with_capacity(steps.len());
    for call in steps {
        receipts.push(ctx.submit_settled(call).await?);
    }
    Ok(receipts)
}

/// Seed the pool from `bootstrap` unless it already holds liquidity
pub async fn ensure_initialized(
    ctx: &ExchangeContext,
    bootstrap: &BootstrapConfig,
) -> Result<BootstrapOutcome> {
    let pool = ctx.snapshot().await?;
    if pool.is_initialized() {
        tracing::info!(%pool, "Pool already exists, skipping initialization");
        return Ok(BootstrapOutcome::AlreadyInitialized(pool));
    }

    let eth_amount = Wei::from(bootstrap.eth_reserve);
    ctx.require_balance(Asset::Eth, eth_amount).await?;

    let receipts =
        initialize_pool(ctx, Wei::from(bootstrap.token_reserve), eth_amount).await?;
    let pool = ctx.snapshot().await?;
    tracing::info!(%pool, "Pool initialized");
    Ok(BootstrapOutcome::Initialized { pool, receipts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::{account, ledger};

    fn bootstrap(operator: u8) -> BootstrapConfig {
        BootstrapConfig {
            operator: account(operator),
            ..BootstrapConfig::default()
        }
    }

    #[tokio::test]
    async fn test_ensure_initialized_seeds_once() {
        let (_sim, client) = ledger(&[1]).await;
        let ctx = ExchangeContext::new(client, account(1));

        let first = ensure_initialized(&ctx, &bootstrap(1)).await.unwrap();
        match &first {
            BootstrapOutcome::Initialized { receipts, .. } => assert_eq!(receipts.len(), 3),
            other => panic!("expected initialization, got {:?}", other),
        }
        assert_eq!(
            *first.pool(),
            Pool::new(Wei::from(5000u64), Wei::from(5000u64))
        );

        let second = ensure_initialized(&ctx, &bootstrap(1)).await.unwrap();
        assert!(matches!(second, BootstrapOutcome::AlreadyInitialized(_)));
        assert_eq!(second.pool(), first.pool());
    }

    #[tokio::test]
    async fn test_unfunded_operator() {
        let (_sim, client) = ledger(&[]).await;
        let ctx = ExchangeContext::new(client, account(4));
        let err = ensure_initialized(&ctx, &bootstrap(4)).await.unwrap_err();
        assert!(matches!(
            err.as_protocol(),
            Some(ProtocolError::InsufficientBalance {
                asset: Asset::Eth,
                ..
            })
        ));
        assert!(!ctx.snapshot().await.unwrap().is_initialized());
    }

    #[tokio::test]
    async fn test_initialize_twice_is_rejected() {
        let (_sim, client) = ledger(&[1]).await;
        let ctx = ExchangeContext::new(client, account(1));
        initialize_pool(&ctx, Wei::from(10u64), Wei::from(10u64))
            .await
            .unwrap();
        let err = initialize_pool(&ctx, Wei::from(10u64), Wei::from(10u64))
            .await
            .unwrap_err();
        match err.as_protocol() {
            Some(ProtocolError::LedgerRejected { operation, .. }) => {
                assert_eq!(operation, "createPool")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
