//! Per-call execution context

use std::sync::Arc;

use exchange_core::{Address, Asset, ProtocolError, Result, Wei};
use ledger_client::{LedgerCall, LedgerClient, TxReceipt};

use crate::pool_state::{self, PoolSource};
use crate::state::Pool;

/// Ledger handle, acting account and reserve source for one call
#[derive(Clone)]
pub struct ExchangeContext {
    pub ledger: LedgerClient,
    pub account: Address,
    source: Arc<dyn PoolSource>,
}

impl ExchangeContext {
    /// Context using the reserve source named in the ledger configuration
    pub fn new(ledger: LedgerClient, account: Address) -> Self {
        let source = pool_state::source_for(ledger.config().reserve_source);
        Self {
            ledger,
            account,
            source,
        }
    }

    pub fn with_source(ledger: LedgerClient, account: Address, source: Arc<dyn PoolSource>) -> Self {
        Self {
            ledger,
            account,
            source,
        }
    }

    /// Same ledger and source, different acting account
    pub fn acting_as(&self, account: Address) -> Self {
        Self {
            ledger: self.ledger.clone(),
            account,
            source: Arc::clone(&self.source),
        }
    }

    pub fn exchange_address(&self) -> &Address {
        self.ledger.exchange_address()
    }

    pub fn futures_address(&self) -> &Address {
        self.ledger.futures_address()
    }

    pub fn source(&self) -> &dyn PoolSource {
        self.source.as_ref()
    }

    /// Fresh reserve snapshot
    pub async fn snapshot(&self) -> Result<Pool> {
        Ok(pool_state::snapshot(self.source.as_ref(), &self.ledger).await?)
    }

    pub async fn balance(&self, asset: Asset) -> Result<Wei> {
        Ok(self.ledger.balance(&self.account, asset).await?)
    }

    /// Fail with `InsufficientBalance` unless the account holds `required` of `asset`
    pub async fn require_balance(&self, asset: Asset, required: Wei) -> Result<()> {
        let available = self.balance(asset).await?;
        if available < required {
            return Err(ProtocolError::InsufficientBalance {
                asset,
                required,
                available,
            }
            .into());
        }
        Ok(())
    }

    /// Raise the token allowance for `spender` to `amount` if it is lower
    ///
    /// Never lowers an allowance. The approval is awaited and the allowance
    /// re-read before returning.
    pub async fn ensure_allowance(&self, spender: &Address, amount: Wei) -> Result<()> {
        let current = self.ledger.allowance(&self.account, spender).await?;
        if current >= amount {
            tracing::debug!(spender = %spender, allowance = %current, "Allowance sufficient");
            return Ok(());
        }

        tracing::info!(
            spender = %spender,
            current = %current,
            required = %amount,
            "Raising token allowance"
        );
        self.submit_settled(LedgerCall::Approve {
            spender: spender.clone(),
            amount,
        })
        .await?;

        let updated = self.ledger.allowance(&self.account, spender).await?;
        if updated < amount {
            return Err(ProtocolError::LedgerRejected {
                operation: "approve".to_string(),
                reason: format!("allowance {} still below {}", updated, amount),
            }
            .into());
        }
        Ok(())
    }

    /// Submit a call; a failed receipt becomes `LedgerRejected`
    pub async fn submit_settled(&self, call: LedgerCall) -> Result<TxReceipt> {
        let operation = call.name();
        let receipt = self.ledger.submit(&self.account, call).await?;
        match receipt.failure_reason() {
            None => Ok(receipt),
            Some(reason) => Err(ProtocolError::LedgerRejected {
                operation: operation.to_string(),
                reason: reason.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use exchange_core::LedgerConfig;
    use ledger_client::{FeeConfig, SimulatedLedger};

    pub fn account(n: u8) -> Address {
        Address::new(format!("0x{:040x}", n))
    }

    /// Fee-free simulated ledger with `account(n)` funded with ETH for each `n` in `funded`
    pub async fn ledger(funded: &[u8]) -> (Arc<SimulatedLedger>, LedgerClient) {
        let config = LedgerConfig::default();
        let sim = Arc::new(SimulatedLedger::with_fee(&config, FeeConfig::zero()));
        for n in funded {
            sim.fund_eth(&account(*n), Wei::from(1_000_000u64)).await;
        }
        let client = LedgerClient::new(sim.clone(), config);
        (sim, client)
    }

    /// Pool seeded by `account(1)` with the given reserves
    pub async fn seeded(tokens: u64, eth: u64) -> (Arc<SimulatedLedger>, ExchangeContext) {
        let (sim, client) = ledger(&[1, 2, 3]).await;
        let ctx = ExchangeContext::new(client, account(1));
        crate::pool_setup::initialize_pool(&ctx, Wei::from(tokens), Wei::from(eth))
            .await
            .unwrap();
        (sim, ctx)
    }

    /// Mint `amount` tokens to the context's account
    pub async fn mint(ctx: &ExchangeContext, amount: u64) {
        ctx.submit_settled(LedgerCall::Mint {
            amount: Wei::from(amount),
        })
        .await
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_allowance_raised_only_when_short() {
        let (_sim, client) = ledger(&[1]).await;
        let ctx = ExchangeContext::new(client, account(1));
        let spender = account(9);

        ctx.ensure_allowance(&spender, Wei::from(50u64)).await.unwrap();
        assert_eq!(
            ctx.ledger.allowance(&ctx.account, &spender).await.unwrap(),
            Wei::from(50u64)
        );

        // A smaller requirement leaves the larger allowance in place
        ctx.ensure_allowance(&spender, Wei::from(10u64)).await.unwrap();
        assert_eq!(
            ctx.ledger.allowance(&ctx.account, &spender).await.unwrap(),
            Wei::from(50u64)
        );
    }

    #[tokio::test]
    async fn test_failed_receipt_is_ledger_rejected() {
        let (_sim, client) = ledger(&[1]).await;
        let ctx = ExchangeContext::new(client, account(1));
        let err = ctx
            .submit_settled(LedgerCall::ExecuteFuture { id: 3 })
            .await
            .unwrap_err();
        match err.as_protocol() {
            Some(ProtocolError::LedgerRejected { operation, .. }) => {
                assert_eq!(operation, "executeFuture")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_require_balance() {
        let (_sim, client) = ledger(&[1]).await;
        let ctx = ExchangeContext::new(client, account(1));
        ctx.require_balance(Asset::Eth, Wei::from(1_000u64)).await.unwrap();
        let err = ctx
            .require_balance(Asset::Token, Wei::from(1u64))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "insufficient_balance");
    }

    #[tokio::test]
    async fn test_acting_as_keeps_ledger() {
        let (_sim, ctx) = seeded(5000, 5000).await;
        let other = ctx.acting_as(account(2));
        assert_eq!(other.account, account(2));
        assert_eq!(other.snapshot().await.unwrap(), ctx.snapshot().await.unwrap());
    }
}
