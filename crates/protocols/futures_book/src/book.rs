//! Futures creation and execution

use amm::ExchangeContext;
use exchange_core::{Asset, ProtocolError, Result, Wei};
use ledger_client::{LedgerCall, TxReceipt};

fn require_terms(amount: Wei, exchange_rate: Wei) -> std::result::Result<(), ProtocolError> {
    if amount.is_zero() {
        return Err(ProtocolError::InvalidAmount {
            message: "future amount must be positive".to_string(),
        });
    }
    if exchange_rate.is_zero() {
        return Err(ProtocolError::InvalidAmount {
            message: "exchange rate must be positive".to_string(),
        });
    }
    Ok(())
}

/// Stake `wei_amount` to buy tokens at `exchange_rate` after `duration_days`
///
/// The ETH travels with the submission; the ledger checks the balance.
pub async fn create_buy_future(
    ctx: &ExchangeContext,
    exchange_rate: Wei,
    wei_amount: Wei,
    duration_days: u64,
) -> Result<TxReceipt> {
    require_terms(wei_amount, exchange_rate)?;
    tracing::info!(
        buyer = %ctx.account,
        wei = %wei_amount,
        rate = %exchange_rate,
        duration_days,
        "Creating buy future"
    );
    ctx.submit_settled(LedgerCall::CreateBuyFuture {
        exchange_rate,
        wei_amount,
        duration_days,
    })
    .await
}

/// Escrow `token_amount` to sell at `exchange_rate` after `duration_days`
pub async fn create_sell_future(
    ctx: &ExchangeContext,
    token_amount: Wei,
    exchange_rate: Wei,
    duration_days: u64,
) -> Result<TxReceipt> {
    require_terms(token_amount, exchange_rate)?;
    ctx.require_balance(Asset::Token, token_amount).await?;
    ctx.ensure_allowance(ctx.futures_address(), token_amount)
        .await?;

    tracing::info!(
        seller = %ctx.account,
        tokens = %token_amount,
        rate = %exchange_rate,
        duration_days,
        "Creating sell future"
    );
    ctx.submit_settled(LedgerCall::CreateSellFuture {
        token_amount,
        exchange_rate,
        duration_days,
    })
    .await
}

/// Execute future `id` once it has expired
pub async fn execute_future(ctx: &ExchangeContext, id: u64) -> Result<TxReceipt> {
    let future = ctx
        .ledger
        .future(id)
        .await?
        .ok_or(ProtocolError::FutureNotFound { id })?;
    if future.executed {
        return Err(ProtocolError::AlreadyExecuted { id }.into());
    }

    let now = ctx.ledger.now().await?;
    if now < future.expire_at {
        return Err(ProtocolError::NotYetExpired {
            id,
            expire_at: future.expire_at,
            now,
        }
        .into());
    }

    tracing::info!(id, buy = future.is_buy_order, "Executing future");
    ctx.submit_settled(LedgerCall::ExecuteFuture { id }).await
}
