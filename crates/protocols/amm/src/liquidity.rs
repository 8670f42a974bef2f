//! Liquidity Engine
//!
//! Adds and removes liquidity at the pool's current ratio. Both directions
//! carry the same rate band: wei per token bounded above and tokens per ETH
//! bounded below. Local checks are optimistic; the ledger re-checks the
//! caller's LP share when it settles.

use exchange_core::{Asset, ProtocolError, Result, Wei};
use ledger_client::LedgerCall;

use crate::calculator::{bracket, proportional, RateBand, SlippagePct};
use crate::context::ExchangeContext;
use crate::state::{Entitlement, LiquidityOutcome, LiquidityQuote, Pool};

/// Rate band applied to every liquidity call
///
/// `max_rate` brackets wei per token, `min_rate` brackets tokens per ETH.
pub fn rate_band(pool: &Pool, slippage: SlippagePct) -> std::result::Result<RateBand, ProtocolError> {
    pool.require_initialized()?;
    let spot = pool.spot_rate()?;
    Ok(RateBand {
        max_rate: bracket(spot.eth_per_token_wei, slippage)?.max_rate,
        min_rate: bracket(spot.token_per_eth_wei, slippage)?.min_rate,
    })
}

/// Quote depositing `eth_amount` wei alongside tokens at the current ratio
pub fn quote_add(
    pool: &Pool,
    eth_amount: Wei,
    slippage: SlippagePct,
) -> std::result::Result<LiquidityQuote, ProtocolError> {
    let band = rate_band(pool, slippage)?;
    Ok(LiquidityQuote {
        eth_amount,
        expected_token_amount: proportional(eth_amount, pool.token_reserve, pool.eth_reserve)?,
        max_exchange_rate: band.max_rate,
        min_exchange_rate: band.min_rate,
    })
}

/// Quote withdrawing `eth_amount` wei and the matching tokens
///
/// Only checks the pool can pay out; whether the caller's share covers it
/// is decided by the ledger.
pub fn quote_remove(
    pool: &Pool,
    eth_amount: Wei,
    slippage: SlippagePct,
) -> std::result::Result<LiquidityQuote, ProtocolError> {
    let quote = quote_add(pool, eth_amount, slippage)?;
    if pool.eth_reserve < eth_amount {
        return Err(ProtocolError::InsufficientPoolLiquidity {
            asset: Asset::Eth,
            required: eth_amount,
            available: pool.eth_reserve,
        });
    }
    if pool.token_reserve < quote.expected_token_amount {
        return Err(ProtocolError::InsufficientPoolLiquidity {
            asset: Asset::Token,
            required: quote.expected_token_amount,
            available: pool.token_reserve,
        });
    }
    Ok(quote)
}

fn require_eth(eth_amount: Wei) -> std::result::Result<(), ProtocolError> {
    if eth_amount.is_zero() {
        return Err(ProtocolError::InvalidAmount {
            message: "eth amount must be positive".to_string(),
        });
    }
    Ok(())
}

/// Deposit `eth_amount` wei plus the proportional tokens
pub async fn add_liquidity(
    ctx: &ExchangeContext,
    eth_amount: Wei,
    slippage_pct: i64,
) -> Result<LiquidityOutcome> {
    let slippage = SlippagePct::new(slippage_pct)?;
    require_eth(eth_amount)?;

    let pool = ctx.snapshot().await?;
    let quote = quote_add(&pool, eth_amount, slippage)?;
    tracing::debug!(
        eth = %eth_amount,
        tokens = %quote.expected_token_amount,
        max_rate = %quote.max_exchange_rate,
        min_rate = %quote.min_exchange_rate,
        "Quoted liquidity deposit"
    );

    ctx.require_balance(Asset::Token, quote.expected_token_amount)
        .await?;
    ctx.ensure_allowance(ctx.exchange_address(), quote.expected_token_amount)
        .await?;

    let receipt = ctx
        .submit_settled(LedgerCall::AddLiquidity {
            eth_amount,
            max_rate: quote.max_exchange_rate,
            min_rate: quote.min_exchange_rate,
        })
        .await?;
    Ok(LiquidityOutcome {
        quote: Some(quote),
        receipt,
    })
}

/// Withdraw `eth_amount` wei plus the proportional tokens
pub async fn remove_liquidity(
    ctx: &ExchangeContext,
    eth_amount: Wei,
    slippage_pct: i64,
) -> Result<LiquidityOutcome> {
    let slippage = SlippagePct::new(slippage_pct)?;
    require_eth(eth_amount)?;

    let pool = ctx.snapshot().await?;
    let quote = quote_remove(&pool, eth_amount, slippage)?;
    tracing::debug!(
        eth = %eth_amount,
        tokens = %quote.expected_token_amount,
        "Quoted liquidity withdrawal"
    );

    let receipt = ctx
        .submit_settled(LedgerCall::RemoveLiquidity {
            eth_amount,
            max_rate: quote.max_exchange_rate,
            min_rate: quote.min_exchange_rate,
        })
        .await?;
    Ok(LiquidityOutcome {
        quote: Some(quote),
        receipt,
    })
}

/// Withdraw the caller's whole LP position
///
/// An empty position fails with `NoLiquidityToRemove` before slippage is
/// even looked at.
pub async fn remove_all_liquidity(
    ctx: &ExchangeContext,
    slippage_pct: i64,
) -> Result<LiquidityOutcome> {
    let lp_balance = ctx.balance(Asset::Liquidity).await?;
    if lp_balance.is_zero() {
        return Err(ProtocolError::NoLiquidityToRemove.into());
    }
    let slippage = SlippagePct::new(slippage_pct)?;

    let pool = ctx.snapshot().await?;
    let band = rate_band(&pool, slippage)?;
    tracing::debug!(lp_balance = %lp_balance, "Withdrawing full liquidity position");

    let receipt = ctx
        .submit_settled(LedgerCall::RemoveAllLiquidity {
            max_rate: band.max_rate,
            min_rate: band.min_rate,
        })
        .await?;
    Ok(LiquidityOutcome {
        quote: None,
        receipt,
    })
}

/// The caller's LP balance and the pool it was read against
pub async fn entitlement(ctx: &ExchangeContext) -> Result<Entitlement> {
    let lp_balance = ctx.balance(Asset::Liquidity).await?;
    let pool = ctx.snapshot().await?;
    Ok(Entitlement { lp_balance, pool })
}
