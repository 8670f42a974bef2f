//! Swap Engine
//!
//! Each swap runs `Quote -> Validate -> Submit -> Settled | Reverted` against
//! a fresh snapshot. Quotes bound the rate the ledger may settle at; the
//! ledger makes the final call. Nothing is retried.
//!
//! Rates are 1e18-scaled. Selling tokens is bounded above in wei per token;
//! buying tokens is bounded below in tokens per ETH.

use exchange_core::constants::rate_scale;
use exchange_core::{Asset, ProtocolError, Result, Wei};
use ledger_client::{LedgerCall, TxReceipt};

use crate::calculator::{bracket, expected_output, SlippagePct};
use crate::context::ExchangeContext;
use crate::state::{EthForTokenQuote, Pool, SwapOutcome, SwapPhase, TokenForEthQuote};

fn require_amount(amount: Wei, what: &str) -> std::result::Result<(), ProtocolError> {
    if amount.is_zero() {
        return Err(ProtocolError::InvalidAmount {
            message: format!("{} must be positive", what),
        });
    }
    Ok(())
}

/// Quote selling `token_amount` tokens for ETH
pub fn quote_token_for_eth(
    pool: &Pool,
    token_amount: Wei,
    slippage: SlippagePct,
) -> std::result::Result<TokenForEthQuote, ProtocolError> {
    pool.require_initialized()?;
    let base_rate = pool.spot_rate()?.eth_per_token_wei;
    let band = bracket(base_rate, slippage)?;
    Ok(TokenForEthQuote {
        token_amount,
        base_rate,
        max_acceptable_rate: band.max_rate,
        expected_output: expected_output(token_amount, base_rate)?,
    })
}

/// Check the seller holds the tokens being sold
pub fn validate(user_token_balance: Wei, token_amount: Wei) -> std::result::Result<(), ProtocolError> {
    if user_token_balance < token_amount {
        return Err(ProtocolError::InsufficientBalance {
            asset: Asset::Token,
            required: token_amount,
            available: user_token_balance,
        });
    }
    Ok(())
}

/// Quote buying tokens with `wei_amount` wei
///
/// The expected rate is `(token_reserve / eth_reserve) * 10^18`: the reserve
/// ratio is floored to a whole number before scaling.
pub fn quote_eth_for_token(
    pool: &Pool,
    wei_amount: Wei,
    slippage: SlippagePct,
) -> std::result::Result<EthForTokenQuote, ProtocolError> {
    if pool.eth_reserve.is_zero() {
        return Err(ProtocolError::ZeroEthReserve);
    }
    let expected_rate = (pool.token_reserve / pool.eth_reserve)
        .checked_mul(rate_scale())
        .ok_or(ProtocolError::Overflow)?;
    let band = bracket(expected_rate, slippage)?;
    Ok(EthForTokenQuote {
        wei_amount,
        expected_rate,
        min_acceptable_rate: band.min_rate,
        expected_output: expected_output(wei_amount, expected_rate)?,
    })
}

fn log_phase(phase: SwapPhase, direction: &'static str) {
    tracing::debug!(phase = %phase, direction, "Swap phase");
}

/// Settle a swap receipt; a failure becomes `SwapReverted`
fn settle<Q>(quote: Q, receipt: TxReceipt, direction: &'static str) -> Result<SwapOutcome<Q>> {
    if let Some(reason) = receipt.failure_reason() {
        log_phase(SwapPhase::Reverted, direction);
        tracing::warn!(tx_hash = %receipt.tx_hash, reason, direction, "Swap reverted");
        return Err(ProtocolError::SwapReverted {
            tx_hash: receipt.tx_hash.clone(),
            reason: reason.to_string(),
        }
        .into());
    }
    log_phase(SwapPhase::Settled, direction);
    Ok(SwapOutcome { quote, receipt })
}

/// Sell `token_amount` tokens for ETH
pub async fn swap_tokens_for_eth(
    ctx: &ExchangeContext,
    token_amount: Wei,
    slippage_pct: i64,
) -> Result<SwapOutcome<TokenForEthQuote>> {
    const DIRECTION: &str = "token_for_eth";
    let slippage = SlippagePct::new(slippage_pct)?;
    require_amount(token_amount, "token amount")?;

    log_phase(SwapPhase::Quote, DIRECTION);
    let pool = ctx.snapshot().await?;
    let quote = quote_token_for_eth(&pool, token_amount, slippage)?;
    tracing::debug!(
        base_rate = %quote.base_rate,
        max_rate = %quote.max_acceptable_rate,
        expected_eth = %quote.expected_output,
        "Quoted token sale"
    );

    log_phase(SwapPhase::Validate, DIRECTION);
    let balance = ctx.balance(Asset::Token).await?;
    validate(balance, token_amount)?;
    ctx.ensure_allowance(ctx.exchange_address(), token_amount).await?;

    log_phase(SwapPhase::Submit, DIRECTION);
    let receipt = ctx
        .ledger
        .submit(
            &ctx.account,
            LedgerCall::SwapTokensForEth {
                token_amount,
                max_rate: quote.max_acceptable_rate,
            },
        )
        .await?;
    settle(quote, receipt, DIRECTION)
}

/// Buy tokens with `wei_amount` wei
pub async fn swap_eth_for_tokens(
    ctx: &ExchangeContext,
    wei_amount: Wei,
    slippage_pct: i64,
) -> Result<SwapOutcome<EthForTokenQuote>> {
    const DIRECTION: &str = "eth_for_token";
    let slippage = SlippagePct::new(slippage_pct)?;
    require_amount(wei_amount, "wei amount")?;

    log_phase(SwapPhase::Quote, DIRECTION);
    let pool = ctx.snapshot().await?;
    let quote = quote_eth_for_token(&pool, wei_amount, slippage)?;
    tracing::debug!(
        expected_rate = %quote.expected_rate,
        min_rate = %quote.min_acceptable_rate,
        expected_tokens = %quote.expected_output,
        "Quoted token purchase"
    );

    log_phase(SwapPhase::Submit, DIRECTION);
    let receipt = ctx
        .ledger
        .submit(
            &ctx.account,
            LedgerCall::SwapEthForTokens {
                wei_amount,
                min_rate: quote.min_acceptable_rate,
            },
        )
        .await?;
    settle(quote, receipt, DIRECTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::{account, mint, seeded};

    fn pct(p: i64) -> SlippagePct {
        SlippagePct::new(p).unwrap()
    }

    fn pool(tokens: u64, eth: u64) -> Pool {
        Pool::new(Wei::from(tokens), Wei::from(eth))
    }

    #[test]
    fn test_eth_for_token_reference_quote() {
        let quote = quote_eth_for_token(&pool(5000, 5000), Wei::from(100u64), pct(1)).unwrap();
        assert_eq!(quote.expected_rate, rate_scale());
        assert_eq!(quote.min_acceptable_rate, Wei::from(990_000_000_000_000_000u64));
        assert_eq!(quote.expected_output, Wei::from(100u64));
    }

    #[test]
    fn test_eth_for_token_floors_ratio_first() {
        // 7500 / 5000 floors to 1 before scaling
        let quote = quote_eth_for_token(&pool(7500, 5000), Wei::from(100u64), pct(0)).unwrap();
        assert_eq!(quote.expected_rate, rate_scale());
        assert_eq!(quote.expected_output, Wei::from(100u64));

        // Fewer tokens than wei floors the rate to zero
        let quote = quote_eth_for_token(&pool(4000, 5000), Wei::from(100u64), pct(5)).unwrap();
        assert!(quote.expected_rate.is_zero());
        assert!(quote.min_acceptable_rate.is_zero());
    }

    #[test]
    fn test_eth_for_token_zero_eth_reserve() {
        assert!(matches!(
            quote_eth_for_token(&pool(0, 0), Wei::from(1u64), pct(1)),
            Err(ProtocolError::ZeroEthReserve)
        ));
    }

    #[test]
    fn test_token_for_eth_quote() {
        let quote = quote_token_for_eth(&pool(10_000, 5000), Wei::from(200u64), pct(10)).unwrap();
        assert_eq!(quote.base_rate, rate_scale() / 2u64);
        assert_eq!(quote.max_acceptable_rate, rate_scale() * 55u64 / 100u64);
        assert_eq!(quote.expected_output, Wei::from(100u64));
    }

    #[test]
    fn test_token_for_eth_uninitialized() {
        assert!(matches!(
            quote_token_for_eth(&pool(0, 0), Wei::from(1u64), pct(1)),
            Err(ProtocolError::PoolUninitialized)
        ));
    }

    #[test]
    fn test_requote_is_idempotent() {
        let p = pool(12_345, 6_789);
        let a = quote_token_for_eth(&p, Wei::from(321u64), pct(3)).unwrap();
        let b = quote_token_for_eth(&p, Wei::from(321u64), pct(3)).unwrap();
        assert_eq!(a, b);
        let c = quote_eth_for_token(&p, Wei::from(321u64), pct(3)).unwrap();
        let d = quote_eth_for_token(&p, Wei::from(321u64), pct(3)).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn test_validate_balance() {
        assert!(validate(Wei::from(10u64), Wei::from(10u64)).is_ok());
        assert!(matches!(
            validate(Wei::from(9u64), Wei::from(10u64)),
            Err(ProtocolError::InsufficientBalance {
                asset: Asset::Token,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_swap_eth_for_tokens_settles() {
        let (_sim, ctx) = seeded(5000, 5000).await;
        let trader = ctx.acting_as(account(2));

        let outcome = swap_eth_for_tokens(&trader, Wei::from(100u64), 1).await.unwrap();
        assert!(outcome.receipt.is_success());
        assert_eq!(outcome.quote.expected_output, Wei::from(100u64));

        // Constant product settles below the spot projection
        assert_eq!(trader.balance(Asset::Token).await.unwrap(), Wei::from(98u64));
        assert_eq!(trader.snapshot().await.unwrap(), pool(4902, 5100));
    }

    #[tokio::test]
    async fn test_swap_tokens_for_eth_raises_allowance() {
        let (_sim, ctx) = seeded(5000, 5000).await;
        let trader = ctx.acting_as(account(2));
        mint(&trader, 100).await;

        let outcome = swap_tokens_for_eth(&trader, Wei::from(100u64), 1).await.unwrap();
        assert!(outcome.receipt.is_success());
        assert_eq!(trader.balance(Asset::Token).await.unwrap(), Wei::zero());
        assert_eq!(trader.snapshot().await.unwrap(), pool(5100, 4902));
    }

    #[tokio::test]
    async fn test_swap_tokens_without_balance_submits_nothing() {
        let (_sim, ctx) = seeded(5000, 5000).await;
        let trader = ctx.acting_as(account(2));
        let before = ctx.snapshot().await.unwrap();

        let err = swap_tokens_for_eth(&trader, Wei::from(100u64), 1).await.unwrap_err();
        assert_eq!(err.error_code(), "insufficient_balance");
        assert_eq!(ctx.snapshot().await.unwrap(), before);
        assert!(trader
            .ledger
            .allowance(&trader.account, trader.exchange_address())
            .await
            .unwrap()
            .is_zero());
    }

    #[tokio::test]
    async fn test_swap_rejects_bad_slippage_and_zero_amount() {
        let (_sim, ctx) = seeded(5000, 5000).await;
        let err = swap_eth_for_tokens(&ctx, Wei::from(100u64), 101).await.unwrap_err();
        assert_eq!(err.error_code(), "invalid_slippage");
        let err = swap_eth_for_tokens(&ctx, Wei::zero(), 1).await.unwrap_err();
        assert_eq!(err.error_code(), "invalid_amount");
    }

    #[tokio::test]
    async fn test_swap_against_empty_pool() {
        let (_sim, client) = crate::context::test_support::ledger(&[2]).await;
        let trader = ExchangeContext::new(client, account(2));
        let err = swap_eth_for_tokens(&trader, Wei::from(100u64), 1).await.unwrap_err();
        assert_eq!(err.error_code(), "zero_eth_reserve");
        let err = swap_tokens_for_eth(&trader, Wei::from(100u64), 1).await.unwrap_err();
        assert_eq!(err.error_code(), "pool_uninitialized");
    }

    #[tokio::test]
    async fn test_swap_reverts_when_rate_moves() {
        // A zero-slippage quote goes stale once another trade moves the pool
        let (_sim, ctx) = seeded(5000, 5000).await;
        let quote = quote_eth_for_token(&ctx.snapshot().await.unwrap(), Wei::from(100u64), pct(0)).unwrap();

        let whale = ctx.acting_as(account(3));
        swap_eth_for_tokens(&whale, Wei::from(1000u64), 100).await.unwrap();

        let receipt = ctx
            .ledger
            .submit(
                &ctx.account,
                LedgerCall::SwapEthForTokens {
                    wei_amount: quote.wei_amount,
                    min_rate: quote.min_acceptable_rate,
                },
            )
            .await
            .unwrap();
        let err = settle(quote, receipt, "eth_for_token").unwrap_err();
        assert!(matches!(
            err.as_protocol(),
            Some(ProtocolError::SwapReverted { .. })
        ));
        assert!(err.as_protocol().map(|e| e.is_settlement_failure()).unwrap_or(false));
    }
}
