//! Constant-Ratio Pool Protocol
//!
//! Quotes and executes swaps and liquidity changes against a single
//! token/ETH pool held by the exchange contract. Every operation reads a
//! fresh snapshot, bounds the acceptable rate by a slippage percentage and
//! leaves the final decision to the ledger.

pub mod calculator;
pub mod context;
pub mod liquidity;
pub mod pool_setup;
pub mod pool_state;
pub mod state;
pub mod swap;

// Re-exports
pub use calculator::{
    bracket, display_rates, expected_output, proportional, spot_rate, RateBand, SlippagePct,
    SpotRate,
};
pub use context::ExchangeContext;
pub use liquidity::{
    add_liquidity, entitlement, quote_add, quote_remove, rate_band, remove_all_liquidity,
    remove_liquidity,
};
pub use pool_setup::{ensure_initialized, initialize_pool, BootstrapOutcome};
pub use pool_state::{is_initialized, snapshot, BalanceDerived, PoolSource, ReserveGetters};
pub use state::{
    Entitlement, EthForTokenQuote, LiquidityOutcome, LiquidityQuote, Pool, SwapOutcome,
    SwapPhase, TokenForEthQuote,
};
pub use swap::{
    quote_eth_for_token, quote_token_for_eth, swap_eth_for_tokens, swap_tokens_for_eth, validate,
};
