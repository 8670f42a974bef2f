//! Data Transfer Objects for API requests and responses
//!
//! Amounts and rates cross the wire as decimal strings; rates keep their
//! 1e18 scale.

use amm::{Entitlement, EthForTokenQuote, LiquidityOutcome, Pool, TokenForEthQuote};
use exchange_core::{Address, Timestamp};
use futures_book::FutureView;
use ledger_client::TxReceipt;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

/// Pool reserves and rates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolResponse {
    pub name: String,
    pub token_name: String,
    pub token_symbol: String,
    pub initialized: bool,
    pub token_reserve: String,
    pub eth_reserve: String,
    /// Tokens per ETH, 1e18-scaled; absent while the pool is empty
    pub token_per_eth_wei: Option<String>,
    /// Wei per token, 1e18-scaled; absent while the pool is empty
    pub eth_per_token_wei: Option<String>,
    /// Unscaled token/ETH ratio for display
    pub token_eth_rate: f64,
    pub eth_token_rate: f64,
}

/// Balances of one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancesResponse {
    pub address: String,
    pub eth: String,
    pub token: String,
    pub liquidity: String,
}

/// Swap submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    pub from: String,
    /// Tokens when selling, wei when buying
    pub amount: String,
    pub slippage_pct: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    TokenForEth,
    EthForToken,
}

/// Quote-only swap request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuoteRequest {
    pub direction: SwapDirection,
    pub amount: String,
    pub slippage_pct: i64,
}

/// Swap quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuoteResponse {
    pub direction: SwapDirection,
    pub amount: String,
    /// Wei per token when selling, tokens per ETH when buying
    pub rate: String,
    /// Upper bound when selling, lower bound when buying
    pub bound_rate: String,
    pub expected_output: String,
}

impl From<TokenForEthQuote> for SwapQuoteResponse {
    fn from(q: TokenForEthQuote) -> Self {
        Self {
            direction: SwapDirection::TokenForEth,
            amount: q.token_amount.to_string(),
            rate: q.base_rate.to_string(),
            bound_rate: q.max_acceptable_rate.to_string(),
            expected_output: q.expected_output.to_string(),
        }
    }
}

impl From<EthForTokenQuote> for SwapQuoteResponse {
    fn from(q: EthForTokenQuote) -> Self {
        Self {
            direction: SwapDirection::EthForToken,
            amount: q.wei_amount.to_string(),
            rate: q.expected_rate.to_string(),
            bound_rate: q.min_acceptable_rate.to_string(),
            expected_output: q.expected_output.to_string(),
        }
    }
}

/// Settled transaction reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResponse {
    pub tx_hash: String,
    pub block_number: u64,
}

impl From<&TxReceipt> for TxResponse {
    fn from(receipt: &TxReceipt) -> Self {
        Self {
            tx_hash: receipt.tx_hash.to_string(),
            block_number: receipt.block_number,
        }
    }
}

/// Settled swap with the quote it was bounded by
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapResponse {
    #[serde(flatten)]
    pub tx: TxResponse,
    pub quote: SwapQuoteResponse,
}

/// Add or remove an ETH amount of liquidity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityRequest {
    pub from: String,
    pub eth_amount: String,
    pub slippage_pct: i64,
}

/// Withdraw the caller's whole position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveAllRequest {
    pub from: String,
    pub slippage_pct: i64,
}

/// Settled liquidity change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityResponse {
    #[serde(flatten)]
    pub tx: TxResponse,
    pub eth_amount: Option<String>,
    pub expected_token_amount: Option<String>,
    pub max_exchange_rate: Option<String>,
    pub min_exchange_rate: Option<String>,
}

impl From<LiquidityOutcome> for LiquidityResponse {
    fn from(outcome: LiquidityOutcome) -> Self {
        let quote = outcome.quote;
        Self {
            tx: TxResponse::from(&outcome.receipt),
            eth_amount: quote.map(|q| q.eth_amount.to_string()),
            expected_token_amount: quote.map(|q| q.expected_token_amount.to_string()),
            max_exchange_rate: quote.map(|q| q.max_exchange_rate.to_string()),
            min_exchange_rate: quote.map(|q| q.min_exchange_rate.to_string()),
        }
    }
}

/// LP position of one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementResponse {
    pub address: String,
    pub lp_balance: String,
    pub token_reserve: String,
    pub eth_reserve: String,
}

impl EntitlementResponse {
    pub fn new(address: &Address, entitlement: &Entitlement) -> Self {
        Self {
            address: address.to_string(),
            lp_balance: entitlement.lp_balance.to_string(),
            token_reserve: entitlement.pool.token_reserve.to_string(),
            eth_reserve: entitlement.pool.eth_reserve.to_string(),
        }
    }
}

/// Futures listing parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuturesQuery {
    pub start: Option<u64>,
    pub count: Option<u64>,
    /// Account whose commitments are flagged as own
    pub viewer: Option<String>,
}

/// A futures commitment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FutureDto {
    pub id: u64,
    pub buyer: String,
    pub amount: String,
    pub exchange_rate: String,
    pub is_buy_order: bool,
    pub expire_at: Timestamp,
    pub executed: bool,
    pub is_own: bool,
    pub is_executable: bool,
    pub seconds_remaining: i64,
}

impl From<FutureView> for FutureDto {
    fn from(view: FutureView) -> Self {
        let c = view.contract;
        Self {
            id: c.id,
            buyer: c.buyer.to_string(),
            amount: c.amount.to_string(),
            exchange_rate: c.exchange_rate.to_string(),
            is_buy_order: c.is_buy_order,
            expire_at: c.expire_at,
            executed: c.executed,
            is_own: view.is_own,
            is_executable: view.is_executable,
            seconds_remaining: view.seconds_remaining,
        }
    }
}

/// One page of the futures book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesPageResponse {
    pub items: Vec<FutureDto>,
    pub next_index: u64,
    pub exhausted: bool,
    pub now: Timestamp,
}

/// Stake ETH for a future token purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyFutureRequest {
    pub from: String,
    /// Tokens per ETH, 1e18-scaled
    pub exchange_rate: String,
    pub wei_amount: String,
    pub duration_days: u64,
}

/// Escrow tokens for a future sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellFutureRequest {
    pub from: String,
    pub token_amount: String,
    /// Tokens per ETH, 1e18-scaled
    pub exchange_rate: String,
    pub duration_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteFutureRequest {
    pub from: String,
}

impl PoolResponse {
    pub fn new(pool: &Pool, info: &exchange_core::ExchangeInfo) -> Self {
        let spot = pool.spot_rate().ok();
        let (token_eth_rate, eth_token_rate) =
            amm::display_rates(pool.token_reserve, pool.eth_reserve);
        Self {
            name: info.name.clone(),
            token_name: info.token_name.clone(),
            token_symbol: info.token_symbol.clone(),
            initialized: pool.is_initialized(),
            token_reserve: pool.token_reserve.to_string(),
            eth_reserve: pool.eth_reserve.to_string(),
            token_per_eth_wei: spot.map(|s| s.token_per_eth_wei.to_string()),
            eth_per_token_wei: spot.map(|s| s.eth_per_token_wei.to_string()),
            token_eth_rate,
            eth_token_rate,
        }
    }
}
