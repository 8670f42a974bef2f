//! Pool state, quote and outcome types

use std::fmt;

use exchange_core::{ProtocolError, Wei};
use ledger_client::TxReceipt;
use serde::Serialize;

use crate::calculator::{self, SpotRate};

/// Snapshot of the pool reserves
///
/// Either both reserves are zero (uninitialized) or both are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pool {
    pub token_reserve: Wei,
    pub eth_reserve: Wei,
}

impl Pool {
    pub fn new(token_reserve: Wei, eth_reserve: Wei) -> Self {
        Self {
            token_reserve,
            eth_reserve,
        }
    }

    /// Whether the pool holds both assets
    pub fn is_initialized(&self) -> bool {
        !self.token_reserve.is_zero() && !self.eth_reserve.is_zero()
    }

    /// Both reserves agree on whether the pool exists
    pub fn is_consistent(&self) -> bool {
        self.token_reserve.is_zero() == self.eth_reserve.is_zero()
    }

    pub fn spot_rate(&self) -> Result<SpotRate, ProtocolError> {
        calculator::spot_rate(self.token_reserve, self.eth_reserve)
    }

    /// Fail with `PoolUninitialized` unless both reserves are positive
    pub fn require_initialized(&self) -> Result<(), ProtocolError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(ProtocolError::PoolUninitialized)
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pool({} tokens / {} wei)",
            self.token_reserve, self.eth_reserve
        )
    }
}

/// Quote for selling tokens into the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenForEthQuote {
    pub token_amount: Wei,
    /// Wei per token at spot, 1e18-scaled
    pub base_rate: Wei,
    /// Highest wei-per-token rate the ledger may settle at
    pub max_acceptable_rate: Wei,
    /// Wei received at the spot rate
    pub expected_output: Wei,
}

/// Quote for buying tokens with ETH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthForTokenQuote {
    pub wei_amount: Wei,
    /// Tokens per ETH, 1e18-scaled
    pub expected_rate: Wei,
    /// Lowest tokens-per-ETH rate the ledger may settle at
    pub min_acceptable_rate: Wei,
    /// Tokens received at the expected rate
    pub expected_output: Wei,
}

/// Quote for adding or removing liquidity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityQuote {
    pub eth_amount: Wei,
    /// Tokens moving alongside `eth_amount` at the current ratio
    pub expected_token_amount: Wei,
    /// Upper bound on wei per token
    pub max_exchange_rate: Wei,
    /// Lower bound on tokens per ETH
    pub min_exchange_rate: Wei,
}

/// Steps of a single swap call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapPhase {
    Quote,
    Validate,
    Submit,
    Settled,
    Reverted,
}

impl SwapPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Validate => "validate",
            Self::Submit => "submit",
            Self::Settled => "settled",
            Self::Reverted => "reverted",
        }
    }
}

impl fmt::Display for SwapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A settled swap with the quote it was submitted under
#[derive(Debug, Clone)]
pub struct SwapOutcome<Q> {
    pub quote: Q,
    pub receipt: TxReceipt,
}

/// A settled liquidity change
#[derive(Debug, Clone)]
pub struct LiquidityOutcome {
    /// Absent for remove-all, which carries no ETH amount
    pub quote: Option<LiquidityQuote>,
    pub receipt: TxReceipt,
}

/// LP balance of one account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlement {
    pub lp_balance: Wei,
    pub pool: Pool,
}

impl Entitlement {
    pub fn has_liquidity(&self) -> bool {
        !self.lp_balance.is_zero()
    }
}
