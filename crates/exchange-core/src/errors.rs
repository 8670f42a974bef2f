//! Error types for the exchange

use primitive_types::U256;
use thiserror::Error;

use crate::types::{Asset, Timestamp, TxHash};

/// Core errors that can occur in the exchange
#[derive(Debug, Error)]
pub enum Error {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Ledger connection and query errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger unreachable at {url}")]
    Unreachable { url: String },

    #[error("Ledger returned error: {message}")]
    ApiError { message: String },

    #[error("Ledger request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Ledger reported inconsistent state: {reason}")]
    InvalidState { reason: String },
}

/// Pool, swap, liquidity and futures errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Pool is not initialized (reserves are zero)")]
    PoolUninitialized,

    #[error("ETH reserves are zero")]
    ZeroEthReserve,

    #[error("Division by zero in ratio computation")]
    DivisionByZero,

    #[error("Arithmetic overflow in ratio computation")]
    Overflow,

    #[error("Slippage must be between 0 and 100 percent, got {pct}")]
    InvalidSlippage { pct: i64 },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Insufficient {asset} balance: need {required}, have {available}")]
    InsufficientBalance {
        asset: Asset,
        required: U256,
        available: U256,
    },

    #[error("Pool liquidity too low: need {required} {asset}, pool holds {available}")]
    InsufficientPoolLiquidity {
        asset: Asset,
        required: U256,
        available: U256,
    },

    #[error("No liquidity to remove")]
    NoLiquidityToRemove,

    #[error("Future contract {id} not found")]
    FutureNotFound { id: u64 },

    #[error("Future contract {id} already executed")]
    AlreadyExecuted { id: u64 },

    #[error("Future contract {id} expires at {expire_at}, now is {now}")]
    NotYetExpired {
        id: u64,
        expire_at: Timestamp,
        now: Timestamp,
    },

    #[error("Swap reverted on-chain (tx {tx_hash}): {reason}")]
    SwapReverted { tx_hash: TxHash, reason: String },

    #[error("Ledger rejected {operation}: {reason}")]
    LedgerRejected { operation: String, reason: String },
}

/// Result type alias for exchange operations
pub type Result<T> = std::result::Result<T, Error>;

impl ProtocolError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PoolUninitialized => "pool_uninitialized",
            Self::ZeroEthReserve => "zero_eth_reserve",
            Self::DivisionByZero => "division_by_zero",
            Self::Overflow => "overflow",
            Self::InvalidSlippage { .. } => "invalid_slippage",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InsufficientPoolLiquidity { .. } => "insufficient_pool_liquidity",
            Self::NoLiquidityToRemove => "no_liquidity_to_remove",
            Self::FutureNotFound { .. } => "future_not_found",
            Self::AlreadyExecuted { .. } => "already_executed",
            Self::NotYetExpired { .. } => "not_yet_expired",
            Self::SwapReverted { .. } => "swap_reverted",
            Self::LedgerRejected { .. } => "ledger_rejected",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidSlippage { .. } | Self::InvalidAmount { .. } => 400,
            Self::FutureNotFound { .. } => 404,
            Self::AlreadyExecuted { .. } | Self::NotYetExpired { .. } => 409,
            Self::InsufficientBalance { .. }
            | Self::InsufficientPoolLiquidity { .. }
            | Self::NoLiquidityToRemove => 422,
            Self::SwapReverted { .. } | Self::LedgerRejected { .. } => 422,
            Self::DivisionByZero | Self::Overflow => 422,
            Self::PoolUninitialized | Self::ZeroEthReserve => 503,
        }
    }

    /// Whether the failure was detected at settlement rather than locally
    pub fn is_settlement_failure(&self) -> bool {
        matches!(self, Self::SwapReverted { .. } | Self::LedgerRejected { .. })
    }
}

impl Error {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Protocol(e) => e.error_code(),
            Self::Ledger(LedgerError::Timeout { .. }) => "ledger_timeout",
            Self::Ledger(_) => "ledger_unavailable",
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Protocol(e) => e.status_code(),
            Self::Ledger(LedgerError::Timeout { .. }) => 504,
            Self::Ledger(_) => 503,
            Self::Config(_) | Self::Serialization(_) => 500,
        }
    }

    /// The protocol-level failure, if this is one
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(e) => Some(e),
            _ => None,
        }
    }
}
