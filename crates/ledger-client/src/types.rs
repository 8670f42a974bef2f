//! Ledger call and receipt types
//!
//! These are the shapes exchanged with the ledger: the calls an account can
//! submit, the receipt a settled call produces, and the futures record the
//! futures contract stores.

use exchange_core::{Address, Asset, Timestamp, TxHash, Wei};
use serde::{Deserialize, Serialize};

/// A state-changing call submitted to the ledger on behalf of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerCall {
    /// Mint new tokens to the sender
    Mint { amount: Wei },
    /// Set the sender's token allowance for `spender`
    Approve { spender: Address, amount: Wei },
    /// Move ETH or tokens from the sender to `to`
    Transfer { to: Address, asset: Asset, amount: Wei },
    /// Seed an empty pool with both assets
    CreatePool { token_amount: Wei, eth_amount: Wei },
    /// Sell tokens for ETH; `max_rate` is wei per token, 1e18-scaled
    SwapTokensForEth { token_amount: Wei, max_rate: Wei },
    /// Sell ETH for tokens; `min_rate` is tokens per ETH, 1e18-scaled
    SwapEthForTokens { wei_amount: Wei, min_rate: Wei },
    AddLiquidity {
        eth_amount: Wei,
        max_rate: Wei,
        min_rate: Wei,
    },
    RemoveLiquidity {
        eth_amount: Wei,
        max_rate: Wei,
        min_rate: Wei,
    },
    RemoveAllLiquidity { max_rate: Wei, min_rate: Wei },
    /// Stake ETH now to buy tokens at `exchange_rate` after expiry
    CreateBuyFuture {
        exchange_rate: Wei,
        wei_amount: Wei,
        duration_days: u64,
    },
    /// Escrow tokens now to sell them at `exchange_rate` after expiry
    CreateSellFuture {
        token_amount: Wei,
        exchange_rate: Wei,
        duration_days: u64,
    },
    ExecuteFuture { id: u64 },
}

impl LedgerCall {
    /// Short operation name used in logs and rejection errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Approve { .. } => "approve",
            Self::Transfer { .. } => "transfer",
            Self::CreatePool { .. } => "createPool",
            Self::SwapTokensForEth { .. } => "swapTokensForETH",
            Self::SwapEthForTokens { .. } => "swapETHForTokens",
            Self::AddLiquidity { .. } => "addLiquidity",
            Self::RemoveLiquidity { .. } => "removeLiquidity",
            Self::RemoveAllLiquidity { .. } => "removeAllLiquidity",
            Self::CreateBuyFuture { .. } => "createBuyFuture",
            Self::CreateSellFuture { .. } => "createSellFuture",
            Self::ExecuteFuture { .. } => "executeFuture",
        }
    }
}

/// Settlement outcome of a submitted call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed { reason: String },
}

/// Receipt of a settled transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    #[serde(flatten)]
    pub status: TxStatus,
}

impl TxReceipt {
    pub fn is_success(&self) -> bool {
        matches!(self.status, TxStatus::Success)
    }

    /// Revert reason, if the transaction failed
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            TxStatus::Success => None,
            TxStatus::Failed { reason } => Some(reason),
        }
    }
}

/// A future commitment as stored by the futures contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureContract {
    /// Dense, zero-based index assigned at creation
    pub id: u64,
    /// Account that created the commitment
    pub buyer: Address,
    /// Wei for buy orders, token units for sell orders
    pub amount: Wei,
    /// Tokens per ETH, 1e18-scaled
    pub exchange_rate: Wei,
    pub is_buy_order: bool,
    /// Unix seconds after which the future may be executed
    pub expire_at: Timestamp,
    pub executed: bool,
}

impl FutureContract {
    /// Whether the contract may be executed at `now`
    pub fn is_executable(&self, now: Timestamp) -> bool {
        !self.executed && now >= self.expire_at
    }
}
