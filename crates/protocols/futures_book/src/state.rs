//! Futures book state types

use exchange_core::{Address, Timestamp};
use ledger_client::FutureContract;

/// One page of commitments in id order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuturePage {
    pub items: Vec<FutureContract>,
    /// First id not covered by this page
    pub next_index: u64,
    /// A probe hit an unused id; there is nothing past `next_index`
    pub exhausted: bool,
}

/// A commitment annotated for one viewer at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FutureView {
    pub contract: FutureContract,
    /// Created by the viewing account
    pub is_own: bool,
    /// Past expiry and not yet executed
    pub is_executable: bool,
    /// Seconds until expiry (negative = past due)
    pub seconds_remaining: i64,
}

impl FutureView {
    pub fn new(contract: FutureContract, viewer: Option<&Address>, now: Timestamp) -> Self {
        let is_own = viewer.map(|v| *v == contract.buyer).unwrap_or(false);
        let is_executable = contract.is_executable(now);
        let seconds_remaining = if contract.expire_at >= now {
            i64::try_from(contract.expire_at - now).unwrap_or(i64::MAX)
        } else {
            i64::try_from(now - contract.expire_at)
                .map(|d| -d)
                .unwrap_or(i64::MIN)
        };
        Self {
            contract,
            is_own,
            is_executable,
            seconds_remaining,
        }
    }
}

/// Every commitment in the book, as seen by one viewer
#[derive(Debug, Clone)]
pub struct FuturesState {
    pub futures: Vec<FutureView>,
    pub now: Timestamp,
    pub total_futures: usize,
    pub own_futures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use exchange_core::Wei;

    fn contract(expire_at: Timestamp) -> FutureContract {
        FutureContract {
            id: 0,
            buyer: Address::new("0x0000000000000000000000000000000000000002"),
            amount: Wei::from(10u64),
            exchange_rate: Wei::exp10(18),
            is_buy_order: true,
            expire_at,
            executed: false,
        }
    }

    #[test]
    fn test_view_before_expiry() {
        let owner = Address::new("0x0000000000000000000000000000000000000002");
        let view = FutureView::new(contract(1_000), Some(&owner), 400);
        assert!(view.is_own);
        assert!(!view.is_executable);
        assert_eq!(view.seconds_remaining, 600);
    }

    #[test]
    fn test_view_past_due() {
        let stranger = Address::new("0x0000000000000000000000000000000000000009");
        let view = FutureView::new(contract(1_000), Some(&stranger), 1_250);
        assert!(!view.is_own);
        assert!(view.is_executable);
        assert_eq!(view.seconds_remaining, -250);

        let anonymous = FutureView::new(contract(1_000), None, 1_000);
        assert!(!anonymous.is_own);
        assert_eq!(anonymous.seconds_remaining, 0);
    }
}
