//! Futures Book
//!
//! Accounts commit now to buy tokens with staked ETH, or to sell escrowed
//! tokens, at a fixed tokens-per-ETH rate once a number of days has passed.
//! The futures contract stores the commitments; this crate creates, lists
//! and executes them.

pub mod book;
pub mod constants;
pub mod fetch;
pub mod state;

pub use book::{create_buy_future, create_sell_future, execute_future};
pub use constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use fetch::{fetch_futures_state, list_all, list_futures};
pub use state::{FuturePage, FutureView, FuturesState};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use amm::ExchangeContext;
    use exchange_core::{Address, LedgerConfig, Wei};
    use ledger_client::{FeeConfig, LedgerCall, LedgerClient, SimulatedLedger};

    pub fn account(n: u8) -> Address {
        Address::new(format!("0x{:040x}", n))
    }

    /// Fee-free ledger with a 5000/5000 pool seeded by `account(1)`
    pub async fn seeded() -> (Arc<SimulatedLedger>, ExchangeContext) {
        let config = LedgerConfig::default();
        let sim = Arc::new(SimulatedLedger::with_fee(&config, FeeConfig::zero()));
        for n in 1..=3 {
            sim.fund_eth(&account(n), Wei::from(1_000_000u64)).await;
        }
        let ctx = ExchangeContext::new(LedgerClient::new(sim.clone(), config), account(1));
        amm::initialize_pool(&ctx, Wei::from(5000u64), Wei::from(5000u64))
            .await
            .unwrap();
        (sim, ctx)
    }

    pub async fn mint(ctx: &ExchangeContext, amount: u64) {
        ctx.submit_settled(LedgerCall::Mint {
            amount: Wei::from(amount),
        })
        .await
        .unwrap();
    }
}
