//! Futures discovery
//!
//! The futures contract exposes commitments only by index. Listing probes
//! consecutive ids and stops at the first one the contract does not know.

use amm::ExchangeContext;
use exchange_core::{Address, Result};
use ledger_client::LedgerClient;

use crate::constants::MAX_PAGE_SIZE;
use crate::state::{FuturePage, FutureView, FuturesState};

/// Probe up to `count` ids starting at `start`
///
/// `count` is capped at [`MAX_PAGE_SIZE`]. A zero count returns an empty,
/// non-exhausted page.
pub async fn list_futures(ledger: &LedgerClient, start: u64, count: u64) -> Result<FuturePage> {
    let count = count.min(MAX_PAGE_SIZE);
    let mut items = Vec::new();
    let mut next_index = start;

    while next_index - start < count {
        match ledger.future(next_index).await? {
            Some(contract) => {
                items.push(contract);
                next_index += 1;
            }
            None => {
                return Ok(FuturePage {
                    items,
                    next_index,
                    exhausted: true,
                })
            }
        }
    }

    Ok(FuturePage {
        items,
        next_index,
        exhausted: false,
    })
}

/// Page through the whole book
pub async fn list_all(ledger: &LedgerClient) -> Result<Vec<ledger_client::FutureContract>> {
    let mut all = Vec::new();
    let mut start = 0;
    loop {
        let page = list_futures(ledger, start, MAX_PAGE_SIZE).await?;
        start = page.next_index;
        all.extend(page.items);
        if page.exhausted {
            return Ok(all);
        }
    }
}

/// Every commitment annotated for `viewer` at the ledger's current time
pub async fn fetch_futures_state(
    ctx: &ExchangeContext,
    viewer: Option<&Address>,
) -> Result<FuturesState> {
    let now = ctx.ledger.now().await?;
    let futures: Vec<FutureView> = list_all(&ctx.ledger)
        .await?
        .into_iter()
        .map(|contract| FutureView::new(contract, viewer, now))
        .collect();
    let own_futures = futures.iter().filter(|f| f.is_own).count();

    tracing::debug!(total = futures.len(), own = own_futures, "Fetched futures book");

    Ok(FuturesState {
        total_futures: futures.len(),
        own_futures,
        futures,
        now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::create_buy_future;
    use crate::test_support::{account, seeded};
    use exchange_core::Wei;

    async fn book_of(n: u64) -> ExchangeContext {
        let (_sim, ctx) = seeded().await;
        let buyer = ctx.acting_as(account(2));
        for _ in 0..n {
            create_buy_future(&buyer, Wei::exp10(18), Wei::from(10u64), 1)
                .await
                .unwrap();
        }
        ctx
    }

    #[tokio::test]
    async fn test_empty_book() {
        let ctx = book_of(0).await;
        let page = list_futures(&ctx.ledger, 0, 10).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_index, 0);
        assert!(page.exhausted);
        assert!(list_all(&ctx.ledger).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pages_stop_at_first_gap() {
        let ctx = book_of(5).await;

        let first = list_futures(&ctx.ledger, 0, 3).await.unwrap();
        assert_eq!(first.items.len(), 3);
        assert_eq!(first.next_index, 3);
        assert!(!first.exhausted);

        let second = list_futures(&ctx.ledger, first.next_index, 3).await.unwrap();
        assert_eq!(
            second.items.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert_eq!(second.next_index, 5);
        assert!(second.exhausted);
    }

    #[tokio::test]
    async fn test_zero_count_page() {
        let ctx = book_of(2).await;
        let page = list_futures(&ctx.ledger, 1, 0).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_index, 1);
        assert!(!page.exhausted);
    }

    #[tokio::test]
    async fn test_list_all_and_state() {
        let ctx = book_of(4).await;
        let all = list_all(&ctx.ledger).await.unwrap();
        assert_eq!(all.iter().map(|f| f.id).collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        let state = fetch_futures_state(&ctx, Some(&account(2))).await.unwrap();
        assert_eq!(state.total_futures, 4);
        assert_eq!(state.own_futures, 4);
        assert!(state.futures.iter().all(|f| !f.is_executable));

        let state = fetch_futures_state(&ctx, Some(&account(3))).await.unwrap();
        assert_eq!(state.own_futures, 0);
    }
}
