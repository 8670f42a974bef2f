//! Futures book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use futures_book::{FutureView, DEFAULT_PAGE_SIZE};

use crate::dto::{
    ApiError, BuyFutureRequest, ExecuteFutureRequest, FutureDto, FuturesPageResponse,
    FuturesQuery, SellFutureRequest, TxResponse,
};
use crate::routes::{address_to_api, error_to_api, parse_wei};
use crate::state::parse_address;
use crate::AppState;

/// Create futures routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/buy", post(create_buy))
        .route("/sell", post(create_sell))
        .route("/:id/execute", post(execute))
}

/// GET /futures?start=&count=&viewer= - One page of the book
async fn list(
    State(state): State<AppState>,
    Query(query): Query<FuturesQuery>,
) -> Result<Json<FuturesPageResponse>, (StatusCode, Json<ApiError>)> {
    let viewer = query
        .viewer
        .as_deref()
        .map(parse_address)
        .transpose()
        .map_err(address_to_api)?;
    let ledger = state.ledger();

    let page = futures_book::list_futures(
        ledger,
        query.start.unwrap_or(0),
        query.count.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .await
    .map_err(error_to_api)?;
    let now = ledger.now().await.map_err(|e| error_to_api(e.into()))?;

    Ok(Json(FuturesPageResponse {
        items: page
            .items
            .into_iter()
            .map(|contract| FutureView::new(contract, viewer.as_ref(), now).into())
            .collect::<Vec<FutureDto>>(),
        next_index: page.next_index,
        exhausted: page.exhausted,
        now,
    }))
}

/// POST /futures/buy - Stake ETH for a future token purchase
async fn create_buy(
    State(state): State<AppState>,
    Json(request): Json<BuyFutureRequest>,
) -> Result<Json<TxResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.context(&request.from).map_err(address_to_api)?;
    let exchange_rate = parse_wei("exchange_rate", &request.exchange_rate)?;
    let wei_amount = parse_wei("wei_amount", &request.wei_amount)?;

    let receipt =
        futures_book::create_buy_future(&ctx, exchange_rate, wei_amount, request.duration_days)
            .await
            .map_err(error_to_api)?;
    Ok(Json(TxResponse::from(&receipt)))
}

/// POST /futures/sell - Escrow tokens for a future sale
async fn create_sell(
    State(state): State<AppState>,
    Json(request): Json<SellFutureRequest>,
) -> Result<Json<TxResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.context(&request.from).map_err(address_to_api)?;
    let token_amount = parse_wei("token_amount", &request.token_amount)?;
    let exchange_rate = parse_wei("exchange_rate", &request.exchange_rate)?;

    let receipt =
        futures_book::create_sell_future(&ctx, token_amount, exchange_rate, request.duration_days)
            .await
            .map_err(error_to_api)?;
    Ok(Json(TxResponse::from(&receipt)))
}

/// POST /futures/:id/execute - Settle an expired future
async fn execute(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<ExecuteFutureRequest>,
) -> Result<Json<TxResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.context(&request.from).map_err(address_to_api)?;
    let receipt = futures_book::execute_future(&ctx, id)
        .await
        .map_err(error_to_api)?;
    Ok(Json(TxResponse::from(&receipt)))
}
