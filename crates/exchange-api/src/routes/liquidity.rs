//! Liquidity endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::dto::{
    ApiError, EntitlementResponse, LiquidityRequest, LiquidityResponse, RemoveAllRequest,
};
use crate::routes::{address_to_api, error_to_api, parse_wei};
use crate::AppState;

/// Create liquidity routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add))
        .route("/remove", post(remove))
        .route("/remove-all", post(remove_all))
        .route("/:address", get(position))
}

/// POST /liquidity/add - Deposit ETH and tokens at the current ratio
async fn add(
    State(state): State<AppState>,
    Json(request): Json<LiquidityRequest>,
) -> Result<Json<LiquidityResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.context(&request.from).map_err(address_to_api)?;
    let eth_amount = parse_wei("eth_amount", &request.eth_amount)?;

    let outcome = amm::add_liquidity(&ctx, eth_amount, request.slippage_pct)
        .await
        .map_err(error_to_api)?;
    Ok(Json(outcome.into()))
}

/// POST /liquidity/remove - Withdraw an ETH amount and the matching tokens
async fn remove(
    State(state): State<AppState>,
    Json(request): Json<LiquidityRequest>,
) -> Result<Json<LiquidityResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.context(&request.from).map_err(address_to_api)?;
    let eth_amount = parse_wei("eth_amount", &request.eth_amount)?;

    let outcome = amm::remove_liquidity(&ctx, eth_amount, request.slippage_pct)
        .await
        .map_err(error_to_api)?;
    Ok(Json(outcome.into()))
}

/// POST /liquidity/remove-all - Withdraw the caller's whole position
async fn remove_all(
    State(state): State<AppState>,
    Json(request): Json<RemoveAllRequest>,
) -> Result<Json<LiquidityResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.context(&request.from).map_err(address_to_api)?;

    let outcome = amm::remove_all_liquidity(&ctx, request.slippage_pct)
        .await
        .map_err(error_to_api)?;
    Ok(Json(outcome.into()))
}

/// GET /liquidity/:address - LP balance of an account
async fn position(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<EntitlementResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.context(&address).map_err(address_to_api)?;
    let entitlement = amm::entitlement(&ctx).await.map_err(error_to_api)?;
    Ok(Json(EntitlementResponse::new(&ctx.account, &entitlement)))
}
