//! Pool and balance endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use exchange_core::{Address, Asset};

use crate::dto::{ApiError, BalancesResponse, PoolResponse};
use crate::routes::{address_to_api, error_to_api};
use crate::state::parse_address;
use crate::AppState;

/// GET /pool - Current reserves and rates
pub async fn get_pool(
    State(state): State<AppState>,
) -> Result<Json<PoolResponse>, (StatusCode, Json<ApiError>)> {
    let pool = state.reader().snapshot().await.map_err(error_to_api)?;
    Ok(Json(PoolResponse::new(&pool, &state.config().exchange)))
}

/// GET /balances/:address - ETH, token and LP balances of an account
pub async fn get_balances(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalancesResponse>, (StatusCode, Json<ApiError>)> {
    let address = parse_address(&address).map_err(address_to_api)?;

    Ok(Json(BalancesResponse {
        eth: balance_of(&state, &address, Asset::Eth).await?,
        token: balance_of(&state, &address, Asset::Token).await?,
        liquidity: balance_of(&state, &address, Asset::Liquidity).await?,
        address: address.to_string(),
    }))
}

async fn balance_of(
    state: &AppState,
    address: &Address,
    asset: Asset,
) -> Result<String, (StatusCode, Json<ApiError>)> {
    state
        .ledger()
        .balance(address, asset)
        .await
        .map(|amount| amount.to_string())
        .map_err(|e| error_to_api(e.into()))
}
