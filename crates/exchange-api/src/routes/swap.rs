//! Swap endpoints

use amm::SlippagePct;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::dto::{
    ApiError, SwapDirection, SwapQuoteRequest, SwapQuoteResponse, SwapRequest, SwapResponse,
    TxResponse,
};
use crate::routes::{address_to_api, error_to_api, parse_wei};
use crate::AppState;

/// Create swap routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token-for-eth", post(swap_token_for_eth))
        .route("/eth-for-token", post(swap_eth_for_token))
        .route("/quote", post(quote))
}

/// POST /swap/token-for-eth - Sell tokens for ETH
async fn swap_token_for_eth(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> Result<Json<SwapResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.context(&request.from).map_err(address_to_api)?;
    let amount = parse_wei("amount", &request.amount)?;

    let outcome = amm::swap_tokens_for_eth(&ctx, amount, request.slippage_pct)
        .await
        .map_err(error_to_api)?;

    Ok(Json(SwapResponse {
        tx: TxResponse::from(&outcome.receipt),
        quote: outcome.quote.into(),
    }))
}

/// POST /swap/eth-for-token - Buy tokens with ETH
async fn swap_eth_for_token(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> Result<Json<SwapResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.context(&request.from).map_err(address_to_api)?;
    let amount = parse_wei("amount", &request.amount)?;

    let outcome = amm::swap_eth_for_tokens(&ctx, amount, request.slippage_pct)
        .await
        .map_err(error_to_api)?;

    Ok(Json(SwapResponse {
        tx: TxResponse::from(&outcome.receipt),
        quote: outcome.quote.into(),
    }))
}

/// POST /swap/quote - Quote a swap without submitting it
async fn quote(
    State(state): State<AppState>,
    Json(request): Json<SwapQuoteRequest>,
) -> Result<Json<SwapQuoteResponse>, (StatusCode, Json<ApiError>)> {
    let amount = parse_wei("amount", &request.amount)?;
    let slippage = SlippagePct::new(request.slippage_pct).map_err(|e| error_to_api(e.into()))?;
    let pool = state.reader().snapshot().await.map_err(error_to_api)?;

    let response = match request.direction {
        SwapDirection::TokenForEth => {
            amm::quote_token_for_eth(&pool, amount, slippage).map(SwapQuoteResponse::from)
        }
        SwapDirection::EthForToken => {
            amm::quote_eth_for_token(&pool, amount, slippage).map(SwapQuoteResponse::from)
        }
    }
    .map_err(|e| error_to_api(e.into()))?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{account, app_state, send};

    #[tokio::test]
    async fn test_quote_reference_pool() {
        let (_sim, state) = app_state().await;
        let (status, body) = send(
            &state,
            "POST",
            "/swap/quote",
            Some(json!({ "direction": "eth_for_token", "amount": "100", "slippage_pct": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rate"], "1000000000000000000");
        assert_eq!(body["bound_rate"], "990000000000000000");
        assert_eq!(body["expected_output"], "100");
    }

    #[tokio::test]
    async fn test_eth_for_token_swap() {
        let (_sim, state) = app_state().await;
        let (status, body) = send(
            &state,
            "POST",
            "/swap/eth-for-token",
            Some(json!({ "from": account(2).to_string(), "amount": "100", "slippage_pct": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["tx_hash"].as_str().unwrap().starts_with("0x"));
        assert_eq!(body["quote"]["expected_output"], "100");

        let (_, balances) = send(&state, "GET", &format!("/balances/{}", account(2)), None).await;
        assert_eq!(balances["token"], "98");
    }

    #[tokio::test]
    async fn test_token_sale_without_tokens() {
        let (_sim, state) = app_state().await;
        let (status, body) = send(
            &state,
            "POST",
            "/swap/token-for-eth",
            Some(json!({ "from": account(3).to_string(), "amount": "10", "slippage_pct": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "insufficient_balance");
    }

    #[tokio::test]
    async fn test_invalid_inputs() {
        let (_sim, state) = app_state().await;
        let from = account(2).to_string();

        let (status, body) = send(
            &state,
            "POST",
            "/swap/eth-for-token",
            Some(json!({ "from": from, "amount": "100", "slippage_pct": 101 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_slippage");

        let (status, body) = send(
            &state,
            "POST",
            "/swap/eth-for-token",
            Some(json!({ "from": from, "amount": "1.5", "slippage_pct": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_amount");

        let (status, body) = send(
            &state,
            "POST",
            "/swap/eth-for-token",
            Some(json!({ "from": "0xnope", "amount": "1", "slippage_pct": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_address");
    }

    #[tokio::test]
    async fn test_cannot_act_as_futures_escrow() {
        let (_sim, state) = app_state().await;
        let escrow = state.config().ledger.futures_address.to_string();
        let (status, body) = send(
            &state,
            "POST",
            "/swap/token-for-eth",
            Some(json!({ "from": escrow, "amount": "10", "slippage_pct": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_address");
    }
}
