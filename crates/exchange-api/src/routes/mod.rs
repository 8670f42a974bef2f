//! API route handlers

pub mod futures;
pub mod health;
pub mod liquidity;
pub mod pool;
pub mod swap;

use axum::{http::StatusCode, routing::get, Json, Router};
use exchange_core::{parse_amount, Wei};

use crate::dto::ApiError;
use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/pool", get(pool::get_pool))
        .route("/balances/:address", get(pool::get_balances))
        .nest("/swap", swap::router())
        .nest("/liquidity", liquidity::router())
        .nest("/futures", futures::router())
        .with_state(state)
}

/// Convert an exchange error to an API error response
pub(crate) fn error_to_api(error: exchange_core::Error) -> (StatusCode, Json<ApiError>) {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::warn!(code = error.error_code(), error = %error, "Request failed");
    } else {
        tracing::debug!(code = error.error_code(), error = %error, "Request rejected");
    }
    (status, Json(ApiError::new(error.error_code(), error.to_string())))
}

/// Reject a malformed `from` or path address
pub(crate) fn address_to_api(error: crate::state::ApiError) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new("invalid_address", error.to_string())),
    )
}

/// Parse a decimal amount field
pub(crate) fn parse_wei(field: &str, value: &str) -> Result<Wei, (StatusCode, Json<ApiError>)> {
    parse_amount(value).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                "invalid_amount",
                format!("{} must be a non-negative decimal integer, got '{}'", field, value),
            )),
        )
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use exchange_core::{Address, AppConfig, Wei};
    use ledger_client::{FeeConfig, LedgerClient, SimulatedLedger};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{create_app, AppState};

    pub fn account(n: u8) -> Address {
        Address::new(format!("0x{:040x}", n))
    }

    /// Fee-free ledger with the default 5000/5000 pool and funded accounts 2 and 3
    pub async fn app_state() -> (Arc<SimulatedLedger>, AppState) {
        let config = AppConfig::default();
        let sim = Arc::new(SimulatedLedger::with_fee(&config.ledger, FeeConfig::zero()));
        sim.fund_eth(&config.bootstrap.operator, Wei::from(1_000_000u64))
            .await;
        for n in [2, 3] {
            sim.fund_eth(&account(n), Wei::from(1_000_000u64)).await;
        }
        let ledger = LedgerClient::new(sim.clone(), config.ledger.clone());
        let state = AppState::new(config, ledger);
        amm::ensure_initialized(&state.reader(), &state.config().bootstrap)
            .await
            .unwrap();
        (sim, state)
    }

    pub async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = create_app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}
