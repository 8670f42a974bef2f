//! Liveness probe for the exchange service

use axum::Json;

use crate::dto::HealthResponse;

/// GET /health - Reports the service version; does not touch the ledger
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{app_state, send};

    #[tokio::test]
    async fn test_health() {
        let (_sim, state) = app_state().await;
        let (status, body) = send(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
