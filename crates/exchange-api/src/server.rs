//! Exchange HTTP service: router, middleware and listener

use std::net::SocketAddr;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes::create_router;
use crate::{ApiError, AppState};

/// Pool, swap, liquidity and futures routes behind tracing and open CORS
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve the exchange API on localhost until the listener fails
pub async fn start_server(state: AppState, port: u16) -> Result<(), ApiError> {
    let exchange = state.config().ledger.exchange_address.clone();
    let futures = state.config().ledger.futures_address.clone();
    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!(%addr, %exchange, %futures, "Exchange API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::test_support::app_state;

    #[tokio::test]
    async fn test_app_allows_cross_origin_reads() {
        let (_sim, state) = app_state().await;
        let request = Request::builder()
            .uri("/pool")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = create_app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }
}
