//! exchange-api: HTTP API layer for the ratio exchange
//!
//! Exposes pool reads, swaps, liquidity and the futures book over JSON.
//! Every state-changing request names the acting account in `from`.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{ApiError, AppState};
