//! Ratio exchange application library

use std::sync::Arc;

use anyhow::Context;
use exchange_api::AppState;
use exchange_core::{Address, AppConfig, Wei};
use ledger_client::{LedgerClient, SimulatedLedger};

/// Path of the JSON configuration file
pub const CONFIG_ENV: &str = "EXCHANGE_CONFIG";

/// Comma-separated extra accounts to fund at genesis
pub const FUND_ENV: &str = "EXCHANGE_FUND";

/// Genesis ETH per funded account (1000 ETH)
fn genesis_eth() -> Wei {
    Wei::exp10(21)
}

/// Load configuration from `EXCHANGE_CONFIG`, or defaults when unset
pub fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            AppConfig::load(&path).with_context(|| format!("loading {}", path))
        }
        Err(_) => {
            tracing::info!("{} not set, using default configuration", CONFIG_ENV);
            Ok(AppConfig::default())
        }
    }
}

/// Accounts listed in `raw`, skipping blanks
pub fn parse_fund_list(raw: &str) -> anyhow::Result<Vec<Address>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let address = Address::new(s);
            anyhow::ensure!(address.is_valid(), "invalid address in {}: {}", FUND_ENV, s);
            Ok(address)
        })
        .collect()
}

/// Build the simulated ledger, seed the pool and serve the API
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("exchange=debug".parse()?)
                .add_directive("amm=debug".parse()?)
                .add_directive("futures_book=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    tracing::info!("Starting ratio exchange");

    let config = load_config()?;
    let ledger = SimulatedLedger::new(&config.ledger);

    let mut funded = vec![config.bootstrap.operator.clone()];
    if let Ok(raw) = std::env::var(FUND_ENV) {
        funded.extend(parse_fund_list(&raw)?);
    }
    for account in &funded {
        ledger.fund_eth(account, genesis_eth()).await;
        tracing::debug!(account = %account, "Funded genesis account");
    }

    let client = LedgerClient::new(Arc::new(ledger), config.ledger.clone());
    let port = config.api_port;
    let bootstrap = config.bootstrap.clone();
    let state = AppState::new(config, client);

    let outcome = amm::ensure_initialized(&state.reader(), &bootstrap)
        .await
        .context("seeding pool")?;
    tracing::info!(pool = %outcome.pool(), "Exchange ready");

    exchange_api::start_server(state, port)
        .await
        .context("API server stopped")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fund_list() {
        let accounts = parse_fund_list(
            " 0x0000000000000000000000000000000000000002, ,0x00000000000000000000000000000000000000AB",
        )
        .unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(
            accounts[1].as_str(),
            "0x00000000000000000000000000000000000000ab"
        );
        assert!(parse_fund_list("0x12").is_err());
        assert!(parse_fund_list("").unwrap().is_empty());
    }
}
