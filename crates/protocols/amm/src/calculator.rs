//! Ratio Calculator
//!
//! Fixed-point rate math for the constant-ratio pool. Every rate is scaled
//! by 10^18 and every division floors. Products are taken in 512 bits so
//! `a * b / c` only fails when the quotient itself does not fit.

use exchange_core::constants::{rate_scale, MAX_SLIPPAGE_PCT};
use exchange_core::{ProtocolError, Wei};
use primitive_types::U512;
use serde::{Deserialize, Serialize};

/// Slippage tolerance in whole percent, `0..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SlippagePct(u32);

impl SlippagePct {
    pub fn new(pct: i64) -> Result<Self, ProtocolError> {
        u32::try_from(pct)
            .ok()
            .filter(|p| *p <= MAX_SLIPPAGE_PCT)
            .map(Self)
            .ok_or(ProtocolError::InvalidSlippage { pct })
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for SlippagePct {
    type Error = ProtocolError;

    fn try_from(pct: i64) -> Result<Self, Self::Error> {
        Self::new(pct)
    }
}

impl From<SlippagePct> for i64 {
    fn from(pct: SlippagePct) -> Self {
        i64::from(pct.0)
    }
}

/// Pool rates in both directions, 1e18-scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpotRate {
    /// Token units per wei
    pub token_per_eth_wei: Wei,
    /// Wei per token unit
    pub eth_per_token_wei: Wei,
}

/// Slippage band around a base rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBand {
    pub max_rate: Wei,
    pub min_rate: Wei,
}

/// `a * b / c`, floored
pub fn mul_div(a: Wei, b: Wei, c: Wei) -> Result<Wei, ProtocolError> {
    if c.is_zero() {
        return Err(ProtocolError::DivisionByZero);
    }
    Wei::try_from(a.full_mul(b) / U512::from(c)).map_err(|_| ProtocolError::Overflow)
}

/// Current pool rates from reserves
pub fn spot_rate(token_reserve: Wei, eth_reserve: Wei) -> Result<SpotRate, ProtocolError> {
    if token_reserve.is_zero() || eth_reserve.is_zero() {
        return Err(ProtocolError::DivisionByZero);
    }
    Ok(SpotRate {
        token_per_eth_wei: mul_div(token_reserve, rate_scale(), eth_reserve)?,
        eth_per_token_wei: mul_div(eth_reserve, rate_scale(), token_reserve)?,
    })
}

/// Bound a rate by `slippage` percent in both directions
///
/// `max = base * (100 + s) / 100`, `min = base * (100 - s) / 100`
pub fn bracket(base_rate: Wei, slippage: SlippagePct) -> Result<RateBand, ProtocolError> {
    let hundred = Wei::from(100u64);
    let s = Wei::from(slippage.get());
    Ok(RateBand {
        max_rate: mul_div(base_rate, hundred + s, hundred)?,
        min_rate: mul_div(base_rate, hundred - s, hundred)?,
    })
}

/// `amount * numerator / denominator`
pub fn proportional(amount: Wei, numerator: Wei, denominator: Wei) -> Result<Wei, ProtocolError> {
    mul_div(amount, numerator, denominator)
}

/// Output of `amount` at a 1e18-scaled `rate`
pub fn expected_output(amount: Wei, rate: Wei) -> Result<Wei, ProtocolError> {
    mul_div(amount, rate, rate_scale())
}

/// Unscaled `(token/eth, eth/token)` ratios for display; zero when empty
pub fn display_rates(token_reserve: Wei, eth_reserve: Wei) -> (f64, f64) {
    let tokens = to_f64(token_reserve);
    let eth = to_f64(eth_reserve);
    if tokens == 0.0 || eth == 0.0 {
        return (0.0, 0.0);
    }
    (tokens / eth, eth / tokens)
}

fn to_f64(value: Wei) -> f64 {
    value.to_string().parse().unwrap_or(f64::MAX)
}
