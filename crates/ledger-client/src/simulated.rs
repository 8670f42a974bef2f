//! In-process simulated ledger
//!
//! Emulates the token, exchange and futures contracts in memory so the
//! exchange can run and be tested without a chain. Each submitted call is
//! applied to a copy of the state and committed only if it succeeds, so a
//! failed transaction leaves no trace besides its receipt.
//!
//! Exchange semantics:
//! - Reserves are the ETH and token balances held by the exchange address.
//! - Swaps use the constant product formula with a `fee_num / fee_denom` fee.
//! - `SwapTokensForEth` reverts when the wei-per-token rate exceeds `max_rate`;
//!   `SwapEthForTokens` reverts when the token-per-ETH rate is below `min_rate`.
//! - Liquidity calls revert unless `eth_per_token <= max_rate` and
//!   `token_per_eth >= min_rate`. LP shares are minted in proportion to the
//!   ETH deposited.
//! - Futures escrow the staked asset with the futures address and swap it
//!   through the pool on execution, if the spot rate honours the commitment.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use exchange_core::constants::{rate_scale, SECONDS_PER_DAY};
use exchange_core::{Address, Asset, LedgerConfig, Timestamp, TxHash, Wei};
use primitive_types::U512;
use tokio::sync::RwLock;

use crate::types::{FutureContract, LedgerCall, TxReceipt, TxStatus};
use crate::{LedgerPort, Result};

/// Revert reason of a failed call
type Revert = String;

/// Swap fee charged by the simulated exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeConfig {
    /// Fee numerator (e.g., 997)
    pub fee_num: u64,
    /// Fee denominator (e.g., 1000)
    pub fee_denom: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            fee_num: 997,
            fee_denom: 1000,
        }
    }
}

impl FeeConfig {
    /// No swap fee
    pub fn zero() -> Self {
        Self {
            fee_num: 1,
            fee_denom: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    eth: HashMap<Address, Wei>,
    tokens: HashMap<Address, Wei>,
    shares: HashMap<Address, Wei>,
    allowances: HashMap<(Address, Address), Wei>,
    total_shares: Wei,
    futures: Vec<FutureContract>,
    clock: Timestamp,
    block_number: u64,
}

impl LedgerState {
    fn book(&self, asset: Asset) -> &HashMap<Address, Wei> {
        match asset {
            Asset::Eth => &self.eth,
            Asset::Token => &self.tokens,
            Asset::Liquidity => &self.shares,
        }
    }

    fn book_mut(&mut self, asset: Asset) -> &mut HashMap<Address, Wei> {
        match asset {
            Asset::Eth => &mut self.eth,
            Asset::Token => &mut self.tokens,
            Asset::Liquidity => &mut self.shares,
        }
    }

    fn balance_of(&self, address: &Address, asset: Asset) -> Wei {
        self.book(asset).get(address).copied().unwrap_or_default()
    }

    fn debit(&mut self, address: &Address, asset: Asset, amount: Wei) -> std::result::Result<(), Revert> {
        let balance = self.balance_of(address, asset);
        if balance < amount {
            return Err(format!(
                "insufficient {} balance: need {}, have {}",
                asset, amount, balance
            ));
        }
        self.book_mut(asset).insert(address.clone(), balance - amount);
        Ok(())
    }

    fn credit(&mut self, address: &Address, asset: Asset, amount: Wei) -> std::result::Result<(), Revert> {
        let balance = self
            .balance_of(address, asset)
            .checked_add(amount)
            .ok_or_else(|| format!("{} balance overflow", asset))?;
        self.book_mut(asset).insert(address.clone(), balance);
        Ok(())
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        asset: Asset,
        amount: Wei,
    ) -> std::result::Result<(), Revert> {
        self.debit(from, asset, amount)?;
        self.credit(to, asset, amount)
    }

    /// Token `transferFrom` by `spender`, consuming allowance
    fn pull_tokens(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Wei,
    ) -> std::result::Result<(), Revert> {
        let key = (owner.clone(), spender.clone());
        let allowance = self.allowances.get(&key).copied().unwrap_or_default();
        if allowance < amount {
            return Err(format!(
                "insufficient allowance: need {}, have {}",
                amount, allowance
            ));
        }
        self.transfer(owner, spender, Asset::Token, amount)?;
        self.allowances.insert(key, allowance - amount);
        Ok(())
    }
}

/// In-memory ledger implementing [`LedgerPort`]
pub struct SimulatedLedger {
    exchange: Address,
    futures: Address,
    fee: FeeConfig,
    state: RwLock<LedgerState>,
}

impl SimulatedLedger {
    /// Create an empty ledger using the contract addresses from `config`
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_fee(config, FeeConfig::default())
    }

    pub fn with_fee(config: &LedgerConfig, fee: FeeConfig) -> Self {
        let clock = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            exchange: config.exchange_address.clone(),
            futures: config.futures_address.clone(),
            fee,
            state: RwLock::new(LedgerState {
                clock,
                ..LedgerState::default()
            }),
        }
    }

    /// Genesis allocation of ETH to an account
    pub async fn fund_eth(&self, address: &Address, amount: Wei) {
        let mut state = self.state.write().await;
        let balance = state.balance_of(address, Asset::Eth).saturating_add(amount);
        state.eth.insert(address.clone(), balance);
    }

    /// Move the ledger clock forward
    pub async fn advance_time(&self, secs: u64) {
        let mut state = self.state.write().await;
        state.clock = state.clock.saturating_add(secs);
    }

    /// Total LP shares outstanding
    pub async fn total_liquidity(&self) -> Wei {
        self.state.read().await.total_shares
    }

    fn reserves_of(&self, state: &LedgerState) -> (Wei, Wei) {
        (
            state.balance_of(&self.exchange, Asset::Token),
            state.balance_of(&self.exchange, Asset::Eth),
        )
    }

    fn initialized_reserves(&self, state: &LedgerState) -> std::result::Result<(Wei, Wei), Revert> {
        let (token_reserve, eth_reserve) = self.reserves_of(state);
        if token_reserve.is_zero() || eth_reserve.is_zero() {
            return Err("pool not initialized".to_string());
        }
        Ok((token_reserve, eth_reserve))
    }

    /// Constant product output: `reserve_out * in * num / (reserve_in * denom + in * num)`
    fn amount_out(
        &self,
        amount_in: Wei,
        reserve_in: Wei,
        reserve_out: Wei,
    ) -> std::result::Result<Wei, Revert> {
        let in_with_fee = amount_in
            .checked_mul(Wei::from(self.fee.fee_num))
            .ok_or("swap amount overflow")?;
        let denominator = reserve_in
            .checked_mul(Wei::from(self.fee.fee_denom))
            .and_then(|d| d.checked_add(in_with_fee))
            .ok_or("reserve overflow")?;
        let out = mul_div(in_with_fee, reserve_out, denominator)?;
        if out.is_zero() {
            return Err("swap amount too small".to_string());
        }
        Ok(out)
    }

    fn check_band(
        token_reserve: Wei,
        eth_reserve: Wei,
        max_rate: Wei,
        min_rate: Wei,
    ) -> std::result::Result<(), Revert> {
        let eth_per_token = mul_div(eth_reserve, rate_scale(), token_reserve)?;
        if eth_per_token > max_rate {
            return Err(format!(
                "exchange rate {} above max {}",
                eth_per_token, max_rate
            ));
        }
        let token_per_eth = mul_div(token_reserve, rate_scale(), eth_reserve)?;
        if token_per_eth < min_rate {
            return Err(format!(
                "exchange rate {} below min {}",
                token_per_eth, min_rate
            ));
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut LedgerState,
        from: &Address,
        call: LedgerCall,
    ) -> std::result::Result<(), Revert> {
        match call {
            LedgerCall::Mint { amount } => state.credit(from, Asset::Token, amount),

            LedgerCall::Approve { spender, amount } => {
                state.allowances.insert((from.clone(), spender), amount);
                Ok(())
            }

            LedgerCall::Transfer { to, asset, amount } => match asset {
                Asset::Liquidity => Err("liquidity is not transferable".to_string()),
                _ => state.transfer(from, &to, asset, amount),
            },

            LedgerCall::CreatePool {
                token_amount,
                eth_amount,
            } => {
                let (token_reserve, eth_reserve) = self.reserves_of(state);
                if !token_reserve.is_zero() || !eth_reserve.is_zero() {
                    return Err("pool already created".to_string());
                }
                if token_amount.is_zero() || eth_amount.is_zero() {
                    return Err("pool needs both assets".to_string());
                }
                state.pull_tokens(from, &self.exchange, token_amount)?;
                state.transfer(from, &self.exchange, Asset::Eth, eth_amount)?;
                state.credit(from, Asset::Liquidity, eth_amount)?;
                state.total_shares = eth_amount;
                Ok(())
            }

            LedgerCall::SwapTokensForEth {
                token_amount,
                max_rate,
            } => {
                let (token_reserve, eth_reserve) = self.initialized_reserves(state)?;
                let rate = mul_div(eth_reserve, rate_scale(), token_reserve)?;
                if rate > max_rate {
                    return Err(format!("exchange rate {} above max {}", rate, max_rate));
                }
                let out = self.amount_out(token_amount, token_reserve, eth_reserve)?;
                state.pull_tokens(from, &self.exchange, token_amount)?;
                state.transfer(&self.exchange, from, Asset::Eth, out)
            }

            LedgerCall::SwapEthForTokens {
                wei_amount,
                min_rate,
            } => {
                let (token_reserve, eth_reserve) = self.initialized_reserves(state)?;
                let rate = mul_div(token_reserve, rate_scale(), eth_reserve)?;
                if rate < min_rate {
                    return Err(format!("exchange rate {} below min {}", rate, min_rate));
                }
                let out = self.amount_out(wei_amount, eth_reserve, token_reserve)?;
                state.transfer(from, &self.exchange, Asset::Eth, wei_amount)?;
                state.transfer(&self.exchange, from, Asset::Token, out)
            }

            LedgerCall::AddLiquidity {
                eth_amount,
                max_rate,
                min_rate,
            } => {
                let (token_reserve, eth_reserve) = self.initialized_reserves(state)?;
                Self::check_band(token_reserve, eth_reserve, max_rate, min_rate)?;
                if eth_amount.is_zero() {
                    return Err("zero liquidity".to_string());
                }
                let token_amount = mul_div(eth_amount, token_reserve, eth_reserve)?;
                let minted = mul_div(eth_amount, state.total_shares, eth_reserve)?;
                state.pull_tokens(from, &self.exchange, token_amount)?;
                state.transfer(from, &self.exchange, Asset::Eth, eth_amount)?;
                state.credit(from, Asset::Liquidity, minted)?;
                state.total_shares = state.total_shares.saturating_add(minted);
                Ok(())
            }

            LedgerCall::RemoveLiquidity {
                eth_amount,
                max_rate,
                min_rate,
            } => {
                let (token_reserve, eth_reserve) = self.initialized_reserves(state)?;
                Self::check_band(token_reserve, eth_reserve, max_rate, min_rate)?;
                if eth_amount.is_zero() {
                    return Err("zero liquidity".to_string());
                }
                if eth_amount > eth_reserve {
                    return Err("amount exceeds pool reserves".to_string());
                }
                let token_amount = mul_div(eth_amount, token_reserve, eth_reserve)?;
                let burned = mul_div_ceil(eth_amount, state.total_shares, eth_reserve)?;
                if burned.is_zero() || state.balance_of(from, Asset::Liquidity) < burned {
                    return Err("amount exceeds liquidity provided".to_string());
                }
                state.debit(from, Asset::Liquidity, burned)?;
                state.total_shares = state.total_shares.saturating_sub(burned);
                state.transfer(&self.exchange, from, Asset::Eth, eth_amount)?;
                state.transfer(&self.exchange, from, Asset::Token, token_amount)
            }

            LedgerCall::RemoveAllLiquidity { max_rate, min_rate } => {
                let (token_reserve, eth_reserve) = self.initialized_reserves(state)?;
                Self::check_band(token_reserve, eth_reserve, max_rate, min_rate)?;
                let held = state.balance_of(from, Asset::Liquidity);
                if held.is_zero() {
                    return Err("no liquidity provided".to_string());
                }
                let eth_out = mul_div(held, eth_reserve, state.total_shares)?;
                let token_out = mul_div(held, token_reserve, state.total_shares)?;
                state.debit(from, Asset::Liquidity, held)?;
                state.total_shares = state.total_shares.saturating_sub(held);
                state.transfer(&self.exchange, from, Asset::Eth, eth_out)?;
                state.transfer(&self.exchange, from, Asset::Token, token_out)
            }

            LedgerCall::CreateBuyFuture {
                exchange_rate,
                wei_amount,
                duration_days,
            } => {
                if wei_amount.is_zero() || exchange_rate.is_zero() {
                    return Err("future needs an amount and a rate".to_string());
                }
                state.transfer(from, &self.futures, Asset::Eth, wei_amount)?;
                push_future(state, from, wei_amount, exchange_rate, true, duration_days);
                Ok(())
            }

            LedgerCall::CreateSellFuture {
                token_amount,
                exchange_rate,
                duration_days,
            } => {
                if token_amount.is_zero() || exchange_rate.is_zero() {
                    return Err("future needs an amount and a rate".to_string());
                }
                state.pull_tokens(from, &self.futures, token_amount)?;
                push_future(state, from, token_amount, exchange_rate, false, duration_days);
                Ok(())
            }

            LedgerCall::ExecuteFuture { id } => {
                let future = usize::try_from(id)
                    .ok()
                    .and_then(|idx| state.futures.get(idx))
                    .cloned()
                    .ok_or_else(|| format!("future {} not found", id))?;
                if future.buyer != *from {
                    return Err("only the creator can execute a future".to_string());
                }
                if future.executed {
                    return Err("future already executed".to_string());
                }
                if state.clock < future.expire_at {
                    return Err("future not yet expired".to_string());
                }

                let (token_reserve, eth_reserve) = self.initialized_reserves(state)?;
                let spot = mul_div(token_reserve, rate_scale(), eth_reserve)?;

                if future.is_buy_order {
                    if spot < future.exchange_rate {
                        return Err(format!(
                            "spot rate {} below committed {}",
                            spot, future.exchange_rate
                        ));
                    }
                    let out = self.amount_out(future.amount, eth_reserve, token_reserve)?;
                    state.transfer(&self.futures, &self.exchange, Asset::Eth, future.amount)?;
                    state.transfer(&self.exchange, from, Asset::Token, out)?;
                } else {
                    if spot > future.exchange_rate {
                        return Err(format!(
                            "spot rate {} above committed {}",
                            spot, future.exchange_rate
                        ));
                    }
                    let out = self.amount_out(future.amount, token_reserve, eth_reserve)?;
                    state.transfer(&self.futures, &self.exchange, Asset::Token, future.amount)?;
                    state.transfer(&self.exchange, from, Asset::Eth, out)?;
                }

                if let Some(stored) = state.futures.get_mut(future.id as usize) {
                    stored.executed = true;
                }
                Ok(())
            }
        }
    }
}

fn push_future(
    state: &mut LedgerState,
    buyer: &Address,
    amount: Wei,
    exchange_rate: Wei,
    is_buy_order: bool,
    duration_days: u64,
) {
    let expire_at = state
        .clock
        .saturating_add(duration_days.saturating_mul(SECONDS_PER_DAY));
    let id = state.futures.len() as u64;
    state.futures.push(FutureContract {
        id,
        buyer: buyer.clone(),
        amount,
        exchange_rate,
        is_buy_order,
        expire_at,
        executed: false,
    });
}

/// `a * b / c` with a 512-bit intermediate product
fn mul_div(a: Wei, b: Wei, c: Wei) -> std::result::Result<Wei, Revert> {
    if c.is_zero() {
        return Err("division by zero".to_string());
    }
    Wei::try_from(a.full_mul(b) / U512::from(c)).map_err(|_| "arithmetic overflow".to_string())
}

/// `a * b / c` rounded up, so a withdrawal always burns at least its share
fn mul_div_ceil(a: Wei, b: Wei, c: Wei) -> std::result::Result<Wei, Revert> {
    if c.is_zero() {
        return Err("division by zero".to_string());
    }
    let divisor = U512::from(c);
    let (quotient, remainder) = a.full_mul(b).div_mod(divisor);
    let quotient = if remainder.is_zero() {
        quotient
    } else {
        quotient + U512::one()
    };
    Wei::try_from(quotient).map_err(|_| "arithmetic overflow".to_string())
}

#[async_trait]
impl LedgerPort for SimulatedLedger {
    async fn get_reserves(&self) -> Result<(Wei, Wei)> {
        let state = self.state.read().await;
        Ok(self.reserves_of(&state))
    }

    async fn get_balance(&self, address: &Address, asset: Asset) -> Result<Wei> {
        Ok(self.state.read().await.balance_of(address, asset))
    }

    async fn get_allowance(&self, owner: &Address, spender: &Address) -> Result<Wei> {
        let state = self.state.read().await;
        Ok(state
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default())
    }

    async fn get_future(&self, id: u64) -> Result<Option<FutureContract>> {
        let state = self.state.read().await;
        Ok(usize::try_from(id)
            .ok()
            .and_then(|idx| state.futures.get(idx))
            .cloned())
    }

    async fn now(&self) -> Result<Timestamp> {
        Ok(self.state.read().await.clock)
    }

    async fn submit(&self, from: &Address, call: LedgerCall) -> Result<TxReceipt> {
        let mut state = self.state.write().await;
        let block_number = state.block_number + 1;
        let tx_hash = TxHash::new(format!("0x{:064x}", block_number));

        let mut next = state.clone();
        let status = match self.apply(&mut next, from, call) {
            Ok(()) => {
                *state = next;
                TxStatus::Success
            }
            Err(reason) => TxStatus::Failed { reason },
        };
        state.block_number = block_number;

        Ok(TxReceipt {
            tx_hash,
            block_number,
            status,
        })
    }
}
