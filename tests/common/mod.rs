//! In-memory market, vault and share book for driving the engine in tests.
//!
//! Market and vault share one `Ledger` so collateral moved by the market
//! shows up in the vault and vice versa.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use bytemuck::Zeroable;
use perp_insurance_pool::market::Market;
use perp_insurance_pool::math::FeeCurve;
use perp_insurance_pool::pool::{InsurancePool, PoolParams, Withdrawal};
use perp_insurance_pool::error::PoolError;
use perp_insurance_pool::share_token::ShareToken;
use perp_insurance_pool::state::{PoolState, U128};
use perp_insurance_pool::vault::CollateralVault;
use perp_insurance_pool::wad::{floor_to_unit, WAD};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

#[derive(Debug, Default)]
pub struct Ledger {
    /// Collateral in pool custody
    pub vault: u128,
    /// Collateral the pool has deposited into the market
    pub market_received: u128,
    /// Owed to the pool, not yet pulled
    pub settled: i128,
    pub wallets: BTreeMap<Pubkey, u128>,
    pub market_deposit_calls: u32,
    pub market_withdraw_calls: u32,
}

pub struct MockMarket {
    pub ledger: Rc<RefCell<Ledger>>,
    pub quote_mint: Pubkey,
    pub authority: Pubkey,
    pub notional: i128,
    pub fail_withdraw: bool,
    /// Collateral decimals; deposits truncate to whole units like the SPL-backed market
    pub unit_decimals: u8,
}

impl Market for MockMarket {
    fn quote_mint(&self) -> Result<Pubkey, ProgramError> {
        Ok(self.quote_mint)
    }

    fn settled_pool_balance(&self) -> Result<i128, ProgramError> {
        Ok(self.ledger.borrow().settled)
    }

    fn leveraged_notional_value(&self) -> Result<i128, ProgramError> {
        Ok(self.notional)
    }

    fn liquidation_authority(&self) -> Result<Pubkey, ProgramError> {
        Ok(self.authority)
    }

    fn deposit(&mut self, amount: u128) -> Result<(), ProgramError> {
        let sent = floor_to_unit(amount, self.unit_decimals)?;
        if sent == 0 {
            return Ok(());
        }
        let mut l = self.ledger.borrow_mut();
        l.vault = l.vault.checked_sub(sent).ok_or(ProgramError::InsufficientFunds)?;
        l.market_received += sent;
        l.market_deposit_calls += 1;
        Ok(())
    }

    fn withdraw(&mut self, amount: u128) -> Result<(), ProgramError> {
        if self.fail_withdraw {
            return Err(ProgramError::Custom(999));
        }
        let mut l = self.ledger.borrow_mut();
        l.settled -= amount as i128;
        l.vault += amount;
        l.market_withdraw_calls += 1;
        Ok(())
    }
}

pub struct MockVault {
    pub ledger: Rc<RefCell<Ledger>>,
}

impl CollateralVault for MockVault {
    fn balance(&self) -> Result<u128, ProgramError> {
        Ok(self.ledger.borrow().vault)
    }

    fn available_from(&self, owner: &Pubkey) -> Result<u128, ProgramError> {
        Ok(self.ledger.borrow().wallets.get(owner).copied().unwrap_or(0))
    }

    fn receive(&mut self, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let mut l = self.ledger.borrow_mut();
        let wallet = l.wallets.entry(*from).or_insert(0);
        *wallet = wallet
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientFunds)?;
        l.vault += amount;
        Ok(())
    }

    fn send(&mut self, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let mut l = self.ledger.borrow_mut();
        l.vault = l.vault.checked_sub(amount).ok_or(ProgramError::InsufficientFunds)?;
        *l.wallets.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

/// Share balances by holder, with a running supply to check against the pool.
#[derive(Debug, Default, Clone)]
pub struct ShareBook {
    balances: BTreeMap<Pubkey, u128>,
    total_supply: u128,
}

impl ShareBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Pubkey, &u128)> {
        self.balances.iter().filter(|(_, b)| **b > 0)
    }
}

impl ShareToken for ShareBook {
    fn balance_of(&self, owner: &Pubkey) -> Result<u128, ProgramError> {
        Ok(self.balances.get(owner).copied().unwrap_or(0))
    }

    fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let total = self.total_supply.checked_add(amount).ok_or(PoolError::Overflow)?;
        let bal = self.balances.entry(*to).or_insert(0);
        *bal = bal.checked_add(amount).ok_or(PoolError::Overflow)?;
        self.total_supply = total;
        Ok(())
    }

    fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let bal = self.balances.get_mut(from).ok_or(PoolError::InsufficientBalance)?;
        *bal = bal.checked_sub(amount).ok_or(PoolError::InsufficientBalance)?;
        self.total_supply = self.total_supply.checked_sub(amount).ok_or(PoolError::Overflow)?;
        Ok(())
    }
}

pub struct Harness {
    pub state: PoolState,
    pub ledger: Rc<RefCell<Ledger>>,
    pub market: MockMarket,
    pub vault: MockVault,
    pub shares: ShareBook,
}

pub fn wad(units: u128) -> u128 {
    units * WAD
}

impl Harness {
    pub fn new(fee_curve: FeeCurve) -> Self {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let market = MockMarket {
            ledger: ledger.clone(),
            quote_mint: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            notional: 0,
            fail_withdraw: false,
            unit_decimals: 6,
        };
        let vault = MockVault { ledger: ledger.clone() };
        let mut state = PoolState::zeroed();
        InsurancePool::create(&mut state, &market, params(&market, fee_curve))
            .expect("create pool");
        Self {
            state,
            ledger,
            market,
            vault,
            shares: ShareBook::new(),
        }
    }

    /// Force balances as if reached through earlier operations.
    /// Vault custody is set to exactly buffer + public.
    pub fn seed(&mut self, buffer: u128, public: u128, holders: &[(Pubkey, u128)]) {
        self.state.buffer_collateral = U128::new(buffer);
        self.state.public_collateral = U128::new(public);
        let mut supply = 0;
        for (who, amount) in holders {
            self.shares.mint(who, *amount).unwrap();
            supply += amount;
        }
        self.state.total_shares = U128::new(supply);
        self.ledger.borrow_mut().vault = buffer + public;
    }

    pub fn fund(&self, who: &Pubkey, amount: u128) {
        *self.ledger.borrow_mut().wallets.entry(*who).or_insert(0) += amount;
    }

    pub fn wallet(&self, who: &Pubkey) -> u128 {
        self.ledger.borrow().wallets.get(who).copied().unwrap_or(0)
    }

    pub fn vault_balance(&self) -> u128 {
        self.ledger.borrow().vault
    }

    pub fn settle(&self, amount: i128) {
        self.ledger.borrow_mut().settled = amount;
    }

    pub fn buffer(&self) -> u128 {
        self.state.buffer_collateral.get()
    }

    pub fn public(&self) -> u128 {
        self.state.public_collateral.get()
    }

    pub fn supply(&self) -> u128 {
        self.state.total_shares.get()
    }

    pub fn deposit(&mut self, who: &Pubkey, amount: u128) -> Result<u128, ProgramError> {
        let Harness { state, market, vault, shares, .. } = self;
        InsurancePool::load(state)?.deposit(market, vault, shares, who, amount)
    }

    pub fn withdraw(&mut self, who: &Pubkey, amount: u128) -> Result<Withdrawal, ProgramError> {
        let Harness { state, market, vault, shares, .. } = self;
        InsurancePool::load(state)?.withdraw(market, vault, shares, who, amount)
    }

    pub fn update(&mut self) -> Result<u128, ProgramError> {
        let Harness { state, market, vault, .. } = self;
        InsurancePool::load(state)?.update_pool_amount(market, &*vault)
    }

    pub fn drain(&mut self, caller: &Pubkey, amount: u128) -> Result<u128, ProgramError> {
        let Harness { state, market, vault, .. } = self;
        InsurancePool::load(state)?.drain_pool(market, &*vault, caller, amount)
    }

    pub fn authority(&self) -> Pubkey {
        self.market.authority
    }
}

pub fn params(market: &MockMarket, fee_curve: FeeCurve) -> PoolParams {
    PoolParams {
        market: Pubkey::new_unique(),
        market_program: Pubkey::new_unique(),
        collateral_mint: market.quote_mint,
        vault: Pubkey::new_unique(),
        collateral_decimals: 6,
        fee_curve,
        bump: 255,
        vault_authority_bump: 254,
    }
}
