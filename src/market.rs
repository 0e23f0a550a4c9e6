//! The market this pool insures.
//!
//! The pool reads four things from the market (quote mint, settled pool
//! balance, leveraged notional, liquidation authority) and moves funds in
//! and out of it. All amounts crossing the trait are WAD-scaled.

use bytemuck::{Pod, Zeroable};
use solana_program::{account_info::AccountInfo, msg, program_error::ProgramError, pubkey::Pubkey};

use crate::cpi::{self, MarketCpiAccounts};
use crate::error::PoolError;
use crate::state::I128;
use crate::wad::{floor_to_unit, wad_to_token};

pub trait Market {
    /// Token the market settles in.
    fn quote_mint(&self) -> Result<Pubkey, ProgramError>;

    /// Amount the market has credited to the pool but not yet delivered.
    fn settled_pool_balance(&self) -> Result<i128, ProgramError>;

    fn leveraged_notional_value(&self) -> Result<i128, ProgramError>;

    /// The only address allowed to drain the pool. Read on every call.
    fn liquidation_authority(&self) -> Result<Pubkey, ProgramError>;

    /// Move `amount` from the pool into the market.
    fn deposit(&mut self, amount: u128) -> Result<(), ProgramError>;

    /// Move `amount` of the settled balance from the market into the pool.
    fn withdraw(&mut self, amount: u128) -> Result<(), ProgramError>;
}

/// "PERPMKT1"
pub const MARKET_HEADER_MAGIC: u64 = u64::from_le_bytes(*b"PERPMKT1");

/// Fixed header at offset 0 of every market account.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct MarketHeader {
    pub magic: u64,

    /// Quote (settlement) token mint
    pub quote_mint: [u8; 32],

    /// Liquidation engine allowed to call DrainPool
    pub liquidation_authority: [u8; 32],

    /// Insurance pool PDA bound to this market
    pub insurance_pool: [u8; 32],

    /// Quote amount owed to the pool (WAD)
    pub settled_pool_balance: I128,

    /// Aggregate leveraged notional (WAD)
    pub leveraged_notional_value: I128,
}

pub const MARKET_HEADER_SIZE: usize = core::mem::size_of::<MarketHeader>();

impl MarketHeader {
    /// Parse the header from raw market account data.
    pub fn read(data: &[u8]) -> Result<Self, PoolError> {
        if data.len() < MARKET_HEADER_SIZE {
            return Err(PoolError::InvalidMarket);
        }
        let header: MarketHeader = bytemuck::try_pod_read_unaligned(&data[..MARKET_HEADER_SIZE])
            .map_err(|_| PoolError::InvalidMarket)?;
        if header.magic != MARKET_HEADER_MAGIC {
            return Err(PoolError::InvalidMarket);
        }
        Ok(header)
    }

    pub fn insurance_pool_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.insurance_pool)
    }
}

/// Market account owned by an external program, driven through CPI.
///
/// Token transfers happen in whole base units of the collateral mint:
/// the settled balance is reported rounded down to a whole unit, and
/// deposits truncate any sub-unit remainder.
pub struct MarketAccount<'a, 'info> {
    market: &'a AccountInfo<'info>,
    decimals: u8,
    cpi: Option<(MarketCpiAccounts<'a, 'info>, &'a [&'a [u8]])>,
}

impl<'a, 'info> MarketAccount<'a, 'info> {
    /// Read-only view; `deposit`/`withdraw` fail.
    pub fn read_only(market: &'a AccountInfo<'info>, decimals: u8) -> Self {
        Self { market, decimals, cpi: None }
    }

    pub fn with_cpi(
        accounts: MarketCpiAccounts<'a, 'info>,
        signer_seeds: &'a [&'a [u8]],
        decimals: u8,
    ) -> Self {
        Self {
            market: accounts.market,
            decimals,
            cpi: Some((accounts, signer_seeds)),
        }
    }

    pub fn header(&self) -> Result<MarketHeader, ProgramError> {
        let data = self.market.try_borrow_data()?;
        Ok(MarketHeader::read(&data)?)
    }

    fn cpi_accounts(&self) -> Result<&(MarketCpiAccounts<'a, 'info>, &'a [&'a [u8]]), ProgramError> {
        self.cpi.as_ref().ok_or(ProgramError::NotEnoughAccountKeys)
    }
}

impl Market for MarketAccount<'_, '_> {
    fn quote_mint(&self) -> Result<Pubkey, ProgramError> {
        Ok(Pubkey::new_from_array(self.header()?.quote_mint))
    }

    fn settled_pool_balance(&self) -> Result<i128, ProgramError> {
        let settled = self.header()?.settled_pool_balance.get();
        if settled <= 0 {
            return Ok(settled);
        }
        Ok(floor_to_unit(settled as u128, self.decimals)? as i128)
    }

    fn leveraged_notional_value(&self) -> Result<i128, ProgramError> {
        Ok(self.header()?.leveraged_notional_value.get())
    }

    fn liquidation_authority(&self) -> Result<Pubkey, ProgramError> {
        Ok(Pubkey::new_from_array(self.header()?.liquidation_authority))
    }

    fn deposit(&mut self, amount: u128) -> Result<(), ProgramError> {
        let tokens = wad_to_token(amount, self.decimals)?;
        if tokens == 0 {
            msg!("Drain of {} below one token unit, nothing sent", amount);
            return Ok(());
        }
        let (accounts, seeds) = self.cpi_accounts()?;
        cpi::cpi_pool_deposit(accounts, tokens, seeds)
    }

    fn withdraw(&mut self, amount: u128) -> Result<(), ProgramError> {
        let tokens = wad_to_token(amount, self.decimals)?;
        if tokens == 0 {
            return Ok(());
        }
        let (accounts, seeds) = self.cpi_accounts()?;
        cpi::cpi_pool_withdraw(accounts, tokens, seeds)
    }
}
