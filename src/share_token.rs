//! Pool share ledger.
//!
//! Shares are WAD-scaled u128 claims on the public collateral bucket, kept
//! per holder the way staking share balances are kept on a per-user stake
//! account. The pool state keeps the authoritative supply; a `ShareToken`
//! only tracks who holds what.

use solana_program::{account_info::AccountInfo, program_error::ProgramError, pubkey::Pubkey};

use crate::error::PoolError;
use crate::state::{ShareAccount, SHARE_ACCOUNT_SIZE};

pub trait ShareToken {
    fn balance_of(&self, owner: &Pubkey) -> Result<u128, ProgramError>;

    fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    /// Fails with `InsufficientBalance` if `from` holds less than `amount`.
    fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        if amount == 0 {
            return Err(PoolError::InvalidAmount.into());
        }
        if self.balance_of(from)? < amount {
            return Err(PoolError::InsufficientBalance.into());
        }
        self.burn(from, amount)?;
        self.mint(to, amount)
    }
}

/// Share balances held in `ShareAccount` PDAs.
///
/// Only the accounts handed to the instruction are visible; the processor
/// verifies their PDA derivation before building this.
pub struct ShareAccounts<'a, 'info> {
    pool: Pubkey,
    accounts: Vec<&'a AccountInfo<'info>>,
}

impl<'a, 'info> ShareAccounts<'a, 'info> {
    pub fn new(pool: Pubkey, accounts: Vec<&'a AccountInfo<'info>>) -> Self {
        Self { pool, accounts }
    }

    fn read(&self, info: &AccountInfo) -> Result<Option<ShareAccount>, ProgramError> {
        let data = info.try_borrow_data()?;
        if data.len() < SHARE_ACCOUNT_SIZE {
            return Ok(None);
        }
        let acct: ShareAccount = bytemuck::pod_read_unaligned(&data[..SHARE_ACCOUNT_SIZE]);
        if acct.is_initialized != 1 || acct.pool != self.pool.to_bytes() {
            return Ok(None);
        }
        Ok(Some(acct))
    }

    fn find(&self, owner: &Pubkey) -> Result<Option<(&'a AccountInfo<'info>, ShareAccount)>, ProgramError> {
        for info in &self.accounts {
            if let Some(acct) = self.read(info)? {
                if acct.owner == owner.to_bytes() {
                    return Ok(Some((*info, acct)));
                }
            }
        }
        Ok(None)
    }

    fn write(info: &AccountInfo, acct: &ShareAccount) -> Result<(), ProgramError> {
        let mut data = info.try_borrow_mut_data()?;
        data[..SHARE_ACCOUNT_SIZE].copy_from_slice(bytemuck::bytes_of(acct));
        Ok(())
    }
}

impl ShareToken for ShareAccounts<'_, '_> {
    fn balance_of(&self, owner: &Pubkey) -> Result<u128, ProgramError> {
        Ok(self.find(owner)?.map(|(_, a)| a.shares.get()).unwrap_or(0))
    }

    fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let (info, mut acct) = self.find(to)?.ok_or(PoolError::InvalidPda)?;
        let bal = acct.shares.get().checked_add(amount).ok_or(PoolError::Overflow)?;
        acct.shares.set(bal);
        Self::write(info, &acct)
    }

    fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let (info, mut acct) = self.find(from)?.ok_or(PoolError::InsufficientBalance)?;
        let bal = acct.shares.get().checked_sub(amount).ok_or(PoolError::InsufficientBalance)?;
        acct.shares.set(bal);
        Self::write(info, &acct)
    }
}
