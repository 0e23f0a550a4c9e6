//! Collateral custody.
//!
//! Amounts crossing the trait are WAD-scaled. The SPL implementation moves
//! whole token base units; payouts truncate, so sub-unit dust stays in the
//! vault.

use solana_program::{
    account_info::AccountInfo,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
};
use spl_token::state::Account as TokenAccount;

use crate::error::PoolError;
use crate::wad::{token_to_wad, wad_to_token};

pub trait CollateralVault {
    /// Collateral currently in custody.
    fn balance(&self) -> Result<u128, ProgramError>;

    /// Collateral `owner` can put into the pool right now.
    fn available_from(&self, owner: &Pubkey) -> Result<u128, ProgramError>;

    /// Pull `amount` from `from`. Fails with `InsufficientFunds` if the
    /// transfer cannot complete.
    fn receive(&mut self, from: &Pubkey, amount: u128) -> Result<(), ProgramError>;

    /// Pay `amount` out to `to`.
    fn send(&mut self, to: &Pubkey, amount: u128) -> Result<(), ProgramError>;
}

/// SPL token vault owned by the pool's vault authority PDA, paired with
/// the one user token account an instruction moves funds to or from.
pub struct TokenVault<'a, 'info> {
    pub vault: &'a AccountInfo<'info>,
    pub vault_authority: &'a AccountInfo<'info>,
    pub token_program: &'a AccountInfo<'info>,
    /// (user, user token account)
    pub counterparty: Option<(&'a AccountInfo<'info>, &'a AccountInfo<'info>)>,
    pub signer_seeds: &'a [&'a [u8]],
    pub decimals: u8,
}

impl<'a, 'info> TokenVault<'a, 'info> {
    fn counterparty_for(
        &self,
        owner: &Pubkey,
    ) -> Result<(&'a AccountInfo<'info>, &'a AccountInfo<'info>), ProgramError> {
        match self.counterparty {
            Some((user, user_token)) if user.key == owner => Ok((user, user_token)),
            _ => Err(ProgramError::NotEnoughAccountKeys),
        }
    }
}

fn token_amount(account: &AccountInfo) -> Result<u64, ProgramError> {
    let data = account.try_borrow_data()?;
    Ok(TokenAccount::unpack(&data)?.amount)
}

impl CollateralVault for TokenVault<'_, '_> {
    fn balance(&self) -> Result<u128, ProgramError> {
        Ok(token_to_wad(token_amount(self.vault)?, self.decimals)?)
    }

    fn available_from(&self, owner: &Pubkey) -> Result<u128, ProgramError> {
        let (_, user_token) = self.counterparty_for(owner)?;
        let data = user_token.try_borrow_data()?;
        let account = TokenAccount::unpack(&data)?;
        if account.owner != *owner {
            return Ok(0);
        }
        Ok(token_to_wad(account.amount, self.decimals)?)
    }

    fn receive(&mut self, from: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let (user, user_token) = self.counterparty_for(from)?;
        let tokens = wad_to_token(amount, self.decimals)?;
        invoke(
            &spl_token::instruction::transfer(
                self.token_program.key,
                user_token.key,
                self.vault.key,
                user.key,
                &[],
                tokens,
            )?,
            &[user_token.clone(), self.vault.clone(), user.clone(), self.token_program.clone()],
        )
        .map_err(|e| {
            msg!("Collateral transfer failed: {:?}", e);
            PoolError::InsufficientFunds.into()
        })
    }

    fn send(&mut self, to: &Pubkey, amount: u128) -> Result<(), ProgramError> {
        let (_, user_token) = self.counterparty_for(to)?;
        let tokens = wad_to_token(amount, self.decimals)?;
        if tokens == 0 {
            return Ok(());
        }
        invoke_signed(
            &spl_token::instruction::transfer(
                self.token_program.key,
                self.vault.key,
                user_token.key,
                self.vault_authority.key,
                &[],
                tokens,
            )?,
            &[
                self.vault.clone(),
                user_token.clone(),
                self.vault_authority.clone(),
                self.token_program.clone(),
            ],
            &[self.signer_seeds],
        )
    }
}
