//! CPI helpers for calling into the market program.
//!
//! Instruction data is built by hand; we don't depend on the market crate.
//! The vault authority PDA signs both calls.

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};

// ═══════════════════════════════════════════════════════════════
// Market instruction tags
// ═══════════════════════════════════════════════════════════════

pub const TAG_INSURANCE_POOL_DEPOSIT: u8 = 40;
pub const TAG_INSURANCE_POOL_WITHDRAW: u8 = 41;

/// Accounts shared by both market CPIs.
pub struct MarketCpiAccounts<'a, 'info> {
    pub market_program: &'a AccountInfo<'info>,
    /// vault_auth PDA (we sign)
    pub vault_authority: &'a AccountInfo<'info>,
    pub market: &'a AccountInfo<'info>,
    /// Pool collateral vault (owned by vault_auth)
    pub pool_vault: &'a AccountInfo<'info>,
    pub market_vault: &'a AccountInfo<'info>,
    pub market_vault_authority: &'a AccountInfo<'info>,
    pub token_program: &'a AccountInfo<'info>,
}

pub fn pool_deposit_data(amount: u64) -> Vec<u8> {
    tagged_amount(TAG_INSURANCE_POOL_DEPOSIT, amount)
}

pub fn pool_withdraw_data(amount: u64) -> Vec<u8> {
    tagged_amount(TAG_INSURANCE_POOL_WITHDRAW, amount)
}

fn tagged_amount(tag: u8, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(9);
    data.push(tag);
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

// ═══════════════════════════════════════════════════════════════
// InsurancePoolDeposit (Tag 40) / InsurancePoolWithdraw (Tag 41)
// ═══════════════════════════════════════════════════════════════
// Accounts: [vault_auth(signer), market(w), pool_vault(w), market_vault(w),
//            market_vault_authority, token_program]
// Data: tag(1) + amount(8)
//
// Deposit moves pool_vault -> market_vault (drained funds).
// Withdraw moves market_vault -> pool_vault and clears the settled balance.

pub fn cpi_pool_deposit(
    accounts: &MarketCpiAccounts,
    amount: u64,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    invoke_market(accounts, pool_deposit_data(amount), signer_seeds)
}

pub fn cpi_pool_withdraw(
    accounts: &MarketCpiAccounts,
    amount: u64,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    invoke_market(accounts, pool_withdraw_data(amount), signer_seeds)
}

fn invoke_market(
    accounts: &MarketCpiAccounts,
    data: Vec<u8>,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let ix = Instruction {
        program_id: *accounts.market_program.key,
        accounts: vec![
            AccountMeta::new_readonly(*accounts.vault_authority.key, true),
            AccountMeta::new(*accounts.market.key, false),
            AccountMeta::new(*accounts.pool_vault.key, false),
            AccountMeta::new(*accounts.market_vault.key, false),
            AccountMeta::new_readonly(*accounts.market_vault_authority.key, false),
            AccountMeta::new_readonly(*accounts.token_program.key, false),
        ],
        data,
    };

    invoke_signed(
        &ix,
        &[
            accounts.vault_authority.clone(),
            accounts.market.clone(),
            accounts.pool_vault.clone(),
            accounts.market_vault.clone(),
            accounts.market_vault_authority.clone(),
            accounts.token_program.clone(),
        ],
        &[signer_seeds],
    )
}
