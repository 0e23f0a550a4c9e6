use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    instruction::Instruction,
    program::{invoke_signed, set_return_data},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};
use spl_token::state::{Account as TokenAccount, Mint};

use crate::cpi::MarketCpiAccounts;
use crate::error::PoolError;
use crate::instruction::PoolInstruction;
use crate::market::{MarketAccount, MarketHeader};
use crate::math::FeeCurve;
use crate::pool::{InsurancePool, PoolParams};
use crate::share_token::{ShareAccounts, ShareToken};
use crate::state::{self, PoolState, ShareAccount, POOL_STATE_SIZE, SHARE_ACCOUNT_SIZE};
use crate::vault::TokenVault;
use crate::wad::token_to_wad;

pub fn process(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = PoolInstruction::unpack(instruction_data)?;

    match instruction {
        PoolInstruction::InitPool { fee_curve } => {
            process_init_pool(program_id, accounts, fee_curve)
        }
        PoolInstruction::Deposit { amount } => {
            process_deposit(program_id, accounts, amount)
        }
        PoolInstruction::Withdraw { shares } => {
            process_withdraw(program_id, accounts, shares)
        }
        PoolInstruction::UpdatePoolAmount => {
            process_update_pool_amount(program_id, accounts)
        }
        PoolInstruction::DrainPool { amount } => {
            process_drain_pool(program_id, accounts, amount)
        }
        PoolInstruction::TransferShares { amount } => {
            process_transfer_shares(program_id, accounts, amount)
        }
        PoolInstruction::QueryPool => {
            process_query_pool(program_id, accounts)
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Helpers: pool validation, share accounts
// ═══════════════════════════════════════════════════════════════

/// Verify the token program is the real SPL Token program.
/// The vault authority signs token CPIs; a fake token program would
/// receive that signature.
fn verify_token_program(token_program: &AccountInfo) -> ProgramResult {
    if *token_program.key != spl_token::id() {
        msg!("Error: invalid token program {}", token_program.key);
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

/// Copy of the pool state after checking the PDA belongs to `market`.
fn read_pool(
    program_id: &Pubkey,
    pool_pda: &AccountInfo,
    market: &Pubkey,
) -> Result<PoolState, ProgramError> {
    let (expected_pool, _) = state::derive_pool_pda(program_id, market);
    if *pool_pda.key != expected_pool || pool_pda.owner != program_id {
        return Err(PoolError::InvalidPda.into());
    }
    let data = pool_pda.try_borrow_data()?;
    if data.len() < POOL_STATE_SIZE {
        return Err(PoolError::NotInitialized.into());
    }
    let pool: PoolState = bytemuck::pod_read_unaligned(&data[..POOL_STATE_SIZE]);
    if pool.is_initialized != 1 {
        return Err(PoolError::NotInitialized.into());
    }
    Ok(pool)
}

/// Checks shared by every instruction that moves funds through the market.
fn validate_fund_accounts(
    program_id: &Pubkey,
    pool: &PoolState,
    pool_pda: &AccountInfo,
    vault: &AccountInfo,
    vault_auth: &AccountInfo,
    market: &AccountInfo,
    market_program: &AccountInfo,
    token_program: &AccountInfo,
) -> ProgramResult {
    if pool.vault != vault.key.to_bytes() {
        return Err(PoolError::InvalidPda.into());
    }
    let (expected_vault_auth, _) = state::derive_vault_authority(program_id, pool_pda.key);
    if *vault_auth.key != expected_vault_auth {
        return Err(PoolError::InvalidPda.into());
    }
    if pool.market_program != market_program.key.to_bytes() || market.owner != market_program.key {
        msg!("Error: market {} not owned by {}", market.key, market_program.key);
        return Err(PoolError::InvalidMarketProgram.into());
    }
    verify_token_program(token_program)
}

/// Collateral token account must hold the pool's collateral mint.
fn validate_user_token(pool: &PoolState, user_token: &AccountInfo, user: &Pubkey) -> ProgramResult {
    let data = user_token.try_borrow_data()?;
    let account = TokenAccount::unpack(&data)?;
    if account.mint.to_bytes() != pool.collateral_mint || account.owner != *user {
        return Err(PoolError::InvalidMint.into());
    }
    Ok(())
}

/// Create and initialize `owner`'s share account if it does not exist yet.
/// System instructions that turn `pda` into a rent-exempt account of
/// `space` bytes owned by `owner`.
///
/// `create_account` refuses an address that already holds lamports, and
/// anyone can send lamports to a PDA before it is created. A funded address
/// is topped up to `rent_minimum`, then allocated and assigned instead.
pub fn pda_create_instructions(
    payer: &Pubkey,
    pda: &Pubkey,
    current_lamports: u64,
    rent_minimum: u64,
    space: usize,
    owner: &Pubkey,
) -> Vec<Instruction> {
    if current_lamports == 0 {
        return vec![system_instruction::create_account(
            payer,
            pda,
            rent_minimum,
            space as u64,
            owner,
        )];
    }
    let mut ixs = Vec::with_capacity(3);
    let shortfall = rent_minimum.saturating_sub(current_lamports);
    if shortfall > 0 {
        ixs.push(system_instruction::transfer(payer, pda, shortfall));
    }
    ixs.push(system_instruction::allocate(pda, space as u64));
    ixs.push(system_instruction::assign(pda, owner));
    ixs
}

fn create_pda_account<'a>(
    program_id: &Pubkey,
    payer: &AccountInfo<'a>,
    pda: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    rent_minimum: u64,
    space: usize,
    seeds: &[&[u8]],
) -> ProgramResult {
    let ixs = pda_create_instructions(
        payer.key,
        pda.key,
        pda.lamports(),
        rent_minimum,
        space,
        program_id,
    );
    for ix in &ixs {
        invoke_signed(ix, &[payer.clone(), pda.clone(), system_program.clone()], &[seeds])?;
    }
    Ok(())
}

fn ensure_share_account<'a>(
    program_id: &Pubkey,
    payer: &AccountInfo<'a>,
    pool_pda: &AccountInfo<'a>,
    owner: &Pubkey,
    share_pda: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
) -> ProgramResult {
    let (expected, bump) = state::derive_share_pda(program_id, pool_pda.key, owner);
    if *share_pda.key != expected {
        return Err(PoolError::InvalidPda.into());
    }
    if !share_pda.data_is_empty() {
        return Ok(());
    }

    let share_seeds: &[&[u8]] = &[b"pool_share", pool_pda.key.as_ref(), owner.as_ref(), &[bump]];
    let rent = Rent::get()?;
    create_pda_account(
        program_id,
        payer,
        share_pda,
        system_program,
        rent.minimum_balance(SHARE_ACCOUNT_SIZE),
        SHARE_ACCOUNT_SIZE,
        share_seeds,
    )?;

    let mut data = share_pda.try_borrow_mut_data()?;
    let share: &mut ShareAccount = bytemuck::from_bytes_mut(&mut data[..SHARE_ACCOUNT_SIZE]);
    share.is_initialized = 1;
    share.bump = bump;
    share.pool = pool_pda.key.to_bytes();
    share.owner = owner.to_bytes();
    Ok(())
}

fn verify_share_pda(
    program_id: &Pubkey,
    pool_pda: &Pubkey,
    owner: &Pubkey,
    share_pda: &AccountInfo,
) -> ProgramResult {
    let (expected, _) = state::derive_share_pda(program_id, pool_pda, owner);
    if *share_pda.key != expected || share_pda.owner != program_id {
        return Err(PoolError::InvalidPda.into());
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 0: InitPool
// ═══════════════════════════════════════════════════════════════

fn process_init_pool(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    fee_curve: u8,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let payer = next_account_info(accounts_iter)?;
    let market = next_account_info(accounts_iter)?;
    let pool_pda = next_account_info(accounts_iter)?;
    let vault = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let collateral_mint = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;
    let rent_sysvar = next_account_info(accounts_iter)?;

    if !payer.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    let fee_curve = FeeCurve::try_from(fee_curve)?;

    // Derive and verify pool PDA
    let (expected_pool, pool_bump) = state::derive_pool_pda(program_id, market.key);
    if *pool_pda.key != expected_pool {
        return Err(PoolError::InvalidPda.into());
    }
    if !pool_pda.data_is_empty() {
        return Err(PoolError::AlreadyExists.into());
    }

    let (expected_vault_auth, vault_auth_bump) =
        state::derive_vault_authority(program_id, &expected_pool);
    if *vault_auth.key != expected_vault_auth {
        return Err(PoolError::InvalidPda.into());
    }

    // Validate token program BEFORE any invoke_signed that grants PDA signer authority
    verify_token_program(token_program)?;

    // The market must already point at this pool
    let header = MarketHeader::read(&market.try_borrow_data()?)?;
    if header.insurance_pool_pubkey() != expected_pool {
        msg!("Error: market {} is bound to pool {}", market.key, header.insurance_pool_pubkey());
        return Err(PoolError::InvalidMarket.into());
    }

    if collateral_mint.owner != token_program.key {
        return Err(PoolError::InvalidMint.into());
    }
    let decimals = Mint::unpack(&collateral_mint.try_borrow_data()?)?.decimals;

    let rent = Rent::from_account_info(rent_sysvar)?;

    // Create pool PDA account
    let pool_seeds: &[&[u8]] = &[b"insurance_pool", market.key.as_ref(), &[pool_bump]];
    create_pda_account(
        program_id,
        payer,
        pool_pda,
        system_program,
        rent.minimum_balance(POOL_STATE_SIZE),
        POOL_STATE_SIZE,
        pool_seeds,
    )?;

    // Initialize vault token account (authority = vault_auth PDA)
    let vault_auth_seeds: &[&[u8]] = &[b"vault_auth", pool_pda.key.as_ref(), &[vault_auth_bump]];
    invoke_signed(
        &spl_token::instruction::initialize_account(
            token_program.key,
            vault.key,
            collateral_mint.key,
            vault_auth.key,
        )?,
        &[vault.clone(), collateral_mint.clone(), vault_auth.clone(), rent_sysvar.clone()],
        &[vault_auth_seeds],
    )?;

    // Write pool state
    let mut pool_data = pool_pda.try_borrow_mut_data()?;
    let pool_state: &mut PoolState = bytemuck::from_bytes_mut(&mut pool_data[..POOL_STATE_SIZE]);

    let market_view = MarketAccount::read_only(market, decimals);
    InsurancePool::create(
        pool_state,
        &market_view,
        PoolParams {
            market: *market.key,
            market_program: *market.owner,
            collateral_mint: *collateral_mint.key,
            vault: *vault.key,
            collateral_decimals: decimals,
            fee_curve,
            bump: pool_bump,
            vault_authority_bump: vault_auth_bump,
        },
    )?;

    msg!(
        "Insurance pool created for market {} (collateral {}, {} decimals)",
        market.key,
        collateral_mint.key,
        decimals
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 1: Deposit
// ═══════════════════════════════════════════════════════════════

fn process_deposit(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
) -> ProgramResult {
    if amount == 0 {
        return Err(PoolError::InvalidAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let user = next_account_info(accounts_iter)?;
    let pool_pda = next_account_info(accounts_iter)?;
    let share_pda = next_account_info(accounts_iter)?;
    let user_token = next_account_info(accounts_iter)?;
    let vault = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let market = next_account_info(accounts_iter)?;
    let market_vault = next_account_info(accounts_iter)?;
    let market_vault_auth = next_account_info(accounts_iter)?;
    let market_program = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;

    if !user.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let pool = read_pool(program_id, pool_pda, market.key)?;
    validate_fund_accounts(
        program_id, &pool, pool_pda, vault, vault_auth, market, market_program, token_program,
    )?;
    validate_user_token(&pool, user_token, user.key)?;
    ensure_share_account(program_id, user, pool_pda, user.key, share_pda, system_program)?;

    let decimals = pool.collateral_decimals;
    let amount_wad = token_to_wad(amount, decimals)?;
    let bump = [pool.vault_authority_bump];
    let vault_auth_seeds: &[&[u8]] = &[b"vault_auth", pool_pda.key.as_ref(), &bump];

    let mut market_view = MarketAccount::with_cpi(
        MarketCpiAccounts {
            market_program,
            vault_authority: vault_auth,
            market,
            pool_vault: vault,
            market_vault,
            market_vault_authority: market_vault_auth,
            token_program,
        },
        vault_auth_seeds,
        decimals,
    );
    let mut token_vault = TokenVault {
        vault,
        vault_authority: vault_auth,
        token_program,
        counterparty: Some((user, user_token)),
        signer_seeds: vault_auth_seeds,
        decimals,
    };
    let mut shares = ShareAccounts::new(*pool_pda.key, vec![share_pda]);

    let mut pool_data = pool_pda.try_borrow_mut_data()?;
    let pool_state: &mut PoolState = bytemuck::from_bytes_mut(&mut pool_data[..POOL_STATE_SIZE]);
    let mut engine = InsurancePool::load(pool_state)?;

    let minted = engine.deposit(&mut market_view, &mut token_vault, &mut shares, user.key, amount_wad)?;

    msg!("Deposited {} collateral, minted {} shares", amount, minted);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 2: Withdraw
// ═══════════════════════════════════════════════════════════════

fn process_withdraw(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    shares_to_burn: u128,
) -> ProgramResult {
    if shares_to_burn == 0 {
        return Err(PoolError::InvalidAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let user = next_account_info(accounts_iter)?;
    let pool_pda = next_account_info(accounts_iter)?;
    let share_pda = next_account_info(accounts_iter)?;
    let user_token = next_account_info(accounts_iter)?;
    let vault = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let market = next_account_info(accounts_iter)?;
    let market_vault = next_account_info(accounts_iter)?;
    let market_vault_auth = next_account_info(accounts_iter)?;
    let market_program = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    if !user.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let pool = read_pool(program_id, pool_pda, market.key)?;
    validate_fund_accounts(
        program_id, &pool, pool_pda, vault, vault_auth, market, market_program, token_program,
    )?;
    validate_user_token(&pool, user_token, user.key)?;
    verify_share_pda(program_id, pool_pda.key, user.key, share_pda)?;

    let decimals = pool.collateral_decimals;
    let bump = [pool.vault_authority_bump];
    let vault_auth_seeds: &[&[u8]] = &[b"vault_auth", pool_pda.key.as_ref(), &bump];

    let mut market_view = MarketAccount::with_cpi(
        MarketCpiAccounts {
            market_program,
            vault_authority: vault_auth,
            market,
            pool_vault: vault,
            market_vault,
            market_vault_authority: market_vault_auth,
            token_program,
        },
        vault_auth_seeds,
        decimals,
    );
    let mut token_vault = TokenVault {
        vault,
        vault_authority: vault_auth,
        token_program,
        counterparty: Some((user, user_token)),
        signer_seeds: vault_auth_seeds,
        decimals,
    };
    let mut shares = ShareAccounts::new(*pool_pda.key, vec![share_pda]);

    let mut pool_data = pool_pda.try_borrow_mut_data()?;
    let pool_state: &mut PoolState = bytemuck::from_bytes_mut(&mut pool_data[..POOL_STATE_SIZE]);
    let mut engine = InsurancePool::load(pool_state)?;

    let withdrawal = engine.withdraw(
        &mut market_view,
        &mut token_vault,
        &mut shares,
        user.key,
        shares_to_burn,
    )?;

    msg!(
        "Withdrew {} collateral (fee {}), burned {} shares",
        withdrawal.payout,
        withdrawal.fee,
        withdrawal.shares_burned
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 3: UpdatePoolAmount
// ═══════════════════════════════════════════════════════════════

fn process_update_pool_amount(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let pool_pda = next_account_info(accounts_iter)?;
    let vault = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let market = next_account_info(accounts_iter)?;
    let market_vault = next_account_info(accounts_iter)?;
    let market_vault_auth = next_account_info(accounts_iter)?;
    let market_program = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    let pool = read_pool(program_id, pool_pda, market.key)?;
    validate_fund_accounts(
        program_id, &pool, pool_pda, vault, vault_auth, market, market_program, token_program,
    )?;

    let decimals = pool.collateral_decimals;
    let bump = [pool.vault_authority_bump];
    let vault_auth_seeds: &[&[u8]] = &[b"vault_auth", pool_pda.key.as_ref(), &bump];

    let mut market_view = MarketAccount::with_cpi(
        MarketCpiAccounts {
            market_program,
            vault_authority: vault_auth,
            market,
            pool_vault: vault,
            market_vault,
            market_vault_authority: market_vault_auth,
            token_program,
        },
        vault_auth_seeds,
        decimals,
    );
    let token_vault = TokenVault {
        vault,
        vault_authority: vault_auth,
        token_program,
        counterparty: None,
        signer_seeds: vault_auth_seeds,
        decimals,
    };

    let mut pool_data = pool_pda.try_borrow_mut_data()?;
    let pool_state: &mut PoolState = bytemuck::from_bytes_mut(&mut pool_data[..POOL_STATE_SIZE]);
    let mut engine = InsurancePool::load(pool_state)?;

    let pulled = engine.update_pool_amount(&mut market_view, &token_vault)?;
    if pulled > 0 {
        msg!(
            "Pulled {} settled collateral (buffer {}, public {})",
            pulled,
            engine.buffer_collateral_amount(),
            engine.public_collateral_amount()
        );
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 4: DrainPool
// ═══════════════════════════════════════════════════════════════

fn process_drain_pool(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u128,
) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let authority = next_account_info(accounts_iter)?;
    let pool_pda = next_account_info(accounts_iter)?;
    let vault = next_account_info(accounts_iter)?;
    let vault_auth = next_account_info(accounts_iter)?;
    let market = next_account_info(accounts_iter)?;
    let market_vault = next_account_info(accounts_iter)?;
    let market_vault_auth = next_account_info(accounts_iter)?;
    let market_program = next_account_info(accounts_iter)?;
    let token_program = next_account_info(accounts_iter)?;

    if !authority.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let pool = read_pool(program_id, pool_pda, market.key)?;
    validate_fund_accounts(
        program_id, &pool, pool_pda, vault, vault_auth, market, market_program, token_program,
    )?;

    let decimals = pool.collateral_decimals;
    let bump = [pool.vault_authority_bump];
    let vault_auth_seeds: &[&[u8]] = &[b"vault_auth", pool_pda.key.as_ref(), &bump];

    let mut market_view = MarketAccount::with_cpi(
        MarketCpiAccounts {
            market_program,
            vault_authority: vault_auth,
            market,
            pool_vault: vault,
            market_vault,
            market_vault_authority: market_vault_auth,
            token_program,
        },
        vault_auth_seeds,
        decimals,
    );
    let token_vault = TokenVault {
        vault,
        vault_authority: vault_auth,
        token_program,
        counterparty: None,
        signer_seeds: vault_auth_seeds,
        decimals,
    };

    let mut pool_data = pool_pda.try_borrow_mut_data()?;
    let pool_state: &mut PoolState = bytemuck::from_bytes_mut(&mut pool_data[..POOL_STATE_SIZE]);
    let mut engine = InsurancePool::load(pool_state)?;

    let drained = engine.drain_pool(&mut market_view, &token_vault, authority.key, amount)?;
    if drained < amount {
        msg!("Drain capped: requested {}, available {}", amount, drained);
    }

    set_return_data(&drained.to_le_bytes());
    msg!(
        "Drained {} into market {} (buffer {}, public {})",
        drained,
        market.key,
        engine.buffer_collateral_amount(),
        engine.public_collateral_amount()
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 5: TransferShares
// ═══════════════════════════════════════════════════════════════

fn process_transfer_shares(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u128,
) -> ProgramResult {
    if amount == 0 {
        return Err(PoolError::InvalidAmount.into());
    }

    let accounts_iter = &mut accounts.iter();

    let sender = next_account_info(accounts_iter)?;
    let pool_pda = next_account_info(accounts_iter)?;
    let sender_share = next_account_info(accounts_iter)?;
    let recipient = next_account_info(accounts_iter)?;
    let recipient_share = next_account_info(accounts_iter)?;
    let system_program = next_account_info(accounts_iter)?;

    if !sender.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    // The pool PDA is keyed by its own recorded market
    let market_key = {
        let data = pool_pda.try_borrow_data()?;
        if data.len() < POOL_STATE_SIZE {
            return Err(PoolError::NotInitialized.into());
        }
        let pool: PoolState = bytemuck::pod_read_unaligned(&data[..POOL_STATE_SIZE]);
        pool.market_pubkey()
    };
    read_pool(program_id, pool_pda, &market_key)?;

    verify_share_pda(program_id, pool_pda.key, sender.key, sender_share)?;
    ensure_share_account(program_id, sender, pool_pda, recipient.key, recipient_share, system_program)?;

    let mut shares = ShareAccounts::new(*pool_pda.key, vec![sender_share, recipient_share]);
    shares.transfer(sender.key, recipient.key, amount)?;

    msg!("Transferred {} shares from {} to {}", amount, sender.key, recipient.key);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
// 6: QueryPool
// ═══════════════════════════════════════════════════════════════

fn process_query_pool(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let accounts_iter = &mut accounts.iter();

    let pool_pda = next_account_info(accounts_iter)?;
    let market = next_account_info(accounts_iter)?;

    let mut pool = read_pool(program_id, pool_pda, market.key)?;
    let decimals = pool.collateral_decimals;
    let engine = InsurancePool::load(&mut pool)?;
    let market_view = MarketAccount::read_only(market, decimals);

    let target = engine.get_pool_target(&market_view)?;
    let funding_rate = engine.get_pool_funding_rate(&market_view)?;

    let mut data = Vec::with_capacity(80);
    data.extend_from_slice(&target.to_le_bytes());
    data.extend_from_slice(&funding_rate.to_le_bytes());
    data.extend_from_slice(&engine.buffer_collateral_amount().to_le_bytes());
    data.extend_from_slice(&engine.public_collateral_amount().to_le_bytes());
    data.extend_from_slice(&engine.total_shares().to_le_bytes());
    set_return_data(&data);
    Ok(())
}
