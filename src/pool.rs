//! Insurance pool accounting engine.
//!
//! Owns the buffer/public split and the share supply in [`PoolState`] and
//! drives the market, vault and share ledger through their traits.
//!
//! Every mutating operation:
//! - validates inputs before touching state,
//! - updates pool state before calling out to any collaborator,
//! - checks `vault balance >= buffer + public` before returning,
//! - restores the pool state on any error.

use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::error::PoolError;
use crate::market::Market;
use crate::math::{
    calc_mint_amount, calc_withdraw_amount, get_pool_funding_rate, get_pool_target,
    split_drain, split_settlement, FeeCurve, WithdrawalFeeCurve,
};
use crate::share_token::ShareToken;
use crate::state::{PoolState, U128};
use crate::vault::CollateralVault;
use crate::wad::{floor_to_unit, MAX_COLLATERAL_DECIMALS};

/// Fixed at pool creation.
#[derive(Debug, Clone, Copy)]
pub struct PoolParams {
    pub market: Pubkey,
    pub market_program: Pubkey,
    pub collateral_mint: Pubkey,
    pub vault: Pubkey,
    pub collateral_decimals: u8,
    pub fee_curve: FeeCurve,
    pub bump: u8,
    pub vault_authority_bump: u8,
}

/// Outcome of a withdrawal. `payout = collateral - fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawal {
    pub shares_burned: u128,
    pub collateral: u128,
    pub fee: u128,
    pub payout: u128,
}

pub struct InsurancePool<'a> {
    state: &'a mut PoolState,
    fee_curve: FeeCurve,
}

impl<'a> InsurancePool<'a> {
    /// Initialize a fresh pool for `market`.
    ///
    /// Fails with `AlreadyExists` if `state` is already initialized and with
    /// `AssetMismatch` if the collateral mint is not the market's quote mint.
    pub fn create<M: Market>(
        state: &'a mut PoolState,
        market: &M,
        params: PoolParams,
    ) -> Result<Self, ProgramError> {
        if state.is_initialized == 1 {
            return Err(PoolError::AlreadyExists.into());
        }
        if market.quote_mint()? != params.collateral_mint {
            return Err(PoolError::AssetMismatch.into());
        }
        if params.collateral_decimals > MAX_COLLATERAL_DECIMALS {
            return Err(PoolError::InvalidMint.into());
        }

        *state = bytemuck::Zeroable::zeroed();
        state.is_initialized = 1;
        state.bump = params.bump;
        state.vault_authority_bump = params.vault_authority_bump;
        state.collateral_decimals = params.collateral_decimals;
        state.fee_curve = params.fee_curve as u8;
        state.market = params.market.to_bytes();
        state.market_program = params.market_program.to_bytes();
        state.collateral_mint = params.collateral_mint.to_bytes();
        state.vault = params.vault.to_bytes();

        Ok(Self { state, fee_curve: params.fee_curve })
    }

    /// Open an existing pool.
    pub fn load(state: &'a mut PoolState) -> Result<Self, PoolError> {
        if state.is_initialized != 1 {
            return Err(PoolError::NotInitialized);
        }
        let fee_curve = FeeCurve::try_from(state.fee_curve)?;
        Ok(Self { state, fee_curve })
    }

    pub fn state(&self) -> &PoolState {
        self.state
    }

    // ── Accessors ──

    pub fn buffer_collateral_amount(&self) -> u128 {
        self.state.buffer_collateral.get()
    }

    pub fn public_collateral_amount(&self) -> u128 {
        self.state.public_collateral.get()
    }

    pub fn total_shares(&self) -> u128 {
        self.state.total_shares.get()
    }

    /// Buffer plus public collateral.
    pub fn get_pool_holdings(&self) -> Result<u128, PoolError> {
        self.buffer_collateral_amount()
            .checked_add(self.public_collateral_amount())
            .ok_or(PoolError::Overflow)
    }

    pub fn get_pool_user_balance<S: ShareToken>(
        &self,
        shares: &S,
        user: &Pubkey,
    ) -> Result<u128, ProgramError> {
        shares.balance_of(user)
    }

    /// 1% of the market's current leveraged notional. Negative notional
    /// counts as zero.
    pub fn get_pool_target<M: Market>(&self, market: &M) -> Result<u128, ProgramError> {
        let notional = market.leveraged_notional_value()?;
        Ok(get_pool_target(notional.max(0) as u128)?)
    }

    /// Funding contribution from the shortfall of holdings against target.
    pub fn get_pool_funding_rate<M: Market>(&self, market: &M) -> Result<u128, ProgramError> {
        let notional = market.leveraged_notional_value()?;
        let target = get_pool_target(notional.max(0) as u128)?;
        Ok(get_pool_funding_rate(target, self.get_pool_holdings()?, notional)?)
    }

    // ── Mutations ──

    /// Deposit `amount` of collateral from `depositor`; returns shares minted.
    ///
    /// Pulls settled funds first so the mint ratio is current. With no
    /// shares outstanding the deposit mints 1:1. A deposit that would mint
    /// zero shares against an existing supply is rejected.
    pub fn deposit<M: Market, V: CollateralVault, S: ShareToken>(
        &mut self,
        market: &mut M,
        vault: &mut V,
        shares: &mut S,
        depositor: &Pubkey,
        amount: u128,
    ) -> Result<u128, ProgramError> {
        self.atomic(|pool| {
            if amount == 0 {
                return Err(PoolError::InvalidAmount.into());
            }
            if vault.available_from(depositor)? < amount {
                return Err(PoolError::InsufficientFunds.into());
            }

            pool.pull_settled(market)?;

            let supply = pool.total_shares();
            let minted = if supply == 0 {
                // Public collateral with no claimants belongs to the protocol
                let orphaned = pool.public_collateral_amount();
                if orphaned > 0 {
                    add(&mut pool.state.buffer_collateral, orphaned)?;
                    pool.state.public_collateral.set(0);
                }
                amount
            } else {
                let minted = calc_mint_amount(supply, pool.public_collateral_amount(), amount)?;
                if minted == 0 {
                    return Err(PoolError::InvalidAmount.into());
                }
                minted
            };

            add(&mut pool.state.public_collateral, amount)?;
            add(&mut pool.state.total_shares, minted)?;

            vault.receive(depositor, amount)?;
            shares.mint(depositor, minted)?;

            pool.check_conservation(&*vault)?;
            Ok(minted)
        })
    }

    /// Burn `shares_to_burn` from `holder` and pay out their collateral,
    /// less the immediate-withdrawal fee. The fee applies only while
    /// holdings are below target and stays in the pool as buffer collateral.
    pub fn withdraw<M: Market, V: CollateralVault, S: ShareToken>(
        &mut self,
        market: &mut M,
        vault: &mut V,
        shares: &mut S,
        holder: &Pubkey,
        shares_to_burn: u128,
    ) -> Result<Withdrawal, ProgramError> {
        self.atomic(|pool| {
            if shares_to_burn == 0 {
                return Err(PoolError::InvalidAmount.into());
            }
            if shares.balance_of(holder)? < shares_to_burn {
                return Err(PoolError::InsufficientBalance.into());
            }

            pool.pull_settled(market)?;

            let supply = pool.total_shares();
            let public = pool.public_collateral_amount();
            if shares_to_burn > supply {
                return Err(PoolError::InsufficientBalance.into());
            }
            let collateral = if shares_to_burn == supply {
                public
            } else {
                calc_withdraw_amount(supply, public, shares_to_burn)?
            };

            // Early-exit fee only while the pool is short of its target
            let target = pool.get_pool_target(&*market)?;
            let fee = if pool.get_pool_holdings()? < target {
                pool.fee_curve
                    .withdrawal_fee(target, public - collateral, collateral, collateral)?
                    .min(collateral)
            } else {
                0
            };
            let payout = collateral - fee;

            pool.state.public_collateral.set(public - collateral);
            add(&mut pool.state.buffer_collateral, fee)?;
            pool.state.total_shares.set(supply - shares_to_burn);

            shares.burn(holder, shares_to_burn)?;
            if payout > 0 {
                vault.send(holder, payout)?;
            }

            pool.check_conservation(&*vault)?;
            Ok(Withdrawal {
                shares_burned: shares_to_burn,
                collateral,
                fee,
                payout,
            })
        })
    }

    /// Pull the market's settled pool balance into custody, split between
    /// buffer and public in their current proportion. Returns the amount
    /// pulled; zero when the market owes nothing.
    pub fn update_pool_amount<M: Market, V: CollateralVault>(
        &mut self,
        market: &mut M,
        vault: &V,
    ) -> Result<u128, ProgramError> {
        self.atomic(|pool| {
            let pulled = pool.pull_settled(market)?;
            pool.check_conservation(vault)?;
            Ok(pulled)
        })
    }

    /// Cover a liquidation shortfall. Only the market's current liquidation
    /// authority may call this.
    ///
    /// Buffer is drained first, then public down to the floor. The drained
    /// total is rounded down to whole collateral units, deposited into the
    /// market and returned; it may be less than `requested`.
    pub fn drain_pool<M: Market, V: CollateralVault>(
        &mut self,
        market: &mut M,
        vault: &V,
        caller: &Pubkey,
        requested: u128,
    ) -> Result<u128, ProgramError> {
        self.atomic(|pool| {
            if *caller != market.liquidation_authority()? {
                return Err(PoolError::Unauthorized.into());
            }
            if requested == 0 {
                return Err(PoolError::InvalidAmount.into());
            }

            let buffer = pool.buffer_collateral_amount();
            let public = pool.public_collateral_amount();
            let (from_buffer, from_public) = split_drain(buffer, public, requested);
            // The market only receives whole collateral units
            let drained = floor_to_unit(from_buffer + from_public, pool.state.collateral_decimals)?;
            let (from_buffer, from_public) = split_drain(buffer, public, drained);

            pool.state.buffer_collateral.set(buffer - from_buffer);
            pool.state.public_collateral.set(public - from_public);

            if drained > 0 {
                market.deposit(drained)?;
            }

            pool.check_conservation(vault)?;
            Ok(drained)
        })
    }

    fn pull_settled<M: Market>(&mut self, market: &mut M) -> Result<u128, ProgramError> {
        let settled = market.settled_pool_balance()?;
        if settled <= 0 {
            return Ok(0);
        }
        let amount = settled as u128;
        let (to_buffer, to_public) = split_settlement(
            self.buffer_collateral_amount(),
            self.public_collateral_amount(),
            amount,
        )?;
        add(&mut self.state.buffer_collateral, to_buffer)?;
        add(&mut self.state.public_collateral, to_public)?;

        market.withdraw(amount)?;
        Ok(amount)
    }

    fn check_conservation<V: CollateralVault>(&self, vault: &V) -> Result<(), ProgramError> {
        if vault.balance()? < self.get_pool_holdings()? {
            return Err(PoolError::ConservationViolated.into());
        }
        Ok(())
    }

    fn atomic<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, ProgramError>,
    ) -> Result<T, ProgramError> {
        let snapshot = *self.state;
        let result = op(self);
        if result.is_err() {
            *self.state = snapshot;
        }
        result
    }
}

fn add(slot: &mut U128, amount: u128) -> Result<(), PoolError> {
    let v = slot.get().checked_add(amount).ok_or(PoolError::Overflow)?;
    slot.set(v);
    Ok(())
}
