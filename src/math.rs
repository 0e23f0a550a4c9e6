//! Pure pool math. No Solana types, no state.
//!
//! All amounts are WAD-scaled u128. Every function truncates toward zero,
//! so allocations can only come out short, never over.

use crate::error::PoolError;
use crate::wad::{div_wad, mul_div, mul_wad, WAD};

/// Pool target as a fraction of leveraged notional (1%).
pub const POOL_TARGET_RATIO: u128 = WAD / 100;

/// 8-hour funding contribution scale (0.0036523).
pub const FUNDING_RATE_SCALE: u128 = 3_652_300_000_000_000;

/// Public collateral kept back by a drain whenever it starts at or above this.
pub const PUBLIC_COLLATERAL_FLOOR: u128 = WAD;

/// Shares to mint for a stake so the shares-per-collateral ratio is kept.
///
/// Returns 0 if any input is 0.
/// Otherwise `divWad(mulWad(supply, stake), held)`, rounded down.
pub fn calc_mint_amount(
    share_supply: u128,
    collateral_held: u128,
    amount_to_stake: u128,
) -> Result<u128, PoolError> {
    if share_supply == 0 || amount_to_stake == 0 || collateral_held == 0 {
        return Ok(0);
    }
    div_wad(mul_wad(share_supply, amount_to_stake)?, collateral_held)
}

/// Collateral released by burning shares.
///
/// Returns 0 if any input is 0.
/// Otherwise `divWad(mulWad(burn, held), supply)`, rounded down.
pub fn calc_withdraw_amount(
    share_supply: u128,
    collateral_held: u128,
    shares_to_burn: u128,
) -> Result<u128, PoolError> {
    if share_supply == 0 || shares_to_burn == 0 || collateral_held == 0 {
        return Ok(0);
    }
    div_wad(mul_wad(shares_to_burn, collateral_held)?, share_supply)
}

/// Desired pool size: 1% of leveraged notional.
pub fn get_pool_target(leveraged_notional_value: u128) -> Result<u128, PoolError> {
    mul_wad(leveraged_notional_value, POOL_TARGET_RATIO)
}

/// Funding contribution from the pool's shortfall against its target.
///
/// Zero when notional is not positive or the pool is at or above target.
pub fn get_pool_funding_rate(
    target: u128,
    current_collateral: u128,
    leveraged_notional_value: i128,
) -> Result<u128, PoolError> {
    if leveraged_notional_value <= 0 {
        return Ok(0);
    }
    let shortfall = target.saturating_sub(current_collateral);
    if shortfall == 0 {
        return Ok(0);
    }
    let fraction = div_wad(shortfall, leveraged_notional_value as u128)?;
    mul_wad(FUNDING_RATE_SCALE, fraction)
}

/// Fee on an immediate withdrawal of `collateral_amount`.
///
/// `r = min(1, (underlying + pending) / (2 * target))`,
/// `fee = collateral * (1 - r)^2`. Zero when `target == 0`.
pub fn calculate_immediate_withdrawal_fee(
    target: u128,
    pool_token_underlying: u128,
    pending_withdrawals: u128,
    collateral_amount: u128,
) -> Result<u128, PoolError> {
    if target == 0 {
        return Ok(0);
    }
    let backing = pool_token_underlying
        .checked_add(pending_withdrawals)
        .ok_or(PoolError::Overflow)?;
    let coverage = div_wad(backing, mul_wad(2 * WAD, target)?)?.min(WAD);
    let shortfall = WAD - coverage;
    mul_wad(collateral_amount, mul_wad(shortfall, shortfall)?)
}

/// Split a settlement inflow between buffer and public in their current
/// proportion. Public is rounded down; buffer takes the remainder.
/// With both empty, everything goes to buffer.
///
/// Returns `(to_buffer, to_public)`.
pub fn split_settlement(
    buffer: u128,
    public: u128,
    amount: u128,
) -> Result<(u128, u128), PoolError> {
    let total = buffer.checked_add(public).ok_or(PoolError::Overflow)?;
    if total == 0 {
        return Ok((amount, 0));
    }
    let to_public = mul_div(amount, public, total)?;
    Ok((amount - to_public, to_public))
}

/// How much of a drain request each bucket covers.
///
/// Buffer is exhausted first. Public then covers the remainder but always
/// keeps `PUBLIC_COLLATERAL_FLOOR` back; a public bucket already under the
/// floor is not touched.
///
/// Returns `(from_buffer, from_public)`.
pub fn split_drain(buffer: u128, public: u128, requested: u128) -> (u128, u128) {
    let from_buffer = requested.min(buffer);
    let remaining = requested - from_buffer;
    let drainable_public = public.saturating_sub(PUBLIC_COLLATERAL_FLOOR);
    (from_buffer, remaining.min(drainable_public))
}

/// Pricing curve for immediate withdrawals.
pub trait WithdrawalFeeCurve {
    fn withdrawal_fee(
        &self,
        target: u128,
        pool_token_underlying: u128,
        pending_withdrawals: u128,
        collateral_amount: u128,
    ) -> Result<u128, PoolError>;
}

/// Fee curve selected at pool creation. Stored as its `u8` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FeeCurve {
    /// No fee
    None = 0,
    /// `calculate_immediate_withdrawal_fee`
    SquaredShortfall = 1,
}

impl TryFrom<u8> for FeeCurve {
    type Error = PoolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(FeeCurve::None),
            1 => Ok(FeeCurve::SquaredShortfall),
            _ => Err(PoolError::InvalidFeeCurve),
        }
    }
}

impl WithdrawalFeeCurve for FeeCurve {
    fn withdrawal_fee(
        &self,
        target: u128,
        pool_token_underlying: u128,
        pending_withdrawals: u128,
        collateral_amount: u128,
    ) -> Result<u128, PoolError> {
        match self {
            FeeCurve::None => Ok(0),
            FeeCurve::SquaredShortfall => calculate_immediate_withdrawal_fee(
                target,
                pool_token_underlying,
                pending_withdrawals,
                collateral_amount,
            ),
        }
    }
}
