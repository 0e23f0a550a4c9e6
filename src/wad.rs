//! WAD (1e18) fixed-point arithmetic.
//!
//! Products are carried in 256 bits before dividing, so `mul_wad` and
//! `div_wad` only fail when the final quotient does not fit in a u128.
//! Every division truncates toward zero.

use crate::error::PoolError;

/// 1.0 in WAD.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Collateral mints with more decimals than WAD cannot be represented.
pub const MAX_COLLATERAL_DECIMALS: u8 = 18;

const LO_MASK: u128 = u64::MAX as u128;

/// Full 128x128 -> 256 bit product, returned as (hi, lo).
#[inline]
pub fn wide_mul(a: u128, b: u128) -> (u128, u128) {
    let a_hi = a >> 64;
    let a_lo = a & LO_MASK;
    let b_hi = b >> 64;
    let b_lo = b & LO_MASK;

    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;

    // At most 3 * (2^64 - 1), no overflow
    let mid = (lo_lo >> 64) + (lo_hi & LO_MASK) + (hi_lo & LO_MASK);

    let lo = (lo_lo & LO_MASK) | (mid << 64);
    let hi = hi_hi + (lo_hi >> 64) + (hi_lo >> 64) + (mid >> 64);
    (hi, lo)
}

/// floor((hi * 2^128 + lo) / d). `None` when `d == 0` or the quotient
/// needs more than 128 bits.
pub fn div_wide(hi: u128, lo: u128, d: u128) -> Option<u128> {
    if d == 0 || hi >= d {
        return None;
    }
    if hi == 0 {
        return Some(lo / d);
    }

    // Restoring long division. rem < d holds after every step.
    let mut rem = hi;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quot |= 1;
        }
    }
    Some(quot)
}

/// floor(a * b / d) with a 256-bit intermediate.
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, PoolError> {
    if d == 0 {
        return Err(PoolError::DivisionByZero);
    }
    let (hi, lo) = wide_mul(a, b);
    div_wide(hi, lo, d).ok_or(PoolError::Overflow)
}

/// floor(a * b / 1e18)
pub fn mul_wad(a: u128, b: u128) -> Result<u128, PoolError> {
    mul_div(a, b, WAD)
}

/// floor(a * 1e18 / b). Fails with `DivisionByZero` when `b == 0`.
pub fn div_wad(a: u128, b: u128) -> Result<u128, PoolError> {
    if b == 0 {
        return Err(PoolError::DivisionByZero);
    }
    mul_div(a, WAD, b)
}

/// WAD units per one base unit of a token with `decimals` decimals.
pub fn unit_scale(decimals: u8) -> Result<u128, PoolError> {
    if decimals > MAX_COLLATERAL_DECIMALS {
        return Err(PoolError::InvalidMint);
    }
    Ok(10u128.pow((MAX_COLLATERAL_DECIMALS - decimals) as u32))
}

/// Token base units -> WAD.
pub fn token_to_wad(amount: u64, decimals: u8) -> Result<u128, PoolError> {
    (amount as u128)
        .checked_mul(unit_scale(decimals)?)
        .ok_or(PoolError::Overflow)
}

/// WAD -> token base units, truncating any sub-unit remainder.
pub fn wad_to_token(amount: u128, decimals: u8) -> Result<u64, PoolError> {
    let units = amount / unit_scale(decimals)?;
    u64::try_from(units).map_err(|_| PoolError::Overflow)
}

/// Round a WAD amount down to a whole number of token base units.
pub fn floor_to_unit(amount: u128, decimals: u8) -> Result<u128, PoolError> {
    let scale = unit_scale(decimals)?;
    Ok(amount - amount % scale)
}
