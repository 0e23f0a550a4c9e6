//! Property-based tests (proptest) for pool math and the engine.
//!
//! Balances range from one token to a million tokens, WAD-scaled. Not
//! exhaustive like the Kani harnesses, but they reach the full-width
//! arithmetic the proofs have to bound.

mod common;

use common::{wad, Harness};
use perp_insurance_pool::error::PoolError;
use perp_insurance_pool::math::{
    calc_mint_amount, calc_withdraw_amount, calculate_immediate_withdrawal_fee,
    get_pool_funding_rate, get_pool_target, split_drain, split_settlement, FeeCurve,
    PUBLIC_COLLATERAL_FLOOR,
};
use perp_insurance_pool::share_token::ShareToken;
use perp_insurance_pool::wad::{mul_div, wide_mul, WAD};
use proptest::prelude::*;
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

const MAX_BALANCE: u128 = 1_000_000 * WAD;

fn balance() -> impl Strategy<Value = u128> {
    WAD..MAX_BALANCE
}

// ═══════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════

proptest! {
    // ── Mint / Redeem ──

    #[test]
    fn prop_deposit_withdraw_no_inflation(
        supply in balance(),
        held in balance(),
        stake in balance(),
    ) {
        let minted = calc_mint_amount(supply, held, stake).unwrap();
        prop_assume!(minted > 0);
        let back = calc_withdraw_amount(supply + minted, held + stake, minted).unwrap();
        prop_assert!(back <= stake, "got back {} > staked {}", back, stake);
    }

    #[test]
    fn prop_no_dilution(
        supply in balance(),
        held in balance(),
        mine in balance(),
        stake in balance(),
    ) {
        prop_assume!(mine <= supply);
        let before = calc_withdraw_amount(supply, held, mine).unwrap();
        let minted = calc_mint_amount(supply, held, stake).unwrap();
        let after = calc_withdraw_amount(supply + minted, held + stake, mine).unwrap();
        // Two floors in the redeem path, each worth under a wei here
        prop_assert!(after + 2 >= before, "dilution: {} < {}", after, before);
    }

    #[test]
    fn prop_larger_stake_more_shares(
        supply in balance(),
        held in balance(),
        small in 1u128..MAX_BALANCE / 2,
        extra in 1u128..MAX_BALANCE / 2,
    ) {
        let a = calc_mint_amount(supply, held, small).unwrap();
        let b = calc_mint_amount(supply, held, small + extra).unwrap();
        prop_assert!(b >= a);
    }

    #[test]
    fn prop_redeem_bounded_by_held(
        supply in balance(),
        held in balance(),
        burn in balance(),
    ) {
        prop_assume!(burn <= supply);
        prop_assert!(calc_withdraw_amount(supply, held, burn).unwrap() <= held);
    }

    #[test]
    fn prop_zero_inputs_yield_zero(a in balance(), b in balance()) {
        prop_assert_eq!(calc_mint_amount(0, a, b).unwrap(), 0);
        prop_assert_eq!(calc_mint_amount(a, 0, b).unwrap(), 0);
        prop_assert_eq!(calc_withdraw_amount(a, 0, b).unwrap(), 0);
        prop_assert_eq!(calc_withdraw_amount(a, b, 0).unwrap(), 0);
    }

    // ── Wide arithmetic ──

    #[test]
    fn prop_mul_div_matches_narrow(a in any::<u64>(), b in any::<u64>(), d in 1u128..u128::MAX) {
        let exact = (a as u128) * (b as u128) / d;
        prop_assert_eq!(mul_div(a as u128, b as u128, d).unwrap(), exact);
    }

    #[test]
    fn prop_mul_div_cancels(a in any::<u128>(), b in 1u128..u128::MAX) {
        prop_assert_eq!(mul_div(a, b, b).unwrap(), a);
    }

    #[test]
    fn prop_wide_mul_low_word(a in any::<u128>(), b in any::<u128>()) {
        let (_, lo) = wide_mul(a, b);
        prop_assert_eq!(lo, a.wrapping_mul(b));
    }

    // ── Settlement split ──

    #[test]
    fn prop_split_sums_to_amount(
        buffer in 0u128..MAX_BALANCE,
        public in 0u128..MAX_BALANCE,
        amount in 0u128..MAX_BALANCE,
    ) {
        let (to_buffer, to_public) = split_settlement(buffer, public, amount).unwrap();
        prop_assert_eq!(to_buffer + to_public, amount);
    }

    #[test]
    fn prop_split_proportional(
        buffer in balance(),
        public in balance(),
        amount in balance(),
    ) {
        let (_, to_public) = split_settlement(buffer, public, amount).unwrap();
        // to_public * total <= amount * public < (to_public + 1) * total
        let total = buffer + public;
        let exact = wide_mul(amount, public);
        prop_assert!(wide_mul(to_public, total) <= exact);
        prop_assert!(wide_mul(to_public + 1, total) > exact);
    }

    #[test]
    fn prop_split_no_public_all_to_buffer(buffer in 0u128..MAX_BALANCE, amount in balance()) {
        let (to_buffer, to_public) = split_settlement(buffer, 0, amount).unwrap();
        prop_assert_eq!(to_buffer, amount);
        prop_assert_eq!(to_public, 0);
    }

    // ── Drain ──

    #[test]
    fn prop_drain_buffer_first(
        buffer in 0u128..MAX_BALANCE,
        public in 0u128..MAX_BALANCE,
        requested in 0u128..MAX_BALANCE,
    ) {
        let (from_buffer, from_public) = split_drain(buffer, public, requested);
        prop_assert!(from_buffer <= buffer);
        prop_assert!(from_buffer + from_public <= requested);
        if from_public > 0 {
            prop_assert_eq!(from_buffer, buffer);
        }
    }

    #[test]
    fn prop_drain_keeps_floor(
        buffer in 0u128..MAX_BALANCE,
        public in PUBLIC_COLLATERAL_FLOOR..MAX_BALANCE,
        requested in 0u128..MAX_BALANCE,
    ) {
        let (_, from_public) = split_drain(buffer, public, requested);
        prop_assert!(public - from_public >= PUBLIC_COLLATERAL_FLOOR);
    }

    #[test]
    fn prop_drain_skips_sub_floor_public(
        buffer in 0u128..MAX_BALANCE,
        public in 0u128..PUBLIC_COLLATERAL_FLOOR,
        requested in 0u128..MAX_BALANCE,
    ) {
        let (from_buffer, from_public) = split_drain(buffer, public, requested);
        prop_assert_eq!(from_public, 0);
        prop_assert_eq!(from_buffer, requested.min(buffer));
    }

    #[test]
    fn prop_drain_fills_when_available(
        buffer in 0u128..MAX_BALANCE,
        public in PUBLIC_COLLATERAL_FLOOR..MAX_BALANCE,
        requested in 0u128..MAX_BALANCE,
    ) {
        let available = buffer + (public - PUBLIC_COLLATERAL_FLOOR);
        let (from_buffer, from_public) = split_drain(buffer, public, requested);
        prop_assert_eq!(from_buffer + from_public, requested.min(available));
    }

    // ── Fee / Target / Funding ──

    #[test]
    fn prop_fee_never_exceeds_collateral(
        target in balance(),
        underlying in 0u128..MAX_BALANCE,
        collateral in 0u128..MAX_BALANCE,
    ) {
        let fee = calculate_immediate_withdrawal_fee(target, underlying, collateral, collateral)
            .unwrap();
        prop_assert!(fee <= collateral);
    }

    #[test]
    fn prop_fee_zero_when_covered(
        target in balance(),
        extra in 0u128..MAX_BALANCE,
        collateral in 0u128..MAX_BALANCE,
    ) {
        // underlying + pending >= 2 * target
        let underlying = 2 * target + extra;
        let fee = calculate_immediate_withdrawal_fee(target, underlying, collateral, collateral)
            .unwrap();
        prop_assert_eq!(fee, 0);
    }

    #[test]
    fn prop_target_is_one_percent(notional in 0u128..MAX_BALANCE * 1000) {
        let target = get_pool_target(notional).unwrap();
        prop_assert_eq!(target, notional / 100);
    }

    #[test]
    fn prop_funding_zero_at_or_above_target(
        target in 0u128..MAX_BALANCE,
        extra in 0u128..MAX_BALANCE,
        notional in 1i128..(MAX_BALANCE * 1000) as i128,
    ) {
        prop_assert_eq!(get_pool_funding_rate(target, target + extra, notional).unwrap(), 0);
    }

    #[test]
    fn prop_funding_grows_with_shortfall(
        target in balance(),
        current in 0u128..MAX_BALANCE,
        notional in (WAD as i128)..(MAX_BALANCE * 1000) as i128,
    ) {
        prop_assume!(current < target);
        let lower = get_pool_funding_rate(target, current, notional).unwrap();
        let higher = get_pool_funding_rate(target, current / 2, notional).unwrap();
        prop_assert!(higher >= lower);
    }
}

// ═══════════════════════════════════════════════════════════════
// Engine sequences
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, u128),
    Withdraw(usize, u128),
    Settle(u128),
    Drain(u128),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, 1u128..1_000).prop_map(|(who, units)| Op::Deposit(who, wad(units))),
        (0usize..3, 1u128..=100).prop_map(|(who, pct)| Op::Withdraw(who, pct)),
        (1u128..500).prop_map(|units| Op::Settle(wad(units))),
        (1u128..500).prop_map(|units| Op::Drain(wad(units))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_engine_custody_covers_books(
        notional in 0u128..100_000,
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let mut h = Harness::new(FeeCurve::SquaredShortfall);
        h.market.notional = wad(notional) as i128;
        let users = [Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()];
        for user in &users {
            h.fund(user, wad(1_000_000));
        }
        let liq = h.authority();

        for op in ops {
            let before = (h.buffer(), h.public(), h.supply());
            match op {
                Op::Deposit(who, amount) => {
                    // A near-empty public bucket can make the mint ratio unusable
                    if let Err(e) = h.deposit(&users[who], amount) {
                        prop_assert!(
                            e == ProgramError::from(PoolError::InvalidAmount)
                                || e == ProgramError::from(PoolError::Overflow)
                        );
                        prop_assert_eq!((h.buffer(), h.public(), h.supply()), before);
                    }
                }
                Op::Withdraw(who, pct) => {
                    let burn = h.shares.balance_of(&users[who]).unwrap() * pct / 100;
                    if burn > 0 {
                        if let Err(e) = h.withdraw(&users[who], burn) {
                            prop_assert_eq!(e, ProgramError::from(PoolError::Overflow));
                            prop_assert_eq!((h.buffer(), h.public(), h.supply()), before);
                        }
                    }
                }
                Op::Settle(amount) => {
                    h.settle(amount as i128);
                    h.update().unwrap();
                    prop_assert_eq!(h.buffer() + h.public(), before.0 + before.1 + amount);
                }
                Op::Drain(amount) => {
                    let drained = h.drain(&liq, amount).unwrap();
                    prop_assert!(drained <= amount);
                    if before.1 >= PUBLIC_COLLATERAL_FLOOR {
                        prop_assert!(h.public() >= PUBLIC_COLLATERAL_FLOOR);
                    } else {
                        prop_assert_eq!(h.public(), before.1);
                    }
                    prop_assert_eq!(drained % 1_000_000_000_000, 0);
                }
            }

            prop_assert!(h.vault_balance() >= h.buffer() + h.public());
            prop_assert_eq!(h.shares.total_supply(), h.supply());
        }
    }
}
