use bytemuck::{Pod, Zeroable};
use solana_program::pubkey::Pubkey;

/// u128 stored as `[lo, hi]` u64 limbs so account structs stay 8-byte aligned
/// on every target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct U128([u64; 2]);

impl U128 {
    pub const ZERO: Self = Self([0, 0]);

    #[inline]
    pub const fn new(val: u128) -> Self {
        Self([val as u64, (val >> 64) as u64])
    }

    #[inline]
    pub const fn get(self) -> u128 {
        ((self.0[1] as u128) << 64) | (self.0[0] as u128)
    }

    #[inline]
    pub fn set(&mut self, val: u128) {
        self.0[0] = val as u64;
        self.0[1] = (val >> 64) as u64;
    }
}

/// i128 counterpart of [`U128`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct I128([u64; 2]);

impl I128 {
    pub const ZERO: Self = Self([0, 0]);

    #[inline]
    pub const fn new(val: i128) -> Self {
        Self([val as u64, (val >> 64) as u64])
    }

    #[inline]
    pub const fn get(self) -> i128 {
        // Sign-extend through the high limb
        ((self.0[1] as i64 as i128) << 64) | (self.0[0] as u128 as i128)
    }

    #[inline]
    pub fn set(&mut self, val: i128) {
        self.0[0] = val as u64;
        self.0[1] = (val >> 64) as u64;
    }
}

/// Insurance pool state, one per market.
/// PDA seeds: [b"insurance_pool", market_pubkey]
///
/// Collateral amounts and the share supply are WAD-scaled.
/// `buffer_collateral` is protocol-owned; `public_collateral` backs
/// `total_shares`.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct PoolState {
    /// Whether the pool is initialized (1 = yes, 0 = no)
    pub is_initialized: u8,

    /// Bump seed for the pool PDA
    pub bump: u8,

    /// Bump seed for the vault authority PDA
    pub vault_authority_bump: u8,

    /// Decimals of the collateral mint (<= 18)
    pub collateral_decimals: u8,

    /// Withdrawal fee curve tag (see `math::FeeCurve`)
    pub fee_curve: u8,

    pub _padding: [u8; 3],

    /// The market this pool insures
    pub market: [u8; 32],

    /// Program that owns the market account (CPI target)
    pub market_program: [u8; 32],

    /// Collateral mint, equal to the market's quote mint
    pub collateral_mint: [u8; 32],

    /// Token account holding pool collateral (owned by vault_authority PDA)
    pub vault: [u8; 32],

    /// Protocol-owned reserve
    pub buffer_collateral: U128,

    /// Depositor-owned reserve
    pub public_collateral: U128,

    /// Outstanding pool shares
    pub total_shares: U128,

    /// Reserved for future use
    pub _reserved: [u8; 64],
}

/// Size of PoolState in bytes
pub const POOL_STATE_SIZE: usize = core::mem::size_of::<PoolState>();

/// Per-holder share balance.
/// PDA seeds: [b"pool_share", pool_pda, owner_pubkey]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct ShareAccount {
    /// Whether this record is initialized
    pub is_initialized: u8,

    /// Bump seed for the share PDA
    pub bump: u8,

    pub _padding: [u8; 6],

    /// The pool these shares belong to
    pub pool: [u8; 32],

    /// Share holder
    pub owner: [u8; 32],

    /// Share balance (WAD)
    pub shares: U128,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

/// Size of ShareAccount in bytes
pub const SHARE_ACCOUNT_SIZE: usize = core::mem::size_of::<ShareAccount>();

impl PoolState {
    pub fn market_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.market)
    }

    pub fn market_program_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.market_program)
    }

    pub fn collateral_mint_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.collateral_mint)
    }

    pub fn vault_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.vault)
    }
}

impl ShareAccount {
    pub fn owner_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.owner)
    }
}

/// Derive the insurance pool PDA for a market. At most one pool per market.
pub fn derive_pool_pda(program_id: &Pubkey, market: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"insurance_pool", market.as_ref()], program_id)
}

/// Derive the vault authority PDA for a pool.
/// Owns the collateral vault and signs market CPIs.
pub fn derive_vault_authority(program_id: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"vault_auth", pool.as_ref()], program_id)
}

/// Derive the per-holder share PDA.
pub fn derive_share_pda(program_id: &Pubkey, pool: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"pool_share", pool.as_ref(), owner.as_ref()], program_id)
}
