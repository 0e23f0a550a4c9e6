use solana_program::program_error::ProgramError;
use thiserror::Error;

/// Pool error codes. Surfaced on-chain as `ProgramError::Custom(code)`;
/// codes are append-only.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PoolError {
    /// A pool already exists for this market
    #[error("pool already exists")]
    AlreadyExists = 0,
    /// Pool not initialized
    #[error("pool not initialized")]
    NotInitialized = 1,
    /// Caller is not the market's liquidation authority
    #[error("caller is not the liquidation authority")]
    Unauthorized = 2,
    /// Zero amount where a positive one is required
    #[error("amount must be positive")]
    InvalidAmount = 3,
    /// Share balance below the requested amount
    #[error("share balance < amount")]
    InsufficientBalance = 4,
    /// Depositor cannot cover the collateral transfer
    #[error("insufficient collateral funds")]
    InsufficientFunds = 5,
    /// Collateral mint differs from the market's quote mint
    #[error("collateral does not match market quote asset")]
    AssetMismatch = 6,
    /// Fixed-point division by zero
    #[error("division by zero")]
    DivisionByZero = 7,
    /// Arithmetic overflow
    #[error("arithmetic overflow")]
    Overflow = 8,
    /// Invalid PDA derivation
    #[error("invalid PDA")]
    InvalidPda = 9,
    /// Mint or token account does not belong to this pool
    #[error("invalid mint")]
    InvalidMint = 10,
    /// Market account data is malformed or belongs to another pool
    #[error("invalid market account")]
    InvalidMarket = 11,
    /// Market program does not match the one recorded at creation
    #[error("invalid market program")]
    InvalidMarketProgram = 12,
    /// Custodied collateral fell below buffer + public
    #[error("collateral conservation violated")]
    ConservationViolated = 13,
    /// Unknown withdrawal fee curve
    #[error("invalid fee curve")]
    InvalidFeeCurve = 14,
}

impl From<PoolError> for ProgramError {
    fn from(e: PoolError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
