use solana_program::program_error::ProgramError;

/// Instructions for the insurance pool program.
///
/// Collateral arguments to `Deposit` are in token base units; share and
/// drain amounts are WAD-scaled.
#[derive(Debug, PartialEq, Eq)]
pub enum PoolInstruction {
    /// Create the insurance pool for a market. At most one per market.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Payer
    ///   1. `[]` Market account (header names this pool)
    ///   2. `[writable]` Pool PDA (insurance_pool, to be created)
    ///   3. `[writable]` Vault token account (to be initialized, authority = vault_auth PDA)
    ///   4. `[]` Vault authority PDA
    ///   5. `[]` Collateral mint (must equal the market's quote mint)
    ///   6. `[]` Token program
    ///   7. `[]` System program
    ///   8. `[]` Rent sysvar
    InitPool { fee_curve: u8 },

    /// Deposit collateral and receive pool shares.
    /// Pulls settled market funds first.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Depositor (pays rent for a new share account)
    ///   1. `[writable]` Pool PDA
    ///   2. `[writable]` Depositor's share PDA (created if needed)
    ///   3. `[writable]` Depositor's collateral token account (source)
    ///   4. `[writable]` Pool vault token account
    ///   5. `[]` Vault authority PDA
    ///   6. `[writable]` Market account
    ///   7. `[writable]` Market vault token account
    ///   8. `[]` Market vault authority
    ///   9. `[]` Market program
    ///  10. `[]` Token program
    ///  11. `[]` System program
    Deposit { amount: u64 },

    /// Burn shares and withdraw the collateral they claim, less the
    /// immediate-withdrawal fee. Pulls settled market funds first.
    ///
    /// Accounts:
    ///   0. `[signer]` Share holder
    ///   1. `[writable]` Pool PDA
    ///   2. `[writable]` Holder's share PDA
    ///   3. `[writable]` Holder's collateral token account (destination)
    ///   4. `[writable]` Pool vault token account
    ///   5. `[]` Vault authority PDA
    ///   6. `[writable]` Market account
    ///   7. `[writable]` Market vault token account
    ///   8. `[]` Market vault authority
    ///   9. `[]` Market program
    ///  10. `[]` Token program
    Withdraw { shares: u128 },

    /// Pull the market's settled pool balance. Permissionless.
    ///
    /// Accounts:
    ///   0. `[writable]` Pool PDA
    ///   1. `[writable]` Pool vault token account
    ///   2. `[]` Vault authority PDA
    ///   3. `[writable]` Market account
    ///   4. `[writable]` Market vault token account
    ///   5. `[]` Market vault authority
    ///   6. `[]` Market program
    ///   7. `[]` Token program
    UpdatePoolAmount,

    /// Drain up to `amount` into the market to cover a liquidation
    /// shortfall. Signer must be the market's liquidation authority.
    /// Return data: drained amount (u128 LE).
    ///
    /// Accounts:
    ///   0. `[signer]` Liquidation authority
    ///   1. `[writable]` Pool PDA
    ///   2. `[writable]` Pool vault token account
    ///   3. `[]` Vault authority PDA
    ///   4. `[writable]` Market account
    ///   5. `[writable]` Market vault token account
    ///   6. `[]` Market vault authority
    ///   7. `[]` Market program
    ///   8. `[]` Token program
    DrainPool { amount: u128 },

    /// Move shares to another holder.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` Sender (pays rent for a new recipient account)
    ///   1. `[]` Pool PDA
    ///   2. `[writable]` Sender's share PDA
    ///   3. `[]` Recipient
    ///   4. `[writable]` Recipient's share PDA (created if needed)
    ///   5. `[]` System program
    TransferShares { amount: u128 },

    /// Report pool figures through return data:
    /// target | funding_rate | buffer | public | total_shares, each u128 LE.
    ///
    /// Accounts:
    ///   0. `[]` Pool PDA
    ///   1. `[]` Market account
    QueryPool,
}

fn read_u64(rest: &[u8]) -> Result<u64, ProgramError> {
    let bytes: [u8; 8] = rest
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .ok_or(ProgramError::InvalidInstructionData)?;
    Ok(u64::from_le_bytes(bytes))
}

fn read_u128(rest: &[u8]) -> Result<u128, ProgramError> {
    let bytes: [u8; 16] = rest
        .get(..16)
        .and_then(|b| b.try_into().ok())
        .ok_or(ProgramError::InvalidInstructionData)?;
    Ok(u128::from_le_bytes(bytes))
}

impl PoolInstruction {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let (&tag, rest) = data.split_first().ok_or(ProgramError::InvalidInstructionData)?;

        match tag {
            0 => {
                let fee_curve = *rest.first().ok_or(ProgramError::InvalidInstructionData)?;
                Ok(Self::InitPool { fee_curve })
            }
            1 => Ok(Self::Deposit { amount: read_u64(rest)? }),
            2 => Ok(Self::Withdraw { shares: read_u128(rest)? }),
            3 => Ok(Self::UpdatePoolAmount),
            4 => Ok(Self::DrainPool { amount: read_u128(rest)? }),
            5 => Ok(Self::TransferShares { amount: read_u128(rest)? }),
            6 => Ok(Self::QueryPool),
            _ => Err(ProgramError::InvalidInstructionData),
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(17);
        match self {
            Self::InitPool { fee_curve } => {
                data.push(0);
                data.push(*fee_curve);
            }
            Self::Deposit { amount } => {
                data.push(1);
                data.extend_from_slice(&amount.to_le_bytes());
            }
            Self::Withdraw { shares } => {
                data.push(2);
                data.extend_from_slice(&shares.to_le_bytes());
            }
            Self::UpdatePoolAmount => data.push(3),
            Self::DrainPool { amount } => {
                data.push(4);
                data.extend_from_slice(&amount.to_le_bytes());
            }
            Self::TransferShares { amount } => {
                data.push(5);
                data.extend_from_slice(&amount.to_le_bytes());
            }
            Self::QueryPool => data.push(6),
        }
        data
    }
}
