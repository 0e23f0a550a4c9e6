//! Per-market insurance pool for perpetual futures markets.
//!
//! Each market gets one pool. The pool holds two buckets of collateral:
//! - buffer: protocol-owned, skimmed from market settlement flows
//! - public: depositor-owned, claimed pro rata by pool shares
//!
//! The market's liquidation authority drains the pool to cover shortfalls
//! during forced closes. The market reads the pool target and funding
//! contribution (QueryPool) to size funding payments.
//!
//! Layers:
//! - `wad` / `math`: WAD fixed point and pure pool math (Kani-checked)
//! - `pool`: the accounting engine, generic over its collaborators
//! - `market` / `vault` / `share_token`: collaborator traits and their
//!   on-chain implementations
//! - `instruction` / `processor` / `cpi`: the program surface
//!
//! Instructions:
//!   0 - InitPool:          Create the pool for a market, initialize its vault
//!   1 - Deposit:           Collateral -> vault, mint shares
//!   2 - Withdraw:          Burn shares -> collateral, less immediate-withdrawal fee
//!   3 - UpdatePoolAmount:  Pull settled market funds, split buffer/public pro rata
//!   4 - DrainPool:         Liquidation authority drains buffer, then public
//!   5 - TransferShares:    Move shares between holders
//!   6 - QueryPool:         Return target, funding rate and balances

pub mod cpi;
pub mod error;
pub mod instruction;
pub mod market;
pub mod math;
pub mod pool;
pub mod processor;
pub mod share_token;
pub mod state;
pub mod vault;
pub mod wad;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;
