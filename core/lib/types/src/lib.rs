//! ZKsync types: essential type definitions for submitting priority operations to a ZKsync network.
//!
//! `zksync_types` is a crate containing the L1->L2 transaction records as seen by the L1 contracts
//! and the fee model used to price them.

#![allow(clippy::upper_case_acronyms, clippy::derive_partial_eq_without_eq)]

pub use zksync_basic_types::*;

pub use crate::l1::{L2CanonicalTransaction, L2TransactionRequestDirect};

pub mod fee_model;
pub mod l1;

/// Denotes the first byte of the `EIP-1559` transaction.
pub const EIP_1559_TX_TYPE: u8 = 0x02;

pub fn ceil_div_u256(a: U256, b: U256) -> U256 {
    (a + b - U256::one()) / b
}
