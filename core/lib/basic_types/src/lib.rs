//! The declaration of the most primitive types used in ZKsync network.
//!
//! Most of them are just re-exported from the `web3` crate.

#[macro_use]
mod macros;

pub use web3;
pub use web3::{
    ethabi,
    signing::keccak256,
    types::{
        Address, BlockNumber, Bytes, TransactionReceipt, H160, H256, U256, U64,
    },
};

basic_type!(
    /// ZKsync account nonce.
    Nonce,
    u32
);

basic_type!(
    /// Unique identifier of the priority operation in the ZKsync network.
    PriorityOpId,
    u64
);

basic_type!(
    /// ChainId in the Ethereum network.
    L1ChainId,
    u64
);

basic_type!(
    /// ChainId in the ZKsync network.
    L2ChainId,
    u64
);

impl Default for L2ChainId {
    fn default() -> Self {
        Self(270)
    }
}

impl Default for L1ChainId {
    fn default() -> Self {
        Self(9)
    }
}

/// Converts an address into the 32-byte big-endian word it occupies in ABI encoding.
pub fn address_to_h256(address: &Address) -> H256 {
    let mut buffer = [0u8; 32];
    buffer[12..].copy_from_slice(address.as_bytes());
    H256(buffer)
}

/// Converts an address into `U256`, the representation used by L1 contracts for reserved fields.
pub fn address_to_u256(address: &Address) -> U256 {
    U256::from_big_endian(address.as_bytes())
}

/// Takes the low 20 bytes of the word.
pub fn u256_to_address(value: &U256) -> Address {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    Address::from_slice(&bytes[12..])
}

pub fn h256_to_u256(num: H256) -> U256 {
    U256::from_big_endian(num.as_bytes())
}
