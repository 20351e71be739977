use zksync_basic_types::{Address, H160};

/// The following 32 bits are reserved for the system contracts.
pub const SYSTEM_CONTRACTS_OFFSET: u16 = 0x8000;

const fn system_address(offset: u16) -> Address {
    let bytes = offset.to_be_bytes();
    H160([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, bytes[0], bytes[1],
    ])
}

pub const ACCOUNT_CODE_STORAGE_ADDRESS: Address = system_address(SYSTEM_CONTRACTS_OFFSET + 0x02);
pub const NONCE_HOLDER_ADDRESS: Address = system_address(SYSTEM_CONTRACTS_OFFSET + 0x03);
pub const KNOWN_CODES_STORAGE_ADDRESS: Address = system_address(SYSTEM_CONTRACTS_OFFSET + 0x04);
pub const CONTRACT_DEPLOYER_ADDRESS: Address = system_address(SYSTEM_CONTRACTS_OFFSET + 0x06);
pub const L2_BASE_TOKEN_ADDRESS: Address = system_address(SYSTEM_CONTRACTS_OFFSET + 0x0a);

/// Address used by the L1 contracts to denote ETH as the base token of a chain.
pub const ETH_TOKEN_ADDRESS: Address = H160([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
]);
