//! Derivation of L2 contract addresses.
//!
//! Addresses of contracts deployed via `ContractDeployer.create2` depend only on the deployer,
//! the salt, the versioned bytecode hash and the constructor input, so they are known before
//! the deployment transaction is sent.

use zksync_system_constants::L1_TO_L2_ALIAS_OFFSET;
use zksync_types::{
    address_to_h256, address_to_u256, keccak256, u256_to_address, Address, H256, U256,
};
use zksync_utils::bytecode::{hash_bytecode, InvalidBytecodeError};

/// `keccak256("zksyncCreate2")`.
pub const CREATE2_PREFIX: H256 = H256([
    0x20, 0x20, 0xdb, 0xa9, 0x1b, 0x30, 0xcc, 0x00, 0x06, 0x18, 0x8a, 0xf7, 0x94, 0xc2, 0xfb, 0x30,
    0xdd, 0x85, 0x20, 0xdb, 0x7e, 0x2c, 0x08, 0x8b, 0x7f, 0xc7, 0xc1, 0x03, 0xc0, 0x0c, 0xa4, 0x94,
]);

/// Pre-calculates the address of an EraVM contract deployed via CREATE2 with empty constructor input.
pub fn derive(deployer: Address, bytecode_hash: H256, salt: H256) -> Address {
    derive_with_input(deployer, bytecode_hash, salt, &[])
}

/// Pre-calculates the address of an EraVM contract deployed via CREATE2.
pub fn derive_with_input(
    deployer: Address,
    bytecode_hash: H256,
    salt: H256,
    constructor_input: &[u8],
) -> Address {
    let mut bytes = [0_u8; 160];
    bytes[..32].copy_from_slice(CREATE2_PREFIX.as_bytes());
    bytes[32..64].copy_from_slice(address_to_h256(&deployer).as_bytes());
    bytes[64..96].copy_from_slice(salt.as_bytes());
    bytes[96..128].copy_from_slice(bytecode_hash.as_bytes());
    bytes[128..].copy_from_slice(&keccak256(constructor_input));

    Address::from_slice(&keccak256(&bytes)[12..])
}

/// Same as [`derive_with_input()`], but hashes the provided bytecode first.
pub fn derive_for_bytecode(
    deployer: Address,
    bytecode: &[u8],
    salt: H256,
    constructor_input: &[u8],
) -> Result<Address, InvalidBytecodeError> {
    let bytecode_hash = hash_bytecode(bytecode)?;
    Ok(derive_with_input(
        deployer,
        bytecode_hash,
        salt,
        constructor_input,
    ))
}

/// Returns the address an L1 contract acts from on L2.
pub fn apply_l1_to_l2_alias(address: Address) -> Address {
    let aliased = address_to_u256(&address) + address_to_u256(&L1_TO_L2_ALIAS_OFFSET);
    u256_to_address(&aliased)
}

/// Inverse of [`apply_l1_to_l2_alias()`].
pub fn undo_l1_to_l2_alias(address: Address) -> Address {
    let modulus = U256::one() << 160;
    let unaliased = address_to_u256(&address) + modulus - address_to_u256(&L1_TO_L2_ALIAS_OFFSET);
    u256_to_address(&unaliased)
}

/// Computes the L2 address of a deployment, optionally treating the deployer as an L1 contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressDeriver {
    apply_alias: bool,
}

impl AddressDeriver {
    pub fn new(apply_alias: bool) -> Self {
        Self { apply_alias }
    }

    /// Returns the address the L2 `ContractDeployer` will see as `msg.sender` for `deployer`.
    pub fn l2_sender(&self, deployer: Address) -> Address {
        if self.apply_alias {
            apply_l1_to_l2_alias(deployer)
        } else {
            deployer
        }
    }

    pub fn derive(
        &self,
        deployer: Address,
        bytecode_hash: H256,
        salt: H256,
        constructor_input: &[u8],
    ) -> Address {
        derive_with_input(self.l2_sender(deployer), bytecode_hash, salt, constructor_input)
    }
}

#[cfg(test)]
mod tests {
    use test_casing::test_casing;

    use super::*;

    fn sender() -> Address {
        "0x36615Cf349d7F6344891B1e7CA7C72883F5dc049".parse().unwrap()
    }

    fn bytecode_hash() -> H256 {
        "0x010001cb6a6e8d5f6829522f19fa9568660e0a9cd53b2e8be4deb0a679452e41"
            .parse()
            .unwrap()
    }

    fn salt(last_byte: u8) -> H256 {
        H256::from_low_u64_be(last_byte.into())
    }

    fn hash_with_last_byte(byte: u8) -> H256 {
        let mut hash = bytecode_hash();
        hash.0[31] = byte;
        hash
    }

    #[test]
    fn create2_prefix() {
        assert_eq!(CREATE2_PREFIX, H256(keccak256(b"zksyncCreate2")));
    }

    #[test]
    fn create2_address_with_empty_input() {
        let address = derive(sender(), bytecode_hash(), H256::zero());
        let expected: Address = "0x3cfd6d969361fd475d81ba3e3306263ec88e1c61".parse().unwrap();
        assert_eq!(address, expected);
        // The function is pure.
        assert_eq!(derive(sender(), bytecode_hash(), H256::zero()), expected);
        assert_eq!(
            derive_with_input(sender(), bytecode_hash(), H256::zero(), &[]),
            expected
        );
    }

    const INPUT_VARIATIONS: [(&str, &str); 4] = [
        ("salt", "0x73a1d763e16ad377b328cc6593bd0d5e524b6a0f"),
        ("input", "0xe99e44d376e8e4cec713d34673f226dbf16868b6"),
        ("hash", "0xd97ce1a0b13050f6661897c76904f6bc10af97c8"),
        ("sender", "0xdf8408c0dbc59dd9963f5d6f1a81bf19e648d26a"),
    ];

    #[test_casing(4, INPUT_VARIATIONS)]
    #[test]
    fn create2_address_depends_on_every_input(changed: &str, expected: &str) {
        let mut deployer = sender();
        let mut hash = bytecode_hash();
        let mut create2_salt = H256::zero();
        let mut input = vec![];
        match changed {
            "salt" => create2_salt = salt(1),
            "input" => input = vec![0xab, 0xcd],
            "hash" => hash = hash_with_last_byte(0x42),
            "sender" => deployer.0[19] = 0x4a,
            _ => unreachable!(),
        }

        let address = derive_with_input(deployer, hash, create2_salt, &input);
        assert_eq!(address, expected.parse().unwrap());
        assert_ne!(address, derive(sender(), bytecode_hash(), H256::zero()));
    }

    #[test]
    fn deriving_address_for_bytecode() {
        let mut bytecode = vec![0x60, 0x01, 0x60, 0x01, 0x55];
        bytecode.resize(32, 0);
        let address =
            derive_for_bytecode(Address::repeat_byte(0xaa), &bytecode, H256::zero(), &[]).unwrap();
        let expected: Address = "0xf26fb468dd8f2d3cf344513163073af83be17afe".parse().unwrap();
        assert_eq!(address, expected);

        let err = derive_for_bytecode(Address::repeat_byte(0xaa), &bytecode[..31], H256::zero(), &[])
            .unwrap_err();
        assert_eq!(err, InvalidBytecodeError::BytecodeLengthIsNotDivisibleBy32);
    }

    #[test]
    fn l1_to_l2_alias() {
        let aliased = apply_l1_to_l2_alias(sender());
        let expected: Address = "0x47725cf349d7f6344891b1e7ca7c72883f5dd15a".parse().unwrap();
        assert_eq!(aliased, expected);
        assert_eq!(undo_l1_to_l2_alias(aliased), sender());

        // Aliasing wraps around modulo 2^160.
        let max_address = Address::repeat_byte(0xff);
        let expected: Address = "0x1111000000000000000000000000000000001110".parse().unwrap();
        assert_eq!(apply_l1_to_l2_alias(max_address), expected);
        assert_eq!(undo_l1_to_l2_alias(expected), max_address);
    }

    #[test]
    fn deriver_applies_alias_if_configured() {
        let plain = AddressDeriver::default();
        assert_eq!(plain.l2_sender(sender()), sender());
        assert_eq!(
            plain.derive(sender(), bytecode_hash(), H256::zero(), &[]),
            derive(sender(), bytecode_hash(), H256::zero())
        );

        let aliased = AddressDeriver::new(true);
        let expected: Address = "0xd1394fd27c690b3485be6128f179c7a253a9bad5".parse().unwrap();
        assert_eq!(
            aliased.derive(sender(), bytecode_hash(), H256::zero(), &[]),
            expected
        );
    }
}
