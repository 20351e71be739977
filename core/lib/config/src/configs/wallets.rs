use zksync_basic_types::{Address, H256};
use zksync_crypto_primitives::K256PrivateKey;

/// Wallet used to sign the L1 deployment transaction.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// Address of the account. Used to validate private key integrity.
    address: Option<Address>,
    private_key: K256PrivateKey,
}

impl Wallet {
    pub fn from_private_key_bytes(
        private_key_bytes: H256,
        address: Option<Address>,
    ) -> anyhow::Result<Self> {
        let private_key = K256PrivateKey::from_bytes(private_key_bytes)?;
        let calculated_address = private_key.address();
        if let Some(address) = address {
            anyhow::ensure!(
                calculated_address == address,
                "Malformed wallet, address doesn't correspond private_key"
            );
        }

        Ok(Self {
            address,
            private_key,
        })
    }

    pub fn address(&self) -> Address {
        self.address.unwrap_or_else(|| self.private_key.address())
    }

    pub fn private_key(&self) -> &K256PrivateKey {
        &self.private_key
    }

    pub fn for_tests() -> Self {
        Self {
            address: None,
            private_key: K256PrivateKey::from_bytes(H256::repeat_byte(0x1))
                .unwrap_or_else(|err| panic!("invalid test key: {err}")),
        }
    }
}
