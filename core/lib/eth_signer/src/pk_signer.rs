use async_trait::async_trait;
use zksync_crypto_primitives::K256PrivateKey;
use zksync_types::{Address, H256};

use crate::{
    raw_ethereum_tx::{SignedTransaction, Transaction, TransactionParameters},
    EthereumSigner, SignerError,
};

#[derive(Debug, Clone)]
pub struct PrivateKeySigner {
    private_key: K256PrivateKey,
}

impl PrivateKeySigner {
    pub fn new(private_key: K256PrivateKey) -> Self {
        Self { private_key }
    }

    /// Creates a signer from raw key bytes.
    pub fn from_bytes(private_key: H256) -> Result<Self, SignerError> {
        let private_key = K256PrivateKey::from_bytes(private_key)
            .map_err(|err| SignerError::SigningFailed(err.to_string()))?;
        Ok(Self::new(private_key))
    }

    pub fn address(&self) -> Address {
        self.private_key.address()
    }
}

#[async_trait]
impl EthereumSigner for PrivateKeySigner {
    /// Signs and returns the RLP-encoded transaction.
    async fn sign_transaction(
        &self,
        raw_tx: TransactionParameters,
    ) -> Result<SignedTransaction, SignerError> {
        let chain_id = raw_tx.chain_id;
        let tx = Transaction::try_from(raw_tx)?;
        tx.sign(&self.private_key, chain_id)
    }

    async fn get_address(&self) -> Result<Address, SignerError> {
        Ok(self.address())
    }
}
