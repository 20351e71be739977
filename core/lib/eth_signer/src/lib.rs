use std::fmt;

use async_trait::async_trait;
use zksync_types::Address;

pub use crate::{
    pk_signer::PrivateKeySigner,
    raw_ethereum_tx::{SignedTransaction, TransactionParameters},
};

mod pk_signer;
mod raw_ethereum_tx;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SignerError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),
    #[error("Unsupported transaction type: {0}")]
    UnsupportedTransactionType(u64),
}

#[async_trait]
pub trait EthereumSigner: 'static + fmt::Debug + Send + Sync {
    async fn sign_transaction(
        &self,
        raw_tx: TransactionParameters,
    ) -> Result<SignedTransaction, SignerError>;

    async fn get_address(&self) -> Result<Address, SignerError>;
}
