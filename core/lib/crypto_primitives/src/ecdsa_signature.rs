use std::fmt;

use secp256k1::{ecdsa::RecoverableSignature, Message, PublicKey, SecretKey, SECP256K1};
use zksync_basic_types::{keccak256, web3::signing::Signature, Address, H256};

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(#[source] secp256k1::Error),
    #[error("invalid message: {0}")]
    InvalidMessage(#[source] secp256k1::Error),
}

/// A secp256k1 private key.
///
/// The wrapped key is never printed; `Debug` only shows the derived address.
#[derive(Clone, PartialEq, Eq)]
pub struct K256PrivateKey(SecretKey);

impl fmt::Debug for K256PrivateKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("K256PrivateKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl K256PrivateKey {
    /// Creates a private key from its raw bytes. Fails for zero or out-of-range scalars.
    pub fn from_bytes(bytes: H256) -> Result<Self, SignatureError> {
        SecretKey::from_slice(bytes.as_bytes())
            .map(Self)
            .map_err(SignatureError::InvalidSecretKey)
    }

    /// Raw bytes of the key. Handle with care.
    pub fn expose_secret(&self) -> H256 {
        H256(self.0.secret_bytes())
    }

    /// Ethereum address corresponding to this key.
    pub fn address(&self) -> Address {
        let public_key = PublicKey::from_secret_key(SECP256K1, &self.0);
        let serialized = public_key.serialize_uncompressed();
        // Skip the `0x04` tag of the uncompressed SEC1 encoding.
        Address::from_slice(&keccak256(&serialized[1..])[12..])
    }

    fn sign_recoverable(&self, message: &H256) -> Result<RecoverableSignature, SignatureError> {
        let message =
            Message::from_slice(message.as_bytes()).map_err(SignatureError::InvalidMessage)?;
        Ok(SECP256K1.sign_ecdsa_recoverable(&message, &self.0))
    }

    /// Signs a prehashed message and returns a signature with `v` equal to the recovery id (0 or 1).
    /// This is the form used by typed (EIP-2718) transactions.
    pub fn sign_web3_message(&self, message: &H256) -> Result<Signature, SignatureError> {
        let (recovery_id, compact) = self.sign_recoverable(message)?.serialize_compact();
        Ok(Signature {
            v: recovery_id.to_i32() as u64,
            r: H256::from_slice(&compact[..32]),
            s: H256::from_slice(&compact[32..]),
        })
    }

    /// Signs a prehashed message for a legacy transaction; `v` is adjusted per EIP-155
    /// if `chain_id` is provided.
    pub fn sign_web3(
        &self,
        message: &H256,
        chain_id: Option<u64>,
    ) -> Result<Signature, SignatureError> {
        let mut signature = self.sign_web3_message(message)?;
        signature.v = match chain_id {
            Some(chain_id) => signature.v + 35 + chain_id * 2,
            None => signature.v + 27,
        };
        Ok(signature)
    }
}
