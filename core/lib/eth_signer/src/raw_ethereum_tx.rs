//! RLP encoding and signing of L1 transactions.
//!
//! Only legacy (EIP-155) and EIP-1559 transactions are supported; the submitter always sends
//! EIP-1559 transactions.

use rlp::{DecoderError, Rlp, RlpStream};
use zksync_crypto_primitives::K256PrivateKey;
use zksync_types::{
    keccak256,
    web3::{signing::Signature, types::AccessList},
    Address, H256, U256, U64,
};

use crate::SignerError;

pub(crate) const LEGACY_TX_ID: u64 = 0;
pub(crate) const EIP1559_TX_ID: u64 = 2;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct TransactionParameters {
    /// Transaction nonce
    pub nonce: U256,
    /// To address
    pub to: Option<Address>,
    /// Supplied gas
    pub gas: U256,
    /// Gas price for legacy transactions
    pub gas_price: Option<U256>,
    /// Transferred value
    pub value: U256,
    /// Data
    pub data: Vec<u8>,
    /// The chain ID
    pub chain_id: u64,
    /// Transaction type, `Some(2)` for EIP-1559 transaction, `None` for legacy
    pub transaction_type: Option<U64>,
    /// Access list
    pub access_list: Option<AccessList>,
    /// Max fee per gas
    pub max_fee_per_gas: U256,
    /// miner bribe
    pub max_priority_fee_per_gas: U256,
}

impl TransactionParameters {
    /// Decodes a signed EIP-1559 transaction (`0x02 || rlp([...])`) back into parameters.
    /// The signature is checked for presence, but not verified.
    pub fn decode_eip1559(raw: &[u8]) -> Result<Self, DecoderError> {
        let (&tx_type, payload) = raw.split_first().ok_or(DecoderError::RlpIsTooShort)?;
        if u64::from(tx_type) != EIP1559_TX_ID {
            return Err(DecoderError::Custom("not an EIP-1559 transaction"));
        }
        let rlp = Rlp::new(payload);
        if rlp.item_count()? != 12 {
            return Err(DecoderError::RlpIncorrectListLen);
        }

        let to = rlp.at(5)?;
        let to = if to.is_empty() {
            None
        } else {
            Some(to.as_val::<Address>()?)
        };
        let access_list = rlp.at(8)?;
        if access_list.item_count()? != 0 {
            return Err(DecoderError::Custom("access lists are not supported"));
        }

        Ok(Self {
            chain_id: rlp.val_at(0)?,
            nonce: rlp.val_at(1)?,
            max_priority_fee_per_gas: rlp.val_at(2)?,
            max_fee_per_gas: rlp.val_at(3)?,
            gas: rlp.val_at(4)?,
            to,
            value: rlp.val_at(6)?,
            data: rlp.val_at(7)?,
            gas_price: None,
            transaction_type: Some(EIP1559_TX_ID.into()),
            access_list: None,
        })
    }
}

/// Signed transaction ready to be broadcast with `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub message_hash: H256,
    pub v: u64,
    pub r: H256,
    pub s: H256,
    pub raw_transaction: Vec<u8>,
    pub transaction_hash: H256,
}

/// A transaction used for RLP encoding, hashing and signing.
#[derive(Debug)]
pub(crate) struct Transaction {
    to: Option<Address>,
    nonce: U256,
    gas: U256,
    gas_price: U256,
    value: U256,
    data: Vec<u8>,
    transaction_type: u64,
    access_list: AccessList,
    max_priority_fee_per_gas: U256,
}

impl TryFrom<TransactionParameters> for Transaction {
    type Error = SignerError;

    fn try_from(raw_tx: TransactionParameters) -> Result<Self, Self::Error> {
        let transaction_type = raw_tx.transaction_type.map_or(LEGACY_TX_ID, |t| t.as_u64());
        let gas_price = match transaction_type {
            LEGACY_TX_ID => raw_tx.gas_price.unwrap_or(raw_tx.max_fee_per_gas),
            EIP1559_TX_ID => raw_tx.max_fee_per_gas,
            other => return Err(SignerError::UnsupportedTransactionType(other)),
        };
        Ok(Self {
            to: raw_tx.to,
            nonce: raw_tx.nonce,
            gas: raw_tx.gas,
            gas_price,
            value: raw_tx.value,
            data: raw_tx.data,
            transaction_type,
            access_list: raw_tx.access_list.unwrap_or_default(),
            max_priority_fee_per_gas: raw_tx.max_priority_fee_per_gas,
        })
    }
}

impl Transaction {
    fn rlp_append_to(&self, stream: &mut RlpStream) {
        if let Some(to) = self.to {
            stream.append(&to);
        } else {
            stream.append(&"");
        }
    }

    fn encode_legacy(&self, chain_id: u64, signature: Option<&Signature>) -> RlpStream {
        let mut stream = RlpStream::new();
        stream.begin_list(9);

        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas);
        self.rlp_append_to(&mut stream);
        stream.append(&self.value);
        stream.append(&self.data);

        if let Some(signature) = signature {
            self.rlp_append_signature(&mut stream, signature);
        } else {
            stream.append(&chain_id);
            stream.append(&0u8);
            stream.append(&0u8);
        }

        stream
    }

    fn encode_eip1559_payload(&self, chain_id: u64, signature: Option<&Signature>) -> RlpStream {
        let mut stream = RlpStream::new();

        let list_size = if signature.is_some() { 12 } else { 9 };
        stream.begin_list(list_size);

        // append `chain_id`. from EIP-2930: `chainId` is defined to be an integer of arbitrary size.
        stream.append(&chain_id);

        stream.append(&self.nonce);
        stream.append(&self.max_priority_fee_per_gas);
        stream.append(&self.gas_price);
        stream.append(&self.gas);
        self.rlp_append_to(&mut stream);
        stream.append(&self.value);
        stream.append(&self.data);

        self.rlp_append_access_list(&mut stream);

        if let Some(signature) = signature {
            self.rlp_append_signature(&mut stream, signature);
        }

        stream
    }

    fn rlp_append_signature(&self, stream: &mut RlpStream, signature: &Signature) {
        stream.append(&signature.v);
        stream.append(&U256::from_big_endian(signature.r.as_bytes()));
        stream.append(&U256::from_big_endian(signature.s.as_bytes()));
    }

    fn rlp_append_access_list(&self, stream: &mut RlpStream) {
        stream.begin_list(self.access_list.len());
        for access in self.access_list.iter() {
            stream.begin_list(2);
            stream.append(&access.address);
            stream.begin_list(access.storage_keys.len());
            for storage_key in access.storage_keys.iter() {
                stream.append(storage_key);
            }
        }
    }

    fn encode(&self, chain_id: u64, signature: Option<&Signature>) -> Vec<u8> {
        if self.transaction_type == EIP1559_TX_ID {
            let tx_id = EIP1559_TX_ID as u8;
            let stream = self.encode_eip1559_payload(chain_id, signature);
            [&[tx_id], stream.as_raw()].concat()
        } else {
            self.encode_legacy(chain_id, signature).out().to_vec()
        }
    }

    /// Sign and return a raw signed transaction.
    pub fn sign(
        self,
        private_key: &K256PrivateKey,
        chain_id: u64,
    ) -> Result<SignedTransaction, SignerError> {
        let encoded = self.encode(chain_id, None);
        let message_hash = H256(keccak256(&encoded));

        let signature = if self.transaction_type == LEGACY_TX_ID {
            private_key.sign_web3(&message_hash, Some(chain_id))
        } else {
            private_key.sign_web3_message(&message_hash)
        };
        let signature = signature.map_err(|err| SignerError::SigningFailed(err.to_string()))?;

        let signed = self.encode(chain_id, Some(&signature));
        let transaction_hash = H256(keccak256(&signed));

        Ok(SignedTransaction {
            message_hash,
            v: signature.v,
            r: signature.r,
            s: signature.s,
            raw_transaction: signed,
            transaction_hash,
        })
    }
}
