//! Definition of ZKsync priority operations: operations initiated from the L1.
//!
//! The records here mirror the Solidity structures used by the Bridgehub and Mailbox contracts,
//! so that they can be ABI-encoded exactly as the L1 contracts encode them.

use serde::{Deserialize, Serialize};
use zksync_basic_types::{ethabi::Token, Address, U256};
use zksync_system_constants::PRIORITY_OPERATION_L2_TX_TYPE;

/// Priority transaction as it is stored in the L1 priority queue and executed by the bootloader.
///
/// Only the ABI encoding of this structure is relevant for the submitter: its length determines
/// the minimal gas limit the L1 contracts accept for the transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2CanonicalTransaction {
    pub tx_type: U256,
    pub from: Address,
    pub to: Address,
    pub gas_limit: U256,
    pub gas_per_pubdata_byte_limit: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster: Address,
    /// Serial ID of the priority operation.
    pub nonce: U256,
    pub value: U256,
    /// `[mintValue, refundRecipient, 0, 0]`.
    pub reserved: [U256; 4],
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
    /// Hashes of the factory dependencies.
    pub factory_deps: Vec<U256>,
    pub paymaster_input: Vec<u8>,
    pub reserved_dynamic: Vec<u8>,
}

impl L2CanonicalTransaction {
    /// Creates a priority transaction with the fields the Mailbox fills in for direct requests.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        from: Address,
        to: Address,
        gas_limit: U256,
        gas_per_pubdata_byte_limit: U256,
        l2_gas_price: U256,
        value: U256,
        mint_value: U256,
        refund_recipient: Address,
        data: Vec<u8>,
        factory_deps: Vec<U256>,
    ) -> Self {
        Self {
            tx_type: PRIORITY_OPERATION_L2_TX_TYPE.into(),
            from,
            to,
            gas_limit,
            gas_per_pubdata_byte_limit,
            max_fee_per_gas: l2_gas_price,
            max_priority_fee_per_gas: U256::zero(),
            paymaster: Address::zero(),
            nonce: U256::zero(),
            value,
            reserved: [
                mint_value,
                zksync_basic_types::address_to_u256(&refund_recipient),
                U256::zero(),
                U256::zero(),
            ],
            data,
            signature: vec![],
            factory_deps,
            paymaster_input: vec![],
            reserved_dynamic: vec![],
        }
    }

    pub fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::Uint(self.tx_type),
            Token::Address(self.from),
            Token::Address(self.to),
            Token::Uint(self.gas_limit),
            Token::Uint(self.gas_per_pubdata_byte_limit),
            Token::Uint(self.max_fee_per_gas),
            Token::Uint(self.max_priority_fee_per_gas),
            Token::Address(self.paymaster),
            Token::Uint(self.nonce),
            Token::Uint(self.value),
            Token::FixedArray(self.reserved.iter().copied().map(Token::Uint).collect()),
            Token::Bytes(self.data),
            Token::Bytes(self.signature),
            Token::Array(self.factory_deps.into_iter().map(Token::Uint).collect()),
            Token::Bytes(self.paymaster_input),
            Token::Bytes(self.reserved_dynamic),
        ])
    }

    /// Returns the length of `abi.encode(transaction)` as computed by the L1 contracts.
    pub fn encoding_len(&self) -> usize {
        zksync_basic_types::ethabi::encode(&[self.clone().into_token()]).len()
    }
}

/// Argument of `Bridgehub.requestL2TransactionDirect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2TransactionRequestDirect {
    pub chain_id: U256,
    pub mint_value: U256,
    pub l2_contract: Address,
    pub l2_value: U256,
    pub l2_calldata: Vec<u8>,
    pub l2_gas_limit: U256,
    pub l2_gas_per_pubdata_byte_limit: U256,
    pub factory_deps: Vec<Vec<u8>>,
    pub refund_recipient: Address,
}

impl L2TransactionRequestDirect {
    pub fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::Uint(self.chain_id),
            Token::Uint(self.mint_value),
            Token::Address(self.l2_contract),
            Token::Uint(self.l2_value),
            Token::Bytes(self.l2_calldata),
            Token::Uint(self.l2_gas_limit),
            Token::Uint(self.l2_gas_per_pubdata_byte_limit),
            Token::Array(self.factory_deps.into_iter().map(Token::Bytes).collect()),
            Token::Address(self.refund_recipient),
        ])
    }
}
