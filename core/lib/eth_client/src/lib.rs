#![allow(clippy::upper_case_acronyms, clippy::derive_partial_eq_without_eq)]

use std::fmt;

use async_trait::async_trait;
use zksync_types::{
    web3::{
        self,
        types::{BlockNumber, TransactionReceipt},
    },
    Address, L1ChainId, H256, U256,
};

pub use crate::types::{
    ClientRpcContext, Eip712Meta, EnrichedClientError, EnrichedClientResult, ExecutedTxStatus,
    L1ToL2EstimateRequest, RawTransactionBytes,
};

pub mod clients;
mod types;

/// Common Web3 interface, as seen by the deployer.
/// Encapsulates the raw Web3 interaction, providing a high-level interface.
///
/// ## Trait contents
///
/// This trait contains methods that perform the "abstract" queries to Web3. That is,
/// there are no assumptions about the contract or account that is used to perform the queries.
/// Signing is not a concern of this trait; transactions are sent already signed.
#[async_trait]
pub trait EthInterface: Sync + Send + fmt::Debug {
    /// Fetches the L1 chain ID from the network. Callers compare it with the configured chain ID
    /// to avoid accidental network mismatch.
    async fn fetch_chain_id(&self) -> EnrichedClientResult<L1ChainId>;

    /// Returns the nonce of the provided account at the specified block.
    async fn nonce_at_for_account(
        &self,
        account: Address,
        block: BlockNumber,
    ) -> EnrichedClientResult<U256>;

    /// Invokes a function on a contract specified by `request.to` without sending a transaction
    /// (`eth_call`). If `block` is not specified, the latest block is used.
    async fn call_contract_function(
        &self,
        request: web3::types::CallRequest,
        block: Option<web3::types::BlockId>,
    ) -> EnrichedClientResult<web3::types::Bytes>;

    /// Returns the `base_fee_per_gas` value for the currently pending L1 block.
    async fn get_pending_block_base_fee_per_gas(&self) -> EnrichedClientResult<U256>;

    /// Sends a transaction to the Ethereum network.
    async fn send_raw_tx(&self, tx: RawTransactionBytes) -> EnrichedClientResult<H256>;

    /// Returns the receipt for the specified transaction hash.
    async fn tx_receipt(&self, tx_hash: H256) -> EnrichedClientResult<Option<TransactionReceipt>>;

    /// Fetches the transaction status for a specified transaction hash.
    ///
    /// Returns `Ok(None)` if the transaction is either not found or not executed yet.
    /// Returns `Err` only if the request fails (e.g. due to network issues).
    async fn get_tx_status(&self, hash: H256) -> EnrichedClientResult<Option<ExecutedTxStatus>> {
        let receipt = self.tx_receipt(hash).await?;
        Ok(receipt.and_then(|receipt| match receipt.status {
            Some(status) if receipt.block_number.is_some() => Some(ExecutedTxStatus {
                tx_hash: receipt.transaction_hash,
                success: status.as_u64() == 1,
                receipt,
            }),
            _ => None,
        }))
    }
}

/// L2 (ZKsync) interface used to estimate gas for L1->L2 transactions.
#[async_trait]
pub trait L2GasEstimator: Sync + Send + fmt::Debug {
    /// Estimates the L2 gas limit required to execute the provided L2 call as a priority transaction.
    async fn estimate_gas_l1_to_l2(
        &self,
        request: L1ToL2EstimateRequest,
    ) -> EnrichedClientResult<U256>;
}
