use jsonrpsee::proc_macros::rpc;
use zksync_types::{web3::types as web3, Address, H256, U256};

use crate::types::L1ToL2EstimateRequest;

/// Subset of the L1 `eth` namespace used by the deployer.
#[rpc(client, namespace = "eth")]
pub(super) trait L1EthNamespace {
    #[method(name = "chainId")]
    async fn chain_id(&self) -> RpcResult<U256>;

    // **Important.** Must be called with `full_transactions = false` only.
    #[method(name = "getBlockByNumber")]
    async fn get_block_by_number(
        &self,
        block_number: web3::BlockNumber,
        full_transactions: bool,
    ) -> RpcResult<Option<web3::Block<H256>>>;

    #[method(name = "getTransactionCount")]
    async fn get_transaction_count(
        &self,
        address: Address,
        block: web3::BlockNumber,
    ) -> RpcResult<U256>;

    #[method(name = "call")]
    async fn call(&self, req: web3::CallRequest, block: web3::BlockId) -> RpcResult<web3::Bytes>;

    #[method(name = "sendRawTransaction")]
    async fn send_raw_transaction(&self, tx_bytes: web3::Bytes) -> RpcResult<H256>;

    #[method(name = "getTransactionReceipt")]
    async fn get_transaction_receipt(
        &self,
        hash: H256,
    ) -> RpcResult<Option<web3::TransactionReceipt>>;
}

/// Subset of the L2 `zks` namespace used by the deployer.
#[rpc(client, namespace = "zks")]
pub(super) trait ZksNamespace {
    #[method(name = "estimateGasL1ToL2")]
    async fn estimate_gas_l1_to_l2(&self, req: L1ToL2EstimateRequest) -> RpcResult<U256>;
}
