use std::fmt;

use async_trait::async_trait;
use jsonrpsee::core::ClientError;
use zksync_types::{web3::types as web3, Address, L1ChainId, H256, U256};

use super::{
    decl::{L1EthNamespaceClient, ZksNamespaceClient},
    Method, LATENCIES,
};
use crate::{
    types::{ClientRpcContext, EnrichedClientError, EnrichedClientResult, L1ToL2EstimateRequest},
    EthInterface, L2GasEstimator, RawTransactionBytes,
};

#[async_trait]
impl<T> EthInterface for T
where
    T: L1EthNamespaceClient + fmt::Debug + Send + Sync,
{
    async fn fetch_chain_id(&self) -> EnrichedClientResult<L1ChainId> {
        let latency = LATENCIES.direct[&Method::ChainId].start();
        let raw_chain_id = self.chain_id().rpc_context("chain_id").await?;
        latency.observe();
        let chain_id = u64::try_from(raw_chain_id).map_err(|err| {
            let err = ClientError::Custom(format!("invalid chainId: {err}"));
            EnrichedClientError::new(err, "chain_id").with_arg("chain_id", &raw_chain_id)
        })?;
        Ok(L1ChainId(chain_id))
    }

    async fn nonce_at_for_account(
        &self,
        account: Address,
        block: web3::BlockNumber,
    ) -> EnrichedClientResult<U256> {
        let latency = LATENCIES.direct[&Method::NonceAtForAccount].start();
        let nonce = self
            .get_transaction_count(account, block)
            .rpc_context("get_transaction_count")
            .with_arg("account", &account)
            .with_arg("block", &block)
            .await?;
        latency.observe();
        Ok(nonce)
    }

    async fn get_pending_block_base_fee_per_gas(&self) -> EnrichedClientResult<U256> {
        let latency = LATENCIES.direct[&Method::PendingBlockBaseFee].start();

        let block = self
            .get_block_by_number(web3::BlockNumber::Pending, false)
            .rpc_context("get_block_by_number")
            .with_arg("number", &web3::BlockNumber::Pending)
            .with_arg("with_transactions", &false)
            .await?;
        let block = if let Some(block) = block {
            block
        } else {
            // Some local nodes produce blocks on demand, so there may be no pending block.
            self.get_block_by_number(web3::BlockNumber::Latest, false)
                .rpc_context("get_block_by_number")
                .with_arg("number", &web3::BlockNumber::Latest)
                .with_arg("with_transactions", &false)
                .await?
                .ok_or_else(|| {
                    EnrichedClientError::custom("no latest block", "get_block_by_number")
                })?
        };
        latency.observe();

        block.base_fee_per_gas.ok_or_else(|| {
            EnrichedClientError::custom("block has no base fee (pre-London chain?)", "base_fee")
                .with_arg("block", &block.number)
        })
    }

    async fn call_contract_function(
        &self,
        request: web3::CallRequest,
        block: Option<web3::BlockId>,
    ) -> EnrichedClientResult<web3::Bytes> {
        let latency = LATENCIES.direct[&Method::CallContractFunction].start();
        let block = block.unwrap_or_else(|| web3::BlockNumber::Latest.into());
        let output_bytes = self
            .call(request.clone(), block)
            .rpc_context("call")
            .with_arg("request", &request)
            .with_arg("block", &block)
            .await?;
        latency.observe();
        Ok(output_bytes)
    }

    async fn send_raw_tx(&self, tx: RawTransactionBytes) -> EnrichedClientResult<H256> {
        let latency = LATENCIES.direct[&Method::SendRawTx].start();
        let tx = self
            .send_raw_transaction(web3::Bytes(tx.0))
            .rpc_context("send_raw_transaction")
            .await?;
        latency.observe();
        Ok(tx)
    }

    async fn tx_receipt(
        &self,
        tx_hash: H256,
    ) -> EnrichedClientResult<Option<web3::TransactionReceipt>> {
        let latency = LATENCIES.direct[&Method::TxReceipt].start();
        let receipt = self
            .get_transaction_receipt(tx_hash)
            .rpc_context("get_transaction_receipt")
            .with_arg("hash", &tx_hash)
            .await?;
        latency.observe();
        Ok(receipt)
    }
}

#[async_trait]
impl<T> L2GasEstimator for T
where
    T: ZksNamespaceClient + fmt::Debug + Send + Sync,
{
    async fn estimate_gas_l1_to_l2(
        &self,
        request: L1ToL2EstimateRequest,
    ) -> EnrichedClientResult<U256> {
        let latency = LATENCIES.direct[&Method::EstimateGasL1ToL2].start();
        let gas = ZksNamespaceClient::estimate_gas_l1_to_l2(self, request.clone())
            .rpc_context("estimate_gas_l1_to_l2")
            .with_arg("from", &request.from)
            .with_arg("to", &request.to)
            .await?;
        latency.observe();
        Ok(gas)
    }
}
