use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use jsonrpsee::{core::ClientError, types::ErrorObject};
use zksync_eth_signer::TransactionParameters;
use zksync_types::{
    ethabi, keccak256,
    web3::types::{BlockId, BlockNumber, Bytes, CallRequest, TransactionReceipt},
    Address, L1ChainId, H256, U256, U64,
};

use crate::{
    types::{EnrichedClientError, EnrichedClientResult, ExecutedTxStatus, L1ToL2EstimateRequest},
    EthInterface, L2GasEstimator, RawTransactionBytes,
};

/// Transaction received by [`MockEthereum`], decoded from its raw EIP-1559 representation.
#[derive(Debug, Clone, PartialEq)]
pub struct MockTx {
    pub hash: H256,
    pub nonce: u64,
    pub recipient: Option<Address>,
    pub value: U256,
    pub input: Vec<u8>,
    pub gas_limit: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

impl MockTx {
    fn decode(raw_tx: &[u8]) -> Result<Self, ClientError> {
        let params = TransactionParameters::decode_eip1559(raw_tx)
            .map_err(|err| ClientError::Call(ErrorObject::owned(-32602, err.to_string(), None::<()>)))?;
        Ok(Self {
            hash: H256(keccak256(raw_tx)),
            nonce: params.nonce.as_u64(),
            recipient: params.to,
            value: params.value,
            input: params.data,
            gas_limit: params.gas,
            max_fee_per_gas: params.max_fee_per_gas,
            max_priority_fee_per_gas: params.max_priority_fee_per_gas,
        })
    }
}

/// Failure injected into `eth_sendRawTransaction` handling of [`MockEthereum`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockSendFailure {
    /// Transport-level failure; the transaction does not reach the node.
    Network,
    /// The node refuses the transaction with the specified message.
    Rejected(String),
    /// The request times out. If `accepted` is set, the node has received the transaction
    /// nevertheless.
    Timeout { accepted: bool },
}

/// Mutable part of [`MockEthereum`] that needs to be synchronized via an `RwLock`.
#[derive(Debug, Default)]
struct MockEthereumInner {
    block_number: u64,
    tx_statuses: HashMap<H256, ExecutedTxStatus>,
    sent_txs: Vec<MockTx>,
    send_attempts: usize,
    current_nonce: u64,
    pending_nonce: u64,
    next_send_failure: Option<MockSendFailure>,
    receipt_failures: usize,
    l2_estimate_requests: Vec<L1ToL2EstimateRequest>,
}

impl MockEthereumInner {
    fn execute_tx(&mut self, tx_hash: H256, success: bool, confirmations: u64) {
        let tx = self
            .sent_txs
            .iter()
            .find(|tx| tx.hash == tx_hash)
            .unwrap_or_else(|| panic!("transaction {tx_hash:?} was not sent"));
        assert_eq!(tx.nonce, self.current_nonce, "nonce mismatch");
        let recipient = tx.recipient;

        self.block_number += confirmations.max(1);
        self.current_nonce += 1;
        self.pending_nonce = self.pending_nonce.max(self.current_nonce);

        let receipt = TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: Some(self.block_number.into()),
            block_hash: Some(H256::from_low_u64_be(self.block_number)),
            to: recipient,
            gas_used: Some(21_000_u32.into()),
            status: Some(U64::from(u64::from(success))),
            ..TransactionReceipt::default()
        };
        let status = ExecutedTxStatus {
            tx_hash,
            success,
            receipt,
        };
        self.tx_statuses.insert(tx_hash, status);
    }
}

type CallHandler =
    dyn Fn(&CallRequest, BlockId) -> EnrichedClientResult<ethabi::Token> + Send + Sync;

/// Mock Ethereum client is capable of recording all the incoming requests for the further analysis.
///
/// The mock decodes EIP-1559 transactions it receives and tracks nonces of a single sending account.
/// Sent transactions are not executed unless [`Self::execute_tx()`] is called or auto-execution
/// is enabled.
#[derive(Clone)]
pub struct MockEthereum {
    chain_id: L1ChainId,
    base_fee_per_gas: U256,
    auto_execute: bool,
    l2_gas_estimate: Option<U256>,
    call_handler: Arc<CallHandler>,
    inner: Arc<RwLock<MockEthereumInner>>,
}

impl fmt::Debug for MockEthereum {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MockEthereum")
            .field("chain_id", &self.chain_id)
            .field("base_fee_per_gas", &self.base_fee_per_gas)
            .field("auto_execute", &self.auto_execute)
            .field("l2_gas_estimate", &self.l2_gas_estimate)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl Default for MockEthereum {
    fn default() -> Self {
        Self {
            chain_id: L1ChainId(9),
            base_fee_per_gas: 10.into(),
            auto_execute: false,
            l2_gas_estimate: None,
            call_handler: Arc::new(|call, block_id| {
                panic!("Unexpected eth_call: {call:?}, {block_id:?}");
            }),
            inner: Arc::default(),
        }
    }
}

impl MockEthereum {
    pub fn with_chain_id(self, chain_id: L1ChainId) -> Self {
        Self { chain_id, ..self }
    }

    pub fn with_base_fee_per_gas(self, base_fee_per_gas: U256) -> Self {
        Self {
            base_fee_per_gas,
            ..self
        }
    }

    /// Makes the mock execute every accepted transaction successfully in the next block.
    pub fn with_auto_execution(self, auto_execute: bool) -> Self {
        Self {
            auto_execute,
            ..self
        }
    }

    /// Sets the value returned by `zks_estimateGasL1ToL2`. If not set, estimation fails.
    pub fn with_l2_gas_estimate(self, estimate: U256) -> Self {
        Self {
            l2_gas_estimate: Some(estimate),
            ..self
        }
    }

    /// Sets the handler of `eth_call` requests. The returned token is ABI-encoded as the call output.
    pub fn with_call_handler<F>(self, call_handler: F) -> Self
    where
        F: 'static + Send + Sync + Fn(&CallRequest, BlockId) -> ethabi::Token,
    {
        Self {
            call_handler: Arc::new(move |call, block_id| Ok(call_handler(call, block_id))),
            ..self
        }
    }

    pub fn with_fallible_call_handler<F>(self, call_handler: F) -> Self
    where
        F: 'static
            + Send
            + Sync
            + Fn(&CallRequest, BlockId) -> EnrichedClientResult<ethabi::Token>,
    {
        Self {
            call_handler: Arc::new(call_handler),
            ..self
        }
    }

    /// Sets the nonce of the sending account, as if `nonce` transactions were already mined.
    pub fn with_nonce(self, nonce: u64) -> Self {
        {
            let mut inner = self.write();
            inner.current_nonce = nonce;
            inner.pending_nonce = nonce;
        }
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, MockEthereumInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MockEthereumInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next `eth_sendRawTransaction` call fail.
    pub fn fail_next_send(&self, failure: MockSendFailure) {
        self.write().next_send_failure = Some(failure);
    }

    /// Makes the next `count` receipt requests fail with a transport error.
    pub fn fail_receipt_requests(&self, count: usize) {
        self.write().receipt_failures = count;
    }

    /// Simulates a transaction sent by another process using the same account.
    pub fn bump_pending_nonce(&self) {
        self.write().pending_nonce += 1;
    }

    /// Returns the number of transactions accepted by this client.
    pub fn sent_tx_count(&self) -> usize {
        self.read().sent_txs.len()
    }

    /// Returns the number of `eth_sendRawTransaction` calls, including failed ones.
    pub fn send_attempts(&self) -> usize {
        self.read().send_attempts
    }

    /// Returns transactions accepted by this client in the order of their submission.
    pub fn sent_txs(&self) -> Vec<MockTx> {
        self.read().sent_txs.clone()
    }

    /// Returns the requests received by `zks_estimateGasL1ToL2`.
    pub fn l2_estimate_requests(&self) -> Vec<L1ToL2EstimateRequest> {
        self.read().l2_estimate_requests.clone()
    }

    /// Increments the blocks by a provided `confirmations` and marks the sent transaction
    /// as a success or failure.
    pub fn execute_tx(&self, tx_hash: H256, success: bool, confirmations: u64) {
        self.write().execute_tx(tx_hash, success, confirmations);
    }

    fn send_error(failure: MockSendFailure) -> EnrichedClientError {
        let err = match failure {
            MockSendFailure::Network => ClientError::Transport("connection refused".into()),
            MockSendFailure::Rejected(message) => {
                ClientError::Call(ErrorObject::owned(-32000, message, None::<()>))
            }
            MockSendFailure::Timeout { .. } => ClientError::RequestTimeout,
        };
        EnrichedClientError::new(err, "send_raw_transaction")
    }
}

#[async_trait]
impl EthInterface for MockEthereum {
    async fn fetch_chain_id(&self) -> EnrichedClientResult<L1ChainId> {
        Ok(self.chain_id)
    }

    async fn nonce_at_for_account(
        &self,
        _account: Address,
        block: BlockNumber,
    ) -> EnrichedClientResult<U256> {
        let inner = self.read();
        Ok(match block {
            BlockNumber::Pending => inner.pending_nonce.into(),
            _ => inner.current_nonce.into(),
        })
    }

    async fn get_pending_block_base_fee_per_gas(&self) -> EnrichedClientResult<U256> {
        Ok(self.base_fee_per_gas)
    }

    async fn send_raw_tx(&self, tx: RawTransactionBytes) -> EnrichedClientResult<H256> {
        let mut inner = self.write();
        inner.send_attempts += 1;
        let failure = inner.next_send_failure.take();
        let accepted_failure = match failure {
            Some(MockSendFailure::Timeout { accepted: true }) => failure,
            Some(failure) => return Err(Self::send_error(failure)),
            None => None,
        };

        let mock_tx = MockTx::decode(tx.as_ref())
            .map_err(|err| EnrichedClientError::new(err, "send_raw_transaction"))?;
        if mock_tx.nonce < inner.current_nonce
            || inner.sent_txs.iter().any(|tx| tx.nonce == mock_tx.nonce)
        {
            let message = format!("nonce too low: {}", mock_tx.nonce);
            return Err(Self::send_error(MockSendFailure::Rejected(message)));
        }

        let tx_hash = mock_tx.hash;
        if mock_tx.nonce == inner.pending_nonce {
            inner.pending_nonce += 1;
        }
        inner.sent_txs.push(mock_tx);
        if self.auto_execute {
            inner.execute_tx(tx_hash, true, 1);
        }
        if let Some(failure) = accepted_failure {
            return Err(Self::send_error(failure));
        }
        Ok(tx_hash)
    }

    async fn call_contract_function(
        &self,
        request: CallRequest,
        block: Option<BlockId>,
    ) -> EnrichedClientResult<Bytes> {
        let block = block.unwrap_or_else(|| BlockNumber::Latest.into());
        (self.call_handler)(&request, block).map(|token| Bytes(ethabi::encode(&[token])))
    }

    async fn tx_receipt(&self, tx_hash: H256) -> EnrichedClientResult<Option<TransactionReceipt>> {
        let mut inner = self.write();
        if inner.receipt_failures > 0 {
            inner.receipt_failures -= 1;
            let err = ClientError::Transport("connection reset".into());
            return Err(EnrichedClientError::new(err, "get_transaction_receipt"));
        }
        Ok(inner
            .tx_statuses
            .get(&tx_hash)
            .map(|status| status.receipt.clone()))
    }
}

#[async_trait]
impl L2GasEstimator for MockEthereum {
    async fn estimate_gas_l1_to_l2(
        &self,
        request: L1ToL2EstimateRequest,
    ) -> EnrichedClientResult<U256> {
        self.write().l2_estimate_requests.push(request);
        self.l2_gas_estimate.ok_or_else(|| {
            let err = ErrorObject::owned(-32601, "method not found", None::<()>);
            EnrichedClientError::new(ClientError::Call(err), "estimate_gas_l1_to_l2")
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use zksync_eth_signer::{EthereumSigner, PrivateKeySigner};

    use super::*;

    async fn signed_tx(nonce: u64) -> RawTransactionBytes {
        let signer = PrivateKeySigner::from_bytes(H256::repeat_byte(0x11)).unwrap();
        let params = TransactionParameters {
            nonce: nonce.into(),
            to: Some(Address::repeat_byte(1)),
            gas: 100_000.into(),
            value: 5.into(),
            data: b"test".to_vec(),
            chain_id: 9,
            transaction_type: Some(2.into()),
            max_fee_per_gas: 100.into(),
            max_priority_fee_per_gas: 10.into(),
            ..TransactionParameters::default()
        };
        let signed = signer.sign_transaction(params).await.unwrap();
        RawTransactionBytes::new_unchecked(signed.raw_transaction)
    }

    #[tokio::test]
    async fn managing_transactions() {
        let client = MockEthereum::default();
        let tx_hash = client.send_raw_tx(signed_tx(0).await).await.unwrap();
        assert_eq!(client.sent_tx_count(), 1);
        let sent_tx = &client.sent_txs()[0];
        assert_eq!(sent_tx.hash, tx_hash);
        assert_eq!(sent_tx.recipient, Some(Address::repeat_byte(1)));
        assert_eq!(sent_tx.input, b"test");
        assert_eq!(sent_tx.value, 5.into());

        let pending = client
            .nonce_at_for_account(Address::zero(), BlockNumber::Pending)
            .await
            .unwrap();
        assert_eq!(pending, 1.into());
        assert!(client.get_tx_status(tx_hash).await.unwrap().is_none());

        client.execute_tx(tx_hash, true, 3);
        let tx_status = client
            .get_tx_status(tx_hash)
            .await
            .unwrap()
            .expect("no transaction status");
        assert!(tx_status.success);
        assert_eq!(tx_status.tx_hash, tx_hash);
        assert_eq!(tx_status.receipt.block_number, Some(3.into()));

        let latest = client
            .nonce_at_for_account(Address::zero(), BlockNumber::Latest)
            .await
            .unwrap();
        assert_eq!(latest, 1.into());
    }

    #[tokio::test]
    async fn reverted_transaction_status() {
        let client = MockEthereum::default();
        let tx_hash = client.send_raw_tx(signed_tx(0).await).await.unwrap();
        client.execute_tx(tx_hash, false, 1);
        let tx_status = client.get_tx_status(tx_hash).await.unwrap().unwrap();
        assert!(!tx_status.success);
        assert_eq!(tx_status.receipt.status, Some(0.into()));
    }

    #[tokio::test]
    async fn reused_nonce_is_rejected() {
        let client = MockEthereum::default();
        client.send_raw_tx(signed_tx(0).await).await.unwrap();
        let err = client.send_raw_tx(signed_tx(0).await).await.unwrap_err();
        assert!(!err.is_retryable());
        assert_matches!(err.as_ref(), ClientError::Call(_));
        assert_eq!(client.sent_tx_count(), 1);
        assert_eq!(client.send_attempts(), 2);
    }

    #[tokio::test]
    async fn injected_failures() {
        let client = MockEthereum::default();
        client.fail_next_send(MockSendFailure::Network);
        let err = client.send_raw_tx(signed_tx(0).await).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(client.sent_tx_count(), 0);

        let tx_hash = client.send_raw_tx(signed_tx(0).await).await.unwrap();
        client.fail_receipt_requests(1);
        client.tx_receipt(tx_hash).await.unwrap_err();
        assert!(client.tx_receipt(tx_hash).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn timed_out_send_may_still_be_accepted() {
        let client = MockEthereum::default();
        client.fail_next_send(MockSendFailure::Timeout { accepted: true });
        let err = client.send_raw_tx(signed_tx(0).await).await.unwrap_err();
        assert!(err.has_unknown_outcome());
        assert_eq!(client.sent_tx_count(), 1);

        client.fail_next_send(MockSendFailure::Timeout { accepted: false });
        let err = client.send_raw_tx(signed_tx(1).await).await.unwrap_err();
        assert!(err.has_unknown_outcome());
        assert_eq!(client.sent_tx_count(), 1);
        assert_eq!(client.send_attempts(), 2);
    }

    #[tokio::test]
    async fn calling_contract_function() {
        let contract = Address::repeat_byte(0x42);
        let client = MockEthereum::default().with_call_handler(move |request, block| {
            assert_eq!(request.to, Some(contract));
            assert_eq!(block, BlockNumber::Latest.into());
            ethabi::Token::Uint(U256::from(123))
        });
        let request = CallRequest {
            to: Some(contract),
            data: Some(Bytes(vec![1, 2, 3, 4])),
            ..CallRequest::default()
        };
        let output = client.call_contract_function(request, None).await.unwrap();
        let decoded = ethabi::decode(&[ethabi::ParamType::Uint(256)], &output.0).unwrap();
        assert_eq!(decoded, [ethabi::Token::Uint(U256::from(123))]);
    }

    #[tokio::test]
    async fn auto_execution() {
        let client = MockEthereum::default().with_auto_execution(true).with_nonce(5);
        let tx_hash = client.send_raw_tx(signed_tx(5).await).await.unwrap();
        let tx_status = client.get_tx_status(tx_hash).await.unwrap().unwrap();
        assert!(tx_status.success);
    }

    #[tokio::test]
    async fn malformed_transaction_is_rejected() {
        let client = MockEthereum::default();
        let raw_tx = RawTransactionBytes::new_unchecked(vec![0x02, 0xc0]);
        client.send_raw_tx(raw_tx).await.unwrap_err();
        assert_eq!(client.sent_tx_count(), 0);
    }
}
