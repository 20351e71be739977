//! Signing, sending and confirming L1 transactions.

use std::{fmt, sync::Arc, time::Duration};

use tokio::{sync::watch, time::Instant};
use zksync_config::L2DeployerConfig;
use zksync_eth_client::{EthInterface, RawTransactionBytes};
use zksync_eth_signer::{EthereumSigner, TransactionParameters};
use zksync_types::{
    web3::types::TransactionReceipt, Address, L1ChainId, EIP_1559_TX_TYPE, H256,
};

use crate::{
    builder::PriorityTransaction,
    errors::{DeploymentError, InvalidInputError, RejectionReason},
    metrics::METRICS,
    nonce::NonceSequencer,
};

/// Priority transaction that was signed and accepted by an L1 node.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedPriorityTransaction {
    pub transaction: PriorityTransaction,
    pub nonce: u64,
    pub hash: H256,
    pub raw_tx: Vec<u8>,
}

/// Sends deployment transactions to L1 and waits for their inclusion.
pub struct L1Submitter {
    client: Arc<dyn EthInterface>,
    signer: Arc<dyn EthereumSigner>,
    nonces: NonceSequencer,
    l1_chain_id: L1ChainId,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl fmt::Debug for L1Submitter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("L1Submitter")
            .field("client", &self.client)
            .field("account", &self.nonces.account())
            .field("l1_chain_id", &self.l1_chain_id)
            .field("poll_interval", &self.poll_interval)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish_non_exhaustive()
    }
}

impl L1Submitter {
    /// Creates a submitter. Fails if `nonces` are not created for the address of `signer`.
    pub async fn new(
        client: Arc<dyn EthInterface>,
        signer: Arc<dyn EthereumSigner>,
        nonces: NonceSequencer,
        l1_chain_id: L1ChainId,
        config: &L2DeployerConfig,
    ) -> Result<Self, DeploymentError> {
        let signer_address = signer
            .get_address()
            .await
            .map_err(InvalidInputError::Signing)?;
        if signer_address != nonces.account() {
            tracing::warn!(
                "Nonce sequencer account {:?} differs from signer address {signer_address:?}",
                nonces.account()
            );
            let err = InvalidInputError::Config("nonce sequencer account differs from the signer");
            return Err(err.into());
        }

        Ok(Self {
            client,
            signer,
            nonces,
            l1_chain_id,
            poll_interval: config.poll_interval(),
            confirmation_timeout: config.confirmation_timeout(),
        })
    }

    /// L1 account sending the transactions.
    pub fn sender(&self) -> Address {
        self.nonces.account()
    }

    /// Signs and broadcasts the transaction. Each call sends at most one transaction; errors
    /// are never retried.
    pub async fn submit(
        &self,
        transaction: PriorityTransaction,
    ) -> Result<SignedPriorityTransaction, DeploymentError> {
        if transaction.sender != self.sender() {
            let err = InvalidInputError::Config("transaction sender differs from the signer");
            return Err(err.into());
        }

        let nonce = self.nonces.next_nonce(self.client.as_ref()).await?;
        let params = TransactionParameters {
            nonce: nonce.into(),
            to: Some(transaction.bridgehub),
            gas: transaction.l1_gas_limit.into(),
            value: transaction.value,
            data: transaction.calldata.clone(),
            chain_id: self.l1_chain_id.0,
            transaction_type: Some(EIP_1559_TX_TYPE.into()),
            max_fee_per_gas: transaction.gas_price.max_fee_per_gas,
            max_priority_fee_per_gas: transaction.gas_price.max_priority_fee_per_gas,
            ..TransactionParameters::default()
        };
        let signed = self
            .signer
            .sign_transaction(params)
            .await
            .map_err(InvalidInputError::Signing)?;

        let raw_tx = RawTransactionBytes::new_unchecked(signed.raw_transaction.clone());
        match self.client.send_raw_tx(raw_tx).await {
            Ok(returned_hash) if returned_hash != signed.transaction_hash => {
                tracing::warn!(
                    "L1 node returned hash {returned_hash:?} for transaction {:?}",
                    signed.transaction_hash
                );
            }
            Ok(_) => {}
            // The transaction may be in the mempool already, so it's tracked by its locally
            // computed hash. Confirmation either succeeds or times out with this hash.
            Err(err) if err.has_unknown_outcome() => {
                tracing::warn!(
                    nonce,
                    "Outcome of sending transaction {:?} is unknown: {err}",
                    signed.transaction_hash
                );
            }
            Err(err) => return Err(DeploymentError::from_l1_error(err)),
        }

        tracing::info!(
            nonce,
            mint_value = %transaction.mint_value,
            "Sent deployment transaction {:?}",
            signed.transaction_hash
        );
        Ok(SignedPriorityTransaction {
            transaction,
            nonce,
            hash: signed.transaction_hash,
            raw_tx: signed.raw_transaction,
        })
    }

    /// Polls L1 until the transaction is included. Transient polling errors are logged and
    /// do not interrupt the wait.
    pub async fn await_confirmation(
        &self,
        tx_hash: H256,
        mut stop_receiver: watch::Receiver<bool>,
    ) -> Result<TransactionReceipt, DeploymentError> {
        let deadline = Instant::now() + self.confirmation_timeout;
        loop {
            if *stop_receiver.borrow() {
                tracing::info!("Stop signal received, not waiting for {tx_hash:?} anymore");
                return Err(DeploymentError::ConfirmationCancelled { tx_hash });
            }

            match self.client.get_tx_status(tx_hash).await {
                Ok(Some(status)) if status.success => {
                    tracing::info!(
                        block_number = ?status.receipt.block_number,
                        "Transaction {tx_hash:?} is confirmed"
                    );
                    return Ok(status.receipt);
                }
                Ok(Some(_)) => return Err(RejectionReason::Reverted { tx_hash }.into()),
                Ok(None) => tracing::trace!("Transaction {tx_hash:?} is not included yet"),
                Err(err) => {
                    METRICS.receipt_poll_errors.inc();
                    tracing::warn!("Failed polling status of {tx_hash:?}: {err}");
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(DeploymentError::ConfirmationTimeout {
                    tx_hash,
                    timeout: self.confirmation_timeout,
                });
            }
            let wait = self.poll_interval.min(deadline - now);
            // If the stop sender is dropped, the wait can no longer be cancelled.
            if let Ok(Err(_)) = tokio::time::timeout(wait, stop_receiver.changed()).await {
                tokio::time::sleep(wait).await;
            }
        }
    }
}
