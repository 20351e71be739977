use std::time::Duration;

use zksync_eth_client::EnrichedClientError;
use zksync_eth_signer::SignerError;
use zksync_types::{ethabi, fee_model::PriorityTxGasError, H256};
use zksync_utils::bytecode::InvalidBytecodeError;

/// Input of a deployment that cannot be turned into a valid priority transaction.
/// Detected before any network interaction.
#[derive(Debug, thiserror::Error)]
pub enum InvalidInputError {
    #[error("invalid contract bytecode: {0}")]
    Bytecode(#[source] InvalidBytecodeError),
    #[error("invalid factory dependency #{index}: {source}")]
    FactoryDep {
        index: usize,
        #[source]
        source: InvalidBytecodeError,
    },
    #[error("invalid L2 gas limit: {0}")]
    GasLimit(#[from] PriorityTxGasError),
    #[error("failed signing transaction: {0}")]
    Signing(#[from] SignerError),
    #[error("invalid configuration: {0}")]
    Config(&'static str),
}

/// Reasons of a failed gas estimation.
#[derive(Debug, thiserror::Error)]
pub enum EstimationError {
    #[error("live gas estimation requires an L2 client")]
    NoL2Client,
    #[error("L2 node failed estimating gas: {0}")]
    Rpc(#[from] EnrichedClientError),
    #[error("L2 node returned zero gas estimate")]
    ZeroEstimate,
    #[error("estimated gas limit {estimate} exceeds the maximum of {max}")]
    AboveCeiling { estimate: u64, max: u64 },
    #[error("Bridgehub failed computing L2 transaction cost: {0}")]
    BaseCost(#[source] EnrichedClientError),
    #[error("failed decoding Bridgehub output: {0}")]
    Decoding(#[source] ethabi::Error),
}

/// Reasons for L1 refusing a deployment transaction.
#[derive(Debug, thiserror::Error)]
pub enum RejectionReason {
    #[error("node refused the transaction: {0}")]
    Refused(#[source] EnrichedClientError),
    #[error("transaction {tx_hash:?} was reverted")]
    Reverted { tx_hash: H256 },
}

/// Kind of [`DeploymentError`], used for matching and reporting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, vise::EncodeLabelValue, vise::EncodeLabelSet,
)]
#[metrics(label = "kind", rename_all = "snake_case")]
pub enum DeploymentErrorKind {
    InvalidInput,
    EstimationUnavailable,
    SubmissionRejected,
    NetworkUnavailable,
    ConfirmationTimeout,
    ConfirmationCancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("invalid deployment input: {0}")]
    InvalidInput(#[from] InvalidInputError),
    #[error("gas estimation unavailable: {0}")]
    EstimationUnavailable(#[from] EstimationError),
    #[error("deployment transaction rejected: {0}")]
    SubmissionRejected(#[from] RejectionReason),
    #[error("L1 network unavailable: {0}")]
    NetworkUnavailable(#[source] EnrichedClientError),
    /// The transaction may still be included; its receipt must be checked before resubmitting.
    #[error("transaction {tx_hash:?} was not confirmed in {timeout:?}")]
    ConfirmationTimeout { tx_hash: H256, timeout: Duration },
    /// Same guidance as for [`Self::ConfirmationTimeout`] applies.
    #[error("waiting for confirmation of transaction {tx_hash:?} was cancelled")]
    ConfirmationCancelled { tx_hash: H256 },
}

impl From<InvalidBytecodeError> for DeploymentError {
    fn from(err: InvalidBytecodeError) -> Self {
        Self::InvalidInput(InvalidInputError::Bytecode(err))
    }
}

impl From<PriorityTxGasError> for DeploymentError {
    fn from(err: PriorityTxGasError) -> Self {
        Self::InvalidInput(err.into())
    }
}

impl DeploymentError {
    pub fn kind(&self) -> DeploymentErrorKind {
        match self {
            Self::InvalidInput(_) => DeploymentErrorKind::InvalidInput,
            Self::EstimationUnavailable(_) => DeploymentErrorKind::EstimationUnavailable,
            Self::SubmissionRejected(_) => DeploymentErrorKind::SubmissionRejected,
            Self::NetworkUnavailable(_) => DeploymentErrorKind::NetworkUnavailable,
            Self::ConfirmationTimeout { .. } => DeploymentErrorKind::ConfirmationTimeout,
            Self::ConfirmationCancelled { .. } => DeploymentErrorKind::ConfirmationCancelled,
        }
    }

    /// Only transient network failures may be retried; the transaction was not accepted in this case.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_))
    }

    /// Returns the hash of a transaction that might have been included on L1 despite the error.
    pub fn pending_tx_hash(&self) -> Option<H256> {
        match self {
            Self::ConfirmationTimeout { tx_hash, .. } | Self::ConfirmationCancelled { tx_hash } => {
                Some(*tx_hash)
            }
            _ => None,
        }
    }

    /// Classifies an L1 client error: transient errors mean that the node is unavailable,
    /// other errors mean that the node has processed and refused the request. Errors after which
    /// the request might have been processed are never classified as transient.
    pub(crate) fn from_l1_error(err: EnrichedClientError) -> Self {
        if err.is_retryable() && !err.has_unknown_outcome() {
            Self::NetworkUnavailable(err)
        } else {
            Self::SubmissionRejected(RejectionReason::Refused(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use jsonrpsee::core::ClientError;
    use test_casing::test_casing;

    use super::*;

    fn all_errors() -> Vec<DeploymentError> {
        vec![
            InvalidBytecodeError::BytecodeIsEmpty.into(),
            EstimationError::NoL2Client.into(),
            RejectionReason::Reverted {
                tx_hash: H256::zero(),
            }
            .into(),
            DeploymentError::NetworkUnavailable(EnrichedClientError::custom("down", "test")),
            DeploymentError::ConfirmationTimeout {
                tx_hash: H256::repeat_byte(1),
                timeout: Duration::from_secs(1),
            },
            DeploymentError::ConfirmationCancelled {
                tx_hash: H256::repeat_byte(2),
            },
        ]
    }

    #[test_casing(6, [0, 1, 2, 3, 4, 5])]
    #[test]
    fn only_network_errors_are_retriable(index: usize) {
        let err = all_errors().swap_remove(index);
        let kind = err.kind();
        assert_eq!(
            err.is_retriable(),
            kind == DeploymentErrorKind::NetworkUnavailable,
            "{err}"
        );
    }

    #[test]
    fn pending_tx_hash_is_exposed() {
        let errors = all_errors();
        let hashes: Vec<_> = errors.iter().filter_map(DeploymentError::pending_tx_hash).collect();
        assert_eq!(hashes, [H256::repeat_byte(1), H256::repeat_byte(2)]);
    }

    #[test]
    fn classifying_l1_errors() {
        let err = EnrichedClientError::new(
            ClientError::Transport("connection refused".into()),
            "send_raw_transaction",
        );
        let err = DeploymentError::from_l1_error(err);
        assert_matches!(err, DeploymentError::NetworkUnavailable(_));

        let err = EnrichedClientError::new(ClientError::RequestTimeout, "send_raw_transaction");
        let err = DeploymentError::from_l1_error(err);
        assert!(!err.is_retriable(), "{err}");
        assert_matches!(
            err,
            DeploymentError::SubmissionRejected(RejectionReason::Refused(_))
        );
    }

    #[test]
    fn gas_limit_errors_are_invalid_input() {
        let err: DeploymentError = PriorityTxGasError::GasLimitTooLow {
            gas_limit: 1,
            min: 2,
        }
        .into();
        assert_eq!(err.kind(), DeploymentErrorKind::InvalidInput);
        assert!(err.to_string().contains("below the minimum"), "{err}");
    }
}
