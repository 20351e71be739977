//! Sequencing of a single deployment.

use std::{future::Future, sync::Arc};

use tokio::sync::watch;
use zksync_config::DeploymentConfig;
use zksync_eth_client::{EthInterface, L2GasEstimator};
use zksync_eth_signer::EthereumSigner;
use zksync_types::{Address, L1ChainId, H256};
use zksync_utils::bytecode::hash_bytecode;

use crate::{
    address::AddressDeriver,
    builder::{DeploymentRequest, PriorityTransactionBuilder},
    errors::{DeploymentError, DeploymentErrorKind},
    gas::GasEstimator,
    metrics::METRICS,
    nonce::NonceSequencer,
    result::DeploymentResult,
    submitter::L1Submitter,
};

/// Step of a deployment; a [`DeploymentStage::Failed`] stage refers to the step that has failed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, vise::EncodeLabelValue, vise::EncodeLabelSet,
)]
#[metrics(label = "step", rename_all = "snake_case")]
pub enum DeploymentStep {
    ComputeAddress,
    EstimateGas,
    BuildTransaction,
    Submit,
    AwaitConfirmation,
}

/// Progress of a deployment as published by [`DeploymentOrchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeploymentStage {
    Idle,
    AddressComputed { l2_address: Address },
    GasEstimated { l2_gas_limit: u64 },
    TransactionBuilt,
    Submitted { tx_hash: H256 },
    Confirmed { tx_hash: H256 },
    Failed {
        step: DeploymentStep,
        kind: DeploymentErrorKind,
    },
}

impl DeploymentStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Failed { .. })
    }
}

/// Deploys contracts on L2 by sending priority transactions on L1.
///
/// Deployment steps are always executed in the same order: the L2 address is computed first,
/// then the gas parameters are chosen, the transaction is built, sent and finally confirmed.
/// Errors are not retried.
#[derive(Debug)]
pub struct DeploymentOrchestrator {
    address_deriver: AddressDeriver,
    builder: PriorityTransactionBuilder,
    estimator: GasEstimator,
    submitter: L1Submitter,
    stage_sender: watch::Sender<DeploymentStage>,
}

impl DeploymentOrchestrator {
    pub fn new(
        address_deriver: AddressDeriver,
        builder: PriorityTransactionBuilder,
        estimator: GasEstimator,
        submitter: L1Submitter,
    ) -> Self {
        Self {
            address_deriver,
            builder,
            estimator,
            submitter,
            stage_sender: watch::channel(DeploymentStage::Idle).0,
        }
    }

    /// Creates an orchestrator with all components configured from `config`. Fails if `nonces`
    /// are not created for the address of `signer`.
    pub async fn from_config(
        config: &DeploymentConfig,
        l1_client: Arc<dyn EthInterface>,
        l2_client: Option<Arc<dyn L2GasEstimator>>,
        signer: Arc<dyn EthereumSigner>,
        nonces: NonceSequencer,
    ) -> Result<Self, DeploymentError> {
        let address_deriver = AddressDeriver::new(config.deployer.apply_l1_to_l2_alias);
        let builder = PriorityTransactionBuilder::from_config(config)?;
        let estimator = GasEstimator::from_config(config, l1_client.clone(), l2_client)?;
        let submitter = L1Submitter::new(
            l1_client,
            signer,
            nonces,
            L1ChainId(config.eth_client.chain_id),
            &config.deployer,
        )
        .await?;
        Ok(Self::new(address_deriver, builder, estimator, submitter))
    }

    /// Subscribes to stage transitions.
    pub fn subscribe(&self) -> watch::Receiver<DeploymentStage> {
        self.stage_sender.subscribe()
    }

    fn set_stage(&self, stage: DeploymentStage) {
        tracing::debug!(?stage, "Deployment stage changed");
        self.stage_sender.send_replace(stage);
    }

    async fn run_step<T>(
        &self,
        step: DeploymentStep,
        action: impl Future<Output = Result<T, DeploymentError>>,
    ) -> Result<T, DeploymentError> {
        let latency = METRICS.step_latency[&step].start();
        let result = action.await;
        latency.observe();

        if let Err(err) = &result {
            let kind = err.kind();
            tracing::error!(?step, ?kind, "Deployment failed: {err}");
            METRICS.failures[&kind].inc();
            self.set_stage(DeploymentStage::Failed { step, kind });
        }
        result
    }

    /// Deploys the contract and waits for the L1 transaction to be confirmed. The wait can be
    /// interrupted via `stop_receiver`; this doesn't revoke the sent transaction.
    #[tracing::instrument(
        name = "DeploymentOrchestrator::deploy",
        skip_all,
        fields(chain_id = self.builder.chain_id().0, salt = ?request.salt)
    )]
    pub async fn deploy(
        &self,
        request: &DeploymentRequest,
        stop_receiver: watch::Receiver<bool>,
    ) -> Result<DeploymentResult, DeploymentError> {
        self.set_stage(DeploymentStage::Idle);
        let sender = self.submitter.sender();

        let l2_address = self
            .run_step(DeploymentStep::ComputeAddress, async {
                let bytecode_hash = hash_bytecode(&request.bytecode)?;
                Ok(self.address_deriver.derive(
                    sender,
                    bytecode_hash,
                    request.salt,
                    &request.constructor_input,
                ))
            })
            .await?;
        tracing::info!("Contract will be deployed at L2 address {l2_address:?}");
        self.set_stage(DeploymentStage::AddressComputed { l2_address });

        let (l2_gas_limit, gas_price, pricing) = self
            .run_step(DeploymentStep::EstimateGas, async {
                let estimation_request = self.builder.gas_estimation_request(sender, request)?;
                let l2_gas_limit = self.estimator.estimate(&estimation_request).await?;
                let gas_price = self.estimator.gas_price_params().await?;
                let pricing = self
                    .estimator
                    .l2_pricing(estimation_request.chain_id, l2_gas_limit, &gas_price)
                    .await?;
                Ok((l2_gas_limit, gas_price, pricing))
            })
            .await?;
        self.set_stage(DeploymentStage::GasEstimated { l2_gas_limit });

        let transaction = self
            .run_step(DeploymentStep::BuildTransaction, async {
                self.builder.build(sender, request, l2_gas_limit, gas_price, pricing)
            })
            .await?;
        self.set_stage(DeploymentStage::TransactionBuilt);

        let signed = self
            .run_step(DeploymentStep::Submit, self.submitter.submit(transaction))
            .await?;
        let tx_hash = signed.hash;
        self.set_stage(DeploymentStage::Submitted { tx_hash });

        let l1_receipt = self
            .run_step(
                DeploymentStep::AwaitConfirmation,
                self.submitter.await_confirmation(tx_hash, stop_receiver),
            )
            .await?;
        self.set_stage(DeploymentStage::Confirmed { tx_hash });

        Ok(DeploymentResult {
            l1_receipt,
            l2_address,
        })
    }
}
