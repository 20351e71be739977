//! Deployment of contracts on a ZKsync chain through L1.
//!
//! A contract is deployed by an L1 transaction calling `Bridgehub.requestL2TransactionDirect`,
//! which enqueues a priority transaction calling `ContractDeployer.create2` on L2. The address
//! of the deployed contract is derived before anything is sent to L1.

pub use crate::{
    address::AddressDeriver,
    builder::{DeploymentRequest, PriorityTransaction, PriorityTransactionBuilder},
    errors::{
        DeploymentError, DeploymentErrorKind, EstimationError, InvalidInputError, RejectionReason,
    },
    gas::{GasEstimationRequest, GasEstimator, GasPriceParams, L2Pricing, PricingSource},
    nonce::NonceSequencer,
    orchestrator::{DeploymentOrchestrator, DeploymentStage, DeploymentStep},
    result::{DeploymentReport, DeploymentResult},
    submitter::{L1Submitter, SignedPriorityTransaction},
};

pub mod address;
mod builder;
mod errors;
mod functions;
mod gas;
mod metrics;
mod nonce;
mod orchestrator;
mod result;
mod submitter;
