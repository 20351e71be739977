#![allow(clippy::upper_case_acronyms, clippy::derive_partial_eq_without_eq)]

pub use crate::configs::{
    BaseCostSource, ContractsConfig, DeploymentConfig, ETHClientConfig, FeeParamsConfig,
    GasLimitStrategy, GasPriceSource, L2ChainConfig, L2DeployerConfig, ObservabilityConfig,
    Wallet,
};

pub mod configs;
mod observability_ext;
