// Public re-exports
pub use self::{
    chain::L2ChainConfig,
    contracts::{ContractsConfig, FeeParamsConfig},
    deployer::{
        BaseCostSource, DeploymentConfig, GasLimitStrategy, GasPriceSource, L2DeployerConfig,
    },
    eth_client::ETHClientConfig,
    observability::ObservabilityConfig,
    wallets::Wallet,
};

pub mod chain;
pub mod contracts;
pub mod deployer;
pub mod eth_client;
pub mod observability;
pub mod wallets;
