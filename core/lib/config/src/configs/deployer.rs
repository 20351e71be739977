use std::time::Duration;

use serde::Deserialize;

use super::{ContractsConfig, ETHClientConfig, FeeParamsConfig, L2ChainConfig};

/// How the L2 gas limit of the priority transaction is chosen.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GasLimitStrategy {
    /// Always attach the configured priority transaction gas ceiling.
    #[default]
    Static,
    /// Query `zks_estimateGasL1ToL2` on the target chain.
    Live,
    /// Query the target chain; use the static ceiling if the query fails.
    LiveWithFallback,
}

/// Where the L1 gas price parameters come from.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GasPriceSource {
    /// Use `max_fee_per_gas` / `max_priority_fee_per_gas` from the config.
    Fixed,
    /// Derive the fees from the pending L1 block.
    #[default]
    Live,
}

/// Where the base cost of the L2 transaction and the base token of the chain come from.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BaseCostSource {
    /// Compute the cost from the configured fee params; the base token is taken from
    /// the contracts config.
    Config,
    /// Query `l2TransactionBaseCost` and `baseToken` of the Bridgehub contract.
    #[default]
    Bridgehub,
}

/// Behavior of the L2 contract deployer.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct L2DeployerConfig {
    #[serde(default)]
    pub gas_limit_strategy: GasLimitStrategy,
    /// Multiplier applied to live L2 gas estimates.
    #[serde(default = "L2DeployerConfig::default_gas_limit_scale_factor")]
    pub gas_limit_scale_factor: f64,
    #[serde(default)]
    pub gas_price_source: GasPriceSource,
    /// Required for the `fixed` gas price source.
    #[serde(default)]
    pub max_fee_per_gas: Option<u64>,
    /// Priority fee; used by both gas price sources.
    #[serde(default = "L2DeployerConfig::default_max_priority_fee_per_gas")]
    pub max_priority_fee_per_gas: u64,
    #[serde(default)]
    pub base_cost_source: BaseCostSource,
    #[serde(default = "L2DeployerConfig::default_confirmation_timeout_sec")]
    pub confirmation_timeout_sec: u64,
    #[serde(default = "L2DeployerConfig::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Timeout for a single JSON-RPC request.
    #[serde(default = "L2DeployerConfig::default_rpc_timeout_sec")]
    pub rpc_timeout_sec: u64,
    /// Whether the L2 address is derived for the aliased L1 sender. Required if the sender
    /// is an L1 contract rather than an EOA.
    #[serde(default)]
    pub apply_l1_to_l2_alias: bool,
    /// Key under which the deployed contract address is reported.
    #[serde(default = "L2DeployerConfig::default_address_key")]
    pub address_key: String,
}

impl Default for L2DeployerConfig {
    fn default() -> Self {
        Self {
            gas_limit_strategy: GasLimitStrategy::default(),
            gas_limit_scale_factor: Self::default_gas_limit_scale_factor(),
            gas_price_source: GasPriceSource::default(),
            max_fee_per_gas: None,
            max_priority_fee_per_gas: Self::default_max_priority_fee_per_gas(),
            base_cost_source: BaseCostSource::default(),
            confirmation_timeout_sec: Self::default_confirmation_timeout_sec(),
            poll_interval_ms: Self::default_poll_interval_ms(),
            rpc_timeout_sec: Self::default_rpc_timeout_sec(),
            apply_l1_to_l2_alias: false,
            address_key: Self::default_address_key(),
        }
    }
}

impl L2DeployerConfig {
    const fn default_gas_limit_scale_factor() -> f64 {
        1.3
    }

    const fn default_max_priority_fee_per_gas() -> u64 {
        1_000_000_000
    }

    const fn default_confirmation_timeout_sec() -> u64 {
        300
    }

    const fn default_poll_interval_ms() -> u64 {
        1_000
    }

    const fn default_rpc_timeout_sec() -> u64 {
        30
    }

    fn default_address_key() -> String {
        "CONTRACTS_L2_CONSENSUS_AUTHORITY_ADDR".to_owned()
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_sec)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_sec)
    }

    /// Checks consistency of the config.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.gas_limit_scale_factor.is_finite() && self.gas_limit_scale_factor >= 1.0,
            "`gas_limit_scale_factor` must be at least 1.0, got {}",
            self.gas_limit_scale_factor
        );
        if self.gas_price_source == GasPriceSource::Fixed {
            let max_fee = self.max_fee_per_gas.ok_or_else(|| {
                anyhow::anyhow!("`max_fee_per_gas` must be set for the fixed gas price source")
            })?;
            anyhow::ensure!(
                max_fee >= self.max_priority_fee_per_gas,
                "`max_fee_per_gas` ({max_fee}) is less than `max_priority_fee_per_gas` ({})",
                self.max_priority_fee_per_gas
            );
        }
        anyhow::ensure!(self.poll_interval_ms > 0, "`poll_interval_ms` must be positive");
        anyhow::ensure!(!self.address_key.is_empty(), "`address_key` must not be empty");
        Ok(())
    }

    pub fn for_tests() -> Self {
        Self {
            gas_price_source: GasPriceSource::Fixed,
            max_fee_per_gas: Some(10_000_000_000),
            base_cost_source: BaseCostSource::Config,
            confirmation_timeout_sec: 5,
            poll_interval_ms: 10,
            ..Self::default()
        }
    }
}

/// Complete configuration of a deployment, except for the deployer wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentConfig {
    pub eth_client: ETHClientConfig,
    pub l2_chain: L2ChainConfig,
    pub contracts: ContractsConfig,
    pub fee_params: FeeParamsConfig,
    pub deployer: L2DeployerConfig,
}

impl DeploymentConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.deployer.validate()?;
        self.fee_params.fee_params()?;
        if self.deployer.gas_limit_strategy != GasLimitStrategy::Static {
            anyhow::ensure!(
                self.l2_chain.l2_web3_url.is_some(),
                "L2 Web3 URL is required for the {:?} gas limit strategy",
                self.deployer.gas_limit_strategy
            );
        }
        Ok(())
    }

    pub fn for_tests() -> Self {
        Self {
            eth_client: ETHClientConfig::for_tests(),
            l2_chain: L2ChainConfig::for_tests(),
            contracts: ContractsConfig::for_tests(),
            fee_params: FeeParamsConfig::default(),
            deployer: L2DeployerConfig::for_tests(),
        }
    }
}
