use serde::Deserialize;
use zksync_basic_types::Address;
use zksync_system_constants::{ETH_TOKEN_ADDRESS, PRIORITY_TX_MAX_GAS_LIMIT, PRIORITY_TX_MAX_PUBDATA};
pub use zksync_types::fee_model::PubdataPricingMode;
use zksync_types::fee_model::FeeParams;

/// L1 contracts of the ecosystem the deployment goes through.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ContractsConfig {
    pub bridgehub_proxy_addr: Address,
    /// Base token of the target chain; `0x..01` denotes ETH.
    #[serde(default = "ContractsConfig::default_base_token_addr")]
    pub base_token_addr: Address,
    /// Upper bound on the L2 gas limit of a priority transaction.
    #[serde(default = "ContractsConfig::default_priority_tx_max_gas_limit")]
    pub priority_tx_max_gas_limit: u64,
}

impl ContractsConfig {
    fn default_base_token_addr() -> Address {
        ETH_TOKEN_ADDRESS
    }

    const fn default_priority_tx_max_gas_limit() -> u64 {
        PRIORITY_TX_MAX_GAS_LIMIT
    }

    /// Checks whether the chain uses ETH as its base token.
    pub fn is_eth_based(&self) -> bool {
        self.base_token_addr == ETH_TOKEN_ADDRESS
    }

    pub fn for_tests() -> Self {
        Self {
            bridgehub_proxy_addr: Address::repeat_byte(0x44),
            base_token_addr: ETH_TOKEN_ADDRESS,
            priority_tx_max_gas_limit: PRIORITY_TX_MAX_GAS_LIMIT,
        }
    }
}

/// Fee parameters of the target chain, as configured in its diamond proxy.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeeParamsConfig {
    #[serde(default)]
    pub pubdata_pricing_mode: PubdataPricingMode,
    #[serde(default = "FeeParamsConfig::default_batch_overhead_l1_gas")]
    pub batch_overhead_l1_gas: u64,
    #[serde(default = "FeeParamsConfig::default_max_pubdata_per_batch")]
    pub max_pubdata_per_batch: u64,
    #[serde(default = "FeeParamsConfig::default_max_l2_gas_per_batch")]
    pub max_l2_gas_per_batch: u64,
    #[serde(default = "FeeParamsConfig::default_priority_tx_max_pubdata")]
    pub priority_tx_max_pubdata: u64,
    #[serde(default = "FeeParamsConfig::default_minimal_l2_gas_price")]
    pub minimal_l2_gas_price: u64,
    #[serde(default = "FeeParamsConfig::default_multiplier")]
    pub base_token_gas_price_multiplier_nominator: u64,
    #[serde(default = "FeeParamsConfig::default_multiplier")]
    pub base_token_gas_price_multiplier_denominator: u64,
}

impl Default for FeeParamsConfig {
    fn default() -> Self {
        Self {
            pubdata_pricing_mode: PubdataPricingMode::default(),
            batch_overhead_l1_gas: Self::default_batch_overhead_l1_gas(),
            max_pubdata_per_batch: Self::default_max_pubdata_per_batch(),
            max_l2_gas_per_batch: Self::default_max_l2_gas_per_batch(),
            priority_tx_max_pubdata: Self::default_priority_tx_max_pubdata(),
            minimal_l2_gas_price: Self::default_minimal_l2_gas_price(),
            base_token_gas_price_multiplier_nominator: Self::default_multiplier(),
            base_token_gas_price_multiplier_denominator: Self::default_multiplier(),
        }
    }
}

impl FeeParamsConfig {
    const fn default_batch_overhead_l1_gas() -> u64 {
        1_000_000
    }

    const fn default_max_pubdata_per_batch() -> u64 {
        120_000
    }

    const fn default_max_l2_gas_per_batch() -> u64 {
        80_000_000
    }

    const fn default_priority_tx_max_pubdata() -> u64 {
        PRIORITY_TX_MAX_PUBDATA
    }

    const fn default_minimal_l2_gas_price() -> u64 {
        250_000_000
    }

    const fn default_multiplier() -> u64 {
        1
    }

    /// Converts the config into fee params, checking that all divisors are non-zero.
    pub fn fee_params(&self) -> anyhow::Result<FeeParams> {
        anyhow::ensure!(
            self.max_pubdata_per_batch > 0,
            "`max_pubdata_per_batch` must be positive"
        );
        anyhow::ensure!(
            self.max_l2_gas_per_batch > 0,
            "`max_l2_gas_per_batch` must be positive"
        );
        anyhow::ensure!(
            self.base_token_gas_price_multiplier_denominator > 0,
            "`base_token_gas_price_multiplier_denominator` must be positive"
        );
        Ok(FeeParams {
            pubdata_pricing_mode: self.pubdata_pricing_mode,
            batch_overhead_l1_gas: self.batch_overhead_l1_gas,
            max_pubdata_per_batch: self.max_pubdata_per_batch,
            max_l2_gas_per_batch: self.max_l2_gas_per_batch,
            priority_tx_max_pubdata: self.priority_tx_max_pubdata,
            minimal_l2_gas_price: self.minimal_l2_gas_price,
            base_token_gas_price_multiplier_nominator: self
                .base_token_gas_price_multiplier_nominator,
            base_token_gas_price_multiplier_denominator: self
                .base_token_gas_price_multiplier_denominator,
        })
    }
}
