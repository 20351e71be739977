use zksync_config::{ContractsConfig, FeeParamsConfig};

use crate::{envy_load, FromEnv};

impl FromEnv for ContractsConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load("contracts", "CONTRACTS_")
    }
}

impl FromEnv for FeeParamsConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load("fee_params", "CONTRACTS_FEE_PARAMS_")
    }
}
