use zksync_config::L2DeployerConfig;

use crate::{envy_load, FromEnv};

impl FromEnv for L2DeployerConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load("l2_deployer", "L2_DEPLOYER_")
    }
}
