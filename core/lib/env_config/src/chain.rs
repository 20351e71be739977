use zksync_config::L2ChainConfig;

use crate::{envy_load, FromEnv};

impl FromEnv for L2ChainConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load("l2_chain", "CHAIN_ETH_")
    }
}
