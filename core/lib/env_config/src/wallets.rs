use serde::Deserialize;
use zksync_basic_types::{Address, H256};
use zksync_config::Wallet;

use crate::{envy_load, FromEnv};

#[derive(Debug, Deserialize)]
struct DeployerWalletEnv {
    private_key: H256,
    #[serde(default)]
    address: Option<Address>,
}

impl FromEnv for Wallet {
    /// Loads the deployer wallet from `DEPLOYER_PRIVATE_KEY` and (optionally) `DEPLOYER_ADDRESS`.
    fn from_env() -> anyhow::Result<Self> {
        let env: DeployerWalletEnv = envy_load("deployer_wallet", "DEPLOYER_")?;
        Wallet::from_private_key_bytes(env.private_key, env.address)
    }
}
