use zksync_config::ETHClientConfig;

use crate::{envy_load, FromEnv};

impl FromEnv for ETHClientConfig {
    fn from_env() -> anyhow::Result<Self> {
        let config: Self = envy_load("eth_client", "ETH_CLIENT_")?;
        if config.web3_url.find(',').is_some() {
            anyhow::bail!(
                "Multiple web3 URLs aren't supported. Provided invalid value: {}",
                config.web3_url
            );
        }
        Ok(config)
    }
}
