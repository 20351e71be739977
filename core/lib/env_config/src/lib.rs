use anyhow::Context as _;
use serde::de::DeserializeOwned;
use zksync_config::DeploymentConfig;

mod chain;
mod contracts;
mod deployer;
mod eth_client;
mod observability;
#[cfg(test)]
mod test_utils;
mod wallets;

pub trait FromEnv: Sized {
    fn from_env() -> anyhow::Result<Self>;
}

/// Convenience function that loads the structure from the environment variable given the prefix.
pub fn envy_load<T: DeserializeOwned>(name: &str, prefix: &str) -> anyhow::Result<T> {
    envy::prefixed(prefix)
        .from_env()
        .with_context(|| format!("Cannot load config <{name}>"))
}

impl FromEnv for DeploymentConfig {
    fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            eth_client: FromEnv::from_env()?,
            l2_chain: FromEnv::from_env()?,
            contracts: FromEnv::from_env()?,
            fee_params: FromEnv::from_env()?,
            deployer: FromEnv::from_env()?,
        };
        config.validate().context("invalid deployment config")?;
        Ok(config)
    }
}
