use zksync_config::ObservabilityConfig;

use crate::{envy_load, FromEnv};

impl FromEnv for ObservabilityConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load("observability", "MISC_")
    }
}
