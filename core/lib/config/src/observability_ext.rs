//! Extensions for the `ObservabilityConfig` to install the observability stack.

use crate::configs::ObservabilityConfig;

impl ObservabilityConfig {
    /// Installs the observability stack based on the configuration.
    pub fn install(self) -> anyhow::Result<zksync_vlog::ObservabilityGuard> {
        let logs = zksync_vlog::Logs::try_from(self.clone())?;
        let guard = zksync_vlog::ObservabilityBuilder::new()
            .with_logs(Some(logs))
            .try_build()?;
        tracing::info!("Installed observability stack with the following configuration: {self:?}");
        Ok(guard)
    }
}

impl TryFrom<ObservabilityConfig> for zksync_vlog::Logs {
    type Error = anyhow::Error;

    fn try_from(config: ObservabilityConfig) -> Result<Self, Self::Error> {
        Ok(zksync_vlog::Logs::new(&config.log_format)?
            .with_log_directives(config.log_directives))
    }
}
