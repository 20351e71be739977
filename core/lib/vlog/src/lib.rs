//! This crate contains the observability subsystem.
//! It is responsible for providing a centralized interface for consistent observability configuration.

use anyhow::Context as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::logs::{LogFormat, LogFormatError, Logs};

pub mod logs;

/// Builder for the observability subsystem.
/// Currently capable of configuring logging output.
#[derive(Debug, Default)]
pub struct ObservabilityBuilder {
    logs: Option<Logs>,
}

/// Guard for the observability subsystem.
/// Flushes pending output upon being dropped.
#[derive(Debug)]
#[must_use = "Observability is torn down when the guard is dropped"]
pub struct ObservabilityGuard {
    log_format: LogFormat,
}

impl ObservabilityGuard {
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        use std::io::Write as _;

        // Logs are written to stderr, command output to stdout.
        std::io::stderr().flush().ok();
        std::io::stdout().flush().ok();
    }
}

impl ObservabilityBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logs(mut self, logs: Option<Logs>) -> Self {
        self.logs = logs;
        self
    }

    pub fn with_log_format(self, format: LogFormat) -> Self {
        self.with_logs(Some(format.into()))
    }

    /// Tries to initialize the observability subsystem. Returns an error if it's already initialized.
    /// This is mostly useful in tests.
    pub fn try_build(self) -> anyhow::Result<ObservabilityGuard> {
        let logs = self.logs.unwrap_or_default();
        logs.install_panic_hook();

        let log_format = logs.format();
        let global_filter = logs.build_filter();
        let logs_layer = logs.into_layer();

        tracing_subscriber::registry()
            .with(global_filter)
            .with(logs_layer)
            .try_init()
            .context("failed installing global tracer / logger")?;

        Ok(ObservabilityGuard { log_format })
    }

    /// Initializes the observability subsystem.
    pub fn build(self) -> ObservabilityGuard {
        self.try_build().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observability_can_only_be_installed_once() {
        let first = ObservabilityBuilder::new()
            .with_log_format(LogFormat::Json)
            .try_build();
        tracing::info_span!("test").in_scope(|| {
            tracing::info!("This is a log");
        });

        let err = ObservabilityBuilder::new().try_build().unwrap_err();
        assert!(err.to_string().contains("failed installing"), "{err}");
        if let Ok(guard) = first {
            assert_eq!(guard.log_format(), LogFormat::Json);
        }
    }
}
