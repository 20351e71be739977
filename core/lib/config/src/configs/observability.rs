use serde::Deserialize;

/// Configuration for the essential observability stack.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ObservabilityConfig {
    /// Format of the logs as expected by the `vlog` crate.
    /// Currently must be either `plain` or `json`.
    #[serde(default = "ObservabilityConfig::default_log_format")]
    pub log_format: String,
    /// Log directives in format that is used in `RUST_LOG`. If not set, `RUST_LOG` is used.
    #[serde(default)]
    pub log_directives: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: Self::default_log_format(),
            log_directives: None,
        }
    }
}

impl ObservabilityConfig {
    fn default_log_format() -> String {
        "plain".to_owned()
    }
}
