use std::{env, str::FromStr};

use tracing::Subscriber;
use tracing_subscriber::{filter::LevelFilter, fmt, registry::LookupSpan, EnvFilter, Layer};

/// Specifies the format of the logs in stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid log format `{0}`, expected `plain` or `json`")]
pub struct LogFormatError(String);

impl FromStr for LogFormat {
    type Err = LogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            _ => Err(LogFormatError(s.to_owned())),
        }
    }
}

/// Logs configuration. Logs are written to stderr; stdout is reserved for command output.
#[derive(Debug, Default)]
pub struct Logs {
    format: LogFormat,
    log_directives: Option<String>,
}

impl From<LogFormat> for Logs {
    fn from(format: LogFormat) -> Self {
        Self {
            format,
            log_directives: None,
        }
    }
}

impl Logs {
    pub fn new(format: &str) -> Result<Self, LogFormatError> {
        Ok(LogFormat::from_str(format)?.into())
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Overrides log directives. If not set, directives are read from `RUST_LOG`.
    pub fn with_log_directives(mut self, log_directives: Option<String>) -> Self {
        self.log_directives = log_directives;
        self
    }

    pub(super) fn build_filter(&self) -> EnvFilter {
        let directives = self
            .log_directives
            .clone()
            .or_else(|| env::var(EnvFilter::DEFAULT_ENV).ok())
            .unwrap_or_default();
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .parse_lossy(directives)
    }

    pub(super) fn into_layer<S>(self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let layer = fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_target(true);
        match self.format {
            LogFormat::Plain => layer.boxed(),
            LogFormat::Json => layer
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .boxed(),
        }
    }

    /// Routes panic messages through `tracing` when JSON logs are used, so that they are not
    /// interleaved with structured output as raw text.
    pub(super) fn install_panic_hook(&self) {
        if self.format != LogFormat::Json {
            return;
        }
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(panic = %info, "Process panicked");
            default_hook(info);
        }));
    }
}
