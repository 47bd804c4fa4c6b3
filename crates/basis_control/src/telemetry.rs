//! Tracing subscriber setup.
//!
//! Controllers log through `tracing` and never install a subscriber
//! themselves. Applications that want output call [`TracingConfig::init`]
//! once at startup.
//!
//! # Example
//!
//! ```
//! use basis_control::telemetry::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! // Development: pretty output with span enter/exit events
//! TracingConfig::new()
//!     .with_level(Level::DEBUG)
//!     .with_span_events(true)
//!     .init();
//!
//! // Production: JSON for log aggregation, controller cycles at debug
//! let _prod = TracingConfig::new()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("basis_control=debug,basis_resource=warn");
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

/// Subscriber configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Maximum log level, used when no filter string is set.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Environment filter, e.g. `basis_control=debug,basis_resource=warn`.
    pub env_filter: Option<String>,
    /// Whether to include span enter/exit events.
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a filter string of the form `target=level,target=level,...`.
    ///
    /// An unparsable filter falls back to the configured level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Does nothing if a global subscriber is already installed.
    pub fn init(&self) {
        let env_filter = self.filter();
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        let installed = match self.format {
            TracingFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Compact => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init(),
        };

        if installed.is_ok() {
            tracing::info!(level = %self.level, format = ?self.format, "tracing initialized");
        }
    }
}
