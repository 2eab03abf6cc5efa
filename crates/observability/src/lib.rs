//! # Observability
//!
//! Logging and metrics plumbing for the dispatcher.
//!
//! - `tracing` subscriber in JSON, pretty or compact form, filtered by
//!   `RUST_LOG` (falling back to a configured directive)
//! - Optional Prometheus scrape endpoint for the `event_dispatcher_*` series
//!
//! Both can be driven from the environment:
//!
//! | Variable                   | Meaning                          |
//! |----------------------------|----------------------------------|
//! | `DISPATCHER_LOG_FORMAT`    | `json`, `pretty` or `compact`    |
//! | `DISPATCHER_METRICS_ADDR`  | e.g. `0.0.0.0:9000`; unset = off |
//!
//! ```ignore
//! observability::init()?;
//!
//! let dispatcher = Dispatcher::synchronous();
//! dispatcher.emit("tick", (1u64,));
//! ```

pub mod metrics;

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    describe_metrics, record_delivery, record_emit, record_handler_duration_ms,
    record_handler_panic, record_listener_count, record_skipped,
};

const LOG_FORMAT_ENV: &str = "DISPATCHER_LOG_FORMAT";
const METRICS_ADDR_ENV: &str = "DISPATCHER_METRICS_ADDR";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, with thread and source location
    Json,
    #[default]
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(anyhow!("unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset
    pub default_directive: String,
    /// Prometheus listen address (None = no exporter)
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            default_directive: "info".to_string(),
            metrics_addr: None,
        }
    }
}

impl ObservabilityConfig {
    /// Defaults overridden by `DISPATCHER_LOG_FORMAT` and
    /// `DISPATCHER_METRICS_ADDR`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            config.log_format = format
                .parse::<LogFormat>()
                .with_context(|| format!("invalid {LOG_FORMAT_ENV}"))?;
        }
        if let Some(addr) = lookup(METRICS_ADDR_ENV) {
            let addr = addr
                .parse::<SocketAddr>()
                .with_context(|| format!("invalid {METRICS_ADDR_ENV}: {addr}"))?;
            config.metrics_addr = Some(addr);
        }
        Ok(config)
    }
}

/// Initialise from the environment
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::from_env()?)
}

/// Install the global subscriber and, if configured, the Prometheus exporter.
///
/// Fails if a global subscriber is already set.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_directive))
        .with_context(|| format!("invalid log directive: {}", config.default_directive))?;

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().with_thread_names(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("tracing subscriber already installed")?;

    if let Some(addr) = config.metrics_addr {
        install_prometheus(addr)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        metrics_addr = ?config.metrics_addr,
        "Observability initialized"
    );
    Ok(())
}

/// Install only the Prometheus recorder, serving scrapes on `addr`
pub fn install_prometheus(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .with_context(|| format!("failed to start Prometheus exporter on {addr}"))?;
    describe_metrics();

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.default_directive, "info");
        assert_eq!(config.metrics_addr, None);
    }

    #[test]
    fn test_config_from_env_vars() {
        let config = ObservabilityConfig::from_lookup(lookup(&[
            (LOG_FORMAT_ENV, "JSON"),
            (METRICS_ADDR_ENV, "127.0.0.1:9100"),
        ]))
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9100".parse().unwrap()));
    }

    #[test]
    fn test_invalid_env_vars() {
        let err = ObservabilityConfig::from_lookup(lookup(&[(LOG_FORMAT_ENV, "xml")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("unknown log format"), "got: {err:#}");

        let err = ObservabilityConfig::from_lookup(lookup(&[(METRICS_ADDR_ENV, "9000")]))
            .unwrap_err();
        assert!(err.to_string().contains(METRICS_ADDR_ENV), "got: {err}");
    }

    #[test]
    fn test_second_init_fails() {
        let config = ObservabilityConfig {
            log_format: LogFormat::Compact,
            ..Default::default()
        };
        // no other test in this crate installs a subscriber
        init_with_config(config.clone()).unwrap();
        let err = init_with_config(config).unwrap_err();
        assert!(err.to_string().contains("already installed"), "got: {err}");
    }
}
