//! # Config Loader
//!
//! Reads a [`DispatcherConfig`] from a `.toml` or `.json` file, applies
//! `DISPATCHER_*` environment overrides, and validates the result.
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//!
//! let config = ConfigLoader::load_from_path("dispatcher.toml").unwrap();
//! println!("invocation: {:?}", config.invocation);
//! ```
//!
//! | Variable                           | Overrides                 |
//! |------------------------------------|---------------------------|
//! | `DISPATCHER_INVOCATION`            | `invocation`              |
//! | `DISPATCHER_LISTENER_WARN_THRESHOLD` | `listener_warn_threshold` |

mod parser;
mod validator;

use std::path::Path;

use contracts::{ContractError, InvocationMode};

pub use contracts::DispatcherConfig;
pub use parser::ConfigFormat;

const INVOCATION_ENV: &str = "DISPATCHER_INVOCATION";
const WARN_THRESHOLD_ENV: &str = "DISPATCHER_LISTENER_WARN_THRESHOLD";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, override from the environment, and validate.
    ///
    /// The format follows the file extension.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<DispatcherConfig, ContractError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let mut config = parser::parse(&content, format)?;
        apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Like [`load_from_path`](Self::load_from_path), but a missing path
    /// yields the defaults (still subject to environment overrides).
    pub fn load_or_default(path: Option<&Path>) -> Result<DispatcherConfig, ContractError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let mut config = DispatcherConfig::default();
                apply_overrides(&mut config, |key| std::env::var(key).ok())?;
                validator::validate(&config)?;
                Ok(config)
            }
        }
    }

    /// Parse and validate in-memory content. No environment overrides.
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<DispatcherConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    pub fn to_toml(config: &DispatcherConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config).map_err(|e| ContractError::ConfigParse {
            message: format!("cannot render config as TOML: {e}"),
            source: Some(Box::new(e)),
        })
    }

    pub fn to_json(config: &DispatcherConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config).map_err(|e| ContractError::ConfigParse {
            message: format!("cannot render config as JSON: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

fn apply_overrides(
    config: &mut DispatcherConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ContractError> {
    if let Some(mode) = lookup(INVOCATION_ENV) {
        config.invocation = match mode.trim().to_ascii_lowercase().as_str() {
            "detached" => InvocationMode::Detached,
            "synchronous" => InvocationMode::Synchronous,
            other => {
                return Err(ContractError::config_validation(
                    INVOCATION_ENV,
                    format!("expected `detached` or `synchronous`, got `{other}`"),
                ))
            }
        };
    }
    if let Some(threshold) = lookup(WARN_THRESHOLD_ENV) {
        let threshold = threshold.trim().parse::<usize>().map_err(|e| {
            ContractError::config_validation(WARN_THRESHOLD_ENV, format!("not a count: {e}"))
        })?;
        config.listener_warn_threshold = Some(threshold);
    }
    Ok(())
}
