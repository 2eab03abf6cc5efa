//! Configuration validation
//!
//! Rules:
//! - listener_warn_threshold, when set, is > 0

use contracts::{ContractError, DispatcherConfig};

/// Validate a DispatcherConfig
///
/// Returns the first error found, or Ok(()).
pub fn validate(config: &DispatcherConfig) -> Result<(), ContractError> {
    validate_warn_threshold(config)?;
    Ok(())
}

fn validate_warn_threshold(config: &DispatcherConfig) -> Result<(), ContractError> {
    if config.listener_warn_threshold == Some(0) {
        return Err(ContractError::config_validation(
            "listener_warn_threshold",
            "listener_warn_threshold must be > 0 when set",
        ));
    }
    Ok(())
}
