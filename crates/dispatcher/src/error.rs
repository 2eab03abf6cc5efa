//! Dispatcher error types

use thiserror::Error;

/// Dispatcher construction errors
///
/// Registration, emission and removal never fail; these only arise
/// while building a dispatcher.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Detached invocation needs a tokio runtime to launch handlers on
    #[error("detached invocation requires a tokio runtime: {message}")]
    NoRuntime { message: String },

    /// Configuration error (from contract)
    #[error("config error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a missing-runtime error
    pub fn no_runtime(message: impl Into<String>) -> Self {
        Self::NoRuntime {
            message: message.into(),
        }
    }
}
