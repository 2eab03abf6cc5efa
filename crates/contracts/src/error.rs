//! Errors raised while obtaining a `DispatcherConfig`

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    /// Content could not be read as the expected format
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Content parsed but a field holds an unusable value
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}
