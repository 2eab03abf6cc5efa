//! Format detection and deserialization of `DispatcherConfig`

use std::path::Path;

use contracts::{ContractError, DispatcherConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Case-insensitive match on a bare extension (`"toml"`, `"JSON"`)
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse(format!("{} has no file extension", path.display()))
        })?;
        Self::from_extension(ext)
            .ok_or_else(|| ContractError::config_parse(format!("unsupported config format: .{ext}")))
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

pub fn parse_toml(content: &str) -> Result<DispatcherConfig, ContractError> {
    toml::from_str(content).map_err(|e| parse_error(ConfigFormat::Toml, e))
}

pub fn parse_json(content: &str) -> Result<DispatcherConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| parse_error(ConfigFormat::Json, e))
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<DispatcherConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

fn parse_error<E>(format: ConfigFormat, err: E) -> ContractError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ContractError::ConfigParse {
        message: format!("{} parse error: {err}", format.name()),
        source: Some(Box::new(err)),
    }
}
