use std::path::PathBuf;

use thiserror::Error;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    TomlDeError(#[from] toml::de::Error),
    #[error("unable to serialize config: {0}")]
    TomlSeError(#[from] toml::ser::Error),
    #[error("api.base_url {url:?} is not a valid url: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("no config file at {0}")]
    ConfigNotFound(PathBuf),
}
