use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "STRATUS_CONFIG points to a file that does not exist: {0}\n\
        Unset it to fall back to ./stratus.yaml or the global config directory"
    )]
    ConfigFileNotFound(PathBuf),

    #[error("failed parsing config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
