use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] orbis_core::Error),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config field `{field}` must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("body `{name}` has invalid steps: {source}")]
    Body {
        name: String,
        source: orbis_core::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
