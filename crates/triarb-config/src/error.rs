use thiserror::Error;

/// Configuration errors: missing keys, malformed JSON, or an unknown base
/// asset. All fatal at startup (spec error kind 1).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("INVESTMENT.MIN ({min}) must be <= INVESTMENT.MAX ({max})")]
    InvalidGrid { min: String, max: String },

    #[error("INVESTMENT.STEP must be positive, got {0}")]
    NonPositiveStep(String),

    #[error("DEPTH.SIZE must be positive, got {0}")]
    NonPositiveDepth(i64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
