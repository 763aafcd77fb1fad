use thiserror::Error;

/// Errors surfaced by an [`crate::ExchangeClient`] implementation.
///
/// `Transient` is expected to be retried with bounded backoff by the
/// caller and logged at debug; it should never propagate past the worker
/// that issued the call. Everything else is a hard failure of the
/// specific operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("transient network error: {0}")]
    Transient(String),

    #[error("order {0} not found (yet)")]
    OrderNotFound(String),

    #[error("symbol {0} is not known to the exchange")]
    UnknownSymbol(String),

    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("exchange returned an unexpected status for order {0}: {1}")]
    UnknownStatus(String, String),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
