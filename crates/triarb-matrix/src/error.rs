use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("symbol {0} is not registered in the matrix")]
    UnknownSymbol(String),

    #[error("cycle {0} is not registered in the matrix")]
    UnknownCycle(String),

    #[error("cannot register cycle {cycle}: symbol {symbol} was never created")]
    CycleSymbolNotRegistered { cycle: String, symbol: String },
}

pub type Result<T> = std::result::Result<T, MatrixError>;
