use thiserror::Error;

use triarb_core::Asset;

/// Catalogue errors: fatal at startup, surfaced by
/// whatever builds the pair list the engine hands to [`crate::try_build`].
#[derive(Error, Debug, Clone)]
pub enum TopologyError {
    #[error("symbol {0} has no LOT_SIZE filter, cannot build a trading pair")]
    MissingLotSize(String),

    #[error("no triangular cycles found for base asset {0}")]
    NoCyclesFound(Asset),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
