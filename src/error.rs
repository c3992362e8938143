use thiserror::Error;

use crate::parse::ParseError;

/// Unified error type covering parsing, JSON interchange, and I/O.
///
/// Returned by convenience loaders like [`QueryConfig::from_file()`](crate::QueryConfig::from_file)
/// and [`RuleSet::from_json()`](crate::RuleSet::from_json).
#[derive(Debug, Error)]
pub enum BqlError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
