use thiserror::Error;

use crate::parse::ParseError;
use crate::{CompileError, EvalError, TableError};

/// Unified error type covering parsing, compilation, evaluation and I/O.
///
/// Returned by convenience methods like [`Feature::from_text()`](crate::Feature::from_text)
/// and [`EngineConfig::load()`](crate::EngineConfig::load).
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
