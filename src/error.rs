//! Crate-level error types.

use std::fmt;

use crate::backend::BackendError;
use crate::coordinator::CoordinatorError;
use crate::viewer::EngineError;

/// Errors produced by the chargeview crate.
#[derive(Debug)]
pub enum ChargeViewError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Backend computation service failure.
    Backend(BackendError),
    /// Visualization engine failure.
    Engine(EngineError),
    /// Results coordinator failure (rejected intent or failed load).
    Coordinator(CoordinatorError),
}

impl fmt::Display for ChargeViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Backend(e) => write!(f, "backend error: {e}"),
            Self::Engine(e) => write!(f, "engine error: {e}"),
            Self::Coordinator(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ChargeViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Backend(e) => Some(e),
            Self::Engine(e) => Some(e),
            Self::Coordinator(e) => Some(e),
            Self::OptionsParse(_) => None,
        }
    }
}

impl From<std::io::Error> for ChargeViewError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<BackendError> for ChargeViewError {
    fn from(e: BackendError) -> Self {
        Self::Backend(e)
    }
}

impl From<EngineError> for ChargeViewError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<CoordinatorError> for ChargeViewError {
    fn from(e: CoordinatorError) -> Self {
        Self::Coordinator(e)
    }
}
