use std::fmt;
use std::time::Duration;

use crate::backend::{BackendError, StructureId};
use crate::viewer::EngineError;

/// Why a structure load failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCause {
    /// Listing molecules or fetching structure data failed.
    Backend(BackendError),
    /// The engine rejected the structure.
    Engine(EngineError),
    /// Fetch plus load did not finish within the configured limit.
    Timeout(Duration),
}

impl fmt::Display for LoadCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(e) => write!(f, "{e}"),
            Self::Engine(e) => write!(f, "{e}"),
            Self::Timeout(limit) => {
                write!(f, "timed out after {} ms", limit.as_millis())
            }
        }
    }
}

/// A structure (or the molecule list) could not be shown.
///
/// Fatal to the current structure: the view offers retry or navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// Structure that failed, `None` when listing the molecules failed.
    pub structure_id: Option<StructureId>,
    /// Underlying cause.
    pub cause: LoadCause,
}

impl LoadFailure {
    pub(crate) fn new(
        structure_id: Option<StructureId>,
        cause: LoadCause,
    ) -> Self {
        Self {
            structure_id,
            cause,
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.structure_id {
            Some(id) => {
                write!(f, "unable to load structure {id}: {}", self.cause)
            }
            None => {
                write!(f, "unable to load computation data: {}", self.cause)
            }
        }
    }
}

impl std::error::Error for LoadFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            LoadCause::Backend(e) => Some(e),
            LoadCause::Engine(e) => Some(e),
            LoadCause::Timeout(_) => None,
        }
    }
}

/// Errors returned from coordinator intents.
///
/// Everything except [`Load`](Self::Load) is a rejection at the intent
/// boundary: nothing was issued and no state changed.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    /// The structure is not part of the computation.
    UnknownStructure(StructureId),
    /// Charge-set index outside `1..=available`.
    InvalidChargeSet {
        /// Rejected index.
        index: usize,
        /// Number of charge sets on the loaded structure.
        available: usize,
    },
    /// Max value is NaN or infinite.
    InvalidMaxValue(f64),
    /// The control needs a loaded structure.
    NotReady,
    /// The loaded structure cannot show this style.
    StyleUnavailable(crate::control::RenderStyle),
    /// No failed load to retry.
    NothingToRetry,
    /// A structure load failed.
    Load(LoadFailure),
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStructure(id) => {
                write!(f, "structure {id} is not part of this computation")
            }
            Self::InvalidChargeSet { index, available } => write!(
                f,
                "charge set {index} is out of range (1..={available})"
            ),
            Self::InvalidMaxValue(v) => write!(f, "invalid max value {v}"),
            Self::NotReady => f.write_str("no structure loaded yet"),
            Self::StyleUnavailable(style) => {
                write!(
                    f,
                    "{} is not available for this structure",
                    style.label()
                )
            }
            Self::NothingToRetry => f.write_str("nothing to retry"),
            Self::Load(failure) => write!(f, "{failure}"),
        }
    }
}

impl std::error::Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<LoadFailure> for CoordinatorError {
    fn from(failure: LoadFailure) -> Self {
        Self::Load(failure)
    }
}
