//! Visualization engine boundary.
//!
//! [`ViewerHandle`] is the opaque, stateful engine session the coordinator
//! drives. Handles do no queuing of their own: concurrent calls are the
//! coordinator's problem.

mod cif;
mod headless;

use std::fmt;

pub use headless::{Appearance, HeadlessViewer};

use crate::backend::StructurePayload;

/// Errors reported by a visualization engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Operation needs a loaded structure.
    NotLoaded,
    /// The loader could not read the payload.
    InvalidPayload(String),
    /// The loaded structure does not support the operation.
    Unsupported(&'static str),
    /// Index or value outside the accepted range.
    OutOfRange(String),
    /// The engine refused the call for an engine-specific reason.
    Rejected(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => f.write_str("no structure loaded"),
            Self::InvalidPayload(msg) => {
                write!(f, "unreadable structure payload: {msg}")
            }
            Self::Unsupported(what) => {
                write!(f, "{what} is not supported by this structure")
            }
            Self::OutOfRange(msg) => write!(f, "out of range: {msg}"),
            Self::Rejected(msg) => write!(f, "engine rejected call: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// One live visualization-engine session.
///
/// Loading a structure resets all cosmetic state (coloring, style) to the
/// engine default; callers re-apply their settings after every load.
#[allow(async_fn_in_trait)]
pub trait ViewerHandle {
    /// Load a structure, replacing whatever was shown.
    async fn load(&self, payload: &StructurePayload) -> Result<(), EngineError>;

    /// Select the active charge set (1-based).
    fn select_charge_set(&self, index: usize) -> Result<(), EngineError>;

    /// Engine default coloring.
    async fn color_default(&self) -> Result<(), EngineError>;

    /// Charge coloring on a per-structure automatic scale.
    async fn color_relative(&self) -> Result<(), EngineError>;

    /// Charge coloring on a fixed `[-max_value, max_value]` scale.
    async fn color_absolute(&self, max_value: f64) -> Result<(), EngineError>;

    /// Balls-and-sticks representation.
    async fn set_style_ball_and_stick(&self) -> Result<(), EngineError>;

    /// Molecular surface representation.
    async fn set_style_surface(&self) -> Result<(), EngineError>;

    /// Engine default (cartoon) representation.
    async fn set_style_default(&self) -> Result<(), EngineError>;

    /// Whether the default representation applies to the loaded structure.
    fn is_default_style_applicable(&self) -> bool;

    /// Max absolute charge over every charge set of the loaded structure.
    fn max_charge(&self) -> f64;

    /// Charge method names of the loaded structure, by charge-set order.
    fn method_names(&self) -> Vec<String>;
}
