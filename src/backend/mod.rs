//! Backend computation service: the REST API that runs charge calculations
//! and serves per-molecule structure data.
//!
//! The coordinator only depends on the [`ComputationService`] trait. The
//! HTTP implementation lives behind the `http` feature.

#[cfg(feature = "http")]
mod http;
mod types;

use std::fmt;

#[cfg(feature = "http")]
pub use http::HttpBackend;
pub use types::{
    ChargeConfig, ComputationId, ComputationSettings, StructureId,
    StructurePayload,
};

/// Errors produced while talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Connection, TLS or I/O failure before a response arrived.
    Transport(String),
    /// Non-success HTTP status.
    Status(u16),
    /// The backend answered with `success: false`.
    Api(String),
    /// Response body could not be decoded.
    Decode(String),
    /// The blocking request task failed to complete.
    Task(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport failure: {msg}"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Api(msg) => f.write_str(msg),
            Self::Decode(msg) => write!(f, "malformed response: {msg}"),
            Self::Task(msg) => write!(f, "request task failed: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// Consumed interface of the charge computation backend.
///
/// Calls may resolve in any order; callers must not assume the response
/// to an earlier request arrives first.
#[allow(async_fn_in_trait)]
pub trait ComputationService {
    /// Register uploaded files and start a calculation.
    async fn create_computation(
        &self,
        file_refs: &[String],
        configs: &[ChargeConfig],
        settings: &ComputationSettings,
    ) -> Result<ComputationId, BackendError>;

    /// Structures contained in a finished computation, in backend order.
    async fn list_molecules(
        &self,
        computation: &ComputationId,
    ) -> Result<Vec<StructureId>, BackendError>;

    /// Structure data (with charges) for one molecule of a computation.
    async fn get_structure(
        &self,
        computation: &ComputationId,
        structure: &StructureId,
    ) -> Result<StructurePayload, BackendError>;
}
