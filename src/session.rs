//! One viewer handle bound to one computation.

use crate::backend::ComputationId;
use crate::viewer::ViewerHandle;

/// A live results view: the engine session showing one computation.
///
/// Built once per computation id and never shared across ids. Switching
/// computations means building a new session and handing it to
/// [`ResultsCoordinator::replace_session`].
///
/// [`ResultsCoordinator::replace_session`]:
///     crate::coordinator::ResultsCoordinator::replace_session
#[derive(Debug)]
pub struct Session<V> {
    computation_id: ComputationId,
    viewer: V,
}

impl<V: ViewerHandle> Session<V> {
    /// Bind a fresh viewer to a computation.
    pub fn new(computation_id: ComputationId, viewer: V) -> Self {
        Self {
            computation_id,
            viewer,
        }
    }

    /// Computation this session shows.
    #[must_use]
    pub fn computation_id(&self) -> &ComputationId {
        &self.computation_id
    }

    /// The engine session. Only the coordinator issues calls on it; widgets
    /// read published control state instead.
    pub(crate) fn viewer(&self) -> &V {
        &self.viewer
    }
}
