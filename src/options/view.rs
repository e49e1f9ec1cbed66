use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::control::{ColoringMode, RenderStyle};

/// Initial control values and load limits of a results view.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[schemars(title = "View", inline)]
#[serde(default)]
pub struct ViewOptions {
    /// Coloring applied after the first structure loads.
    #[schemars(title = "Initial Coloring")]
    pub initial_coloring: ColoringMode,
    /// Render style applied after the first structure loads.
    #[schemars(title = "Initial Style")]
    pub initial_style: RenderStyle,
    /// Upper bound on structure fetch plus engine load, 0 for none.
    #[schemars(title = "Load Timeout (ms)", range(min = 0, max = 600_000))]
    pub load_timeout_ms: u64,
}

impl ViewOptions {
    /// Load timeout, `None` when unbounded.
    #[must_use]
    pub fn load_timeout(&self) -> Option<Duration> {
        (self.load_timeout_ms > 0)
            .then(|| Duration::from_millis(self.load_timeout_ms))
    }
}
