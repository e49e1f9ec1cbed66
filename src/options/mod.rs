//! Results-view configuration with TOML file support.
//!
//! Backend location and the view's initial control values live here.
//! Options serialize to/from TOML; the JSON schema is exposed for settings
//! UIs.

mod backend;
mod view;

use std::path::Path;

pub use backend::BackendOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use view::ViewOptions;

use crate::error::ChargeViewError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[view]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Charge-calculation service.
    pub backend: BackendOptions,
    /// Initial controls and load limits.
    pub view: ViewOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ChargeViewError> {
        let content =
            std::fs::read_to_string(path).map_err(ChargeViewError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse options from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ChargeViewError> {
        toml::from_str(content)
            .map_err(|e| ChargeViewError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ChargeViewError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ChargeViewError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ChargeViewError::Io)?;
        }
        std::fs::write(path, content).map_err(ChargeViewError::Io)
    }
}
