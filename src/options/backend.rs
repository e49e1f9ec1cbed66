use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the charge-calculation service lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Backend", inline)]
#[serde(default)]
pub struct BackendOptions {
    /// API root, without a trailing slash.
    #[schemars(title = "Base URL")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[schemars(title = "Request Timeout", range(min = 1, max = 600))]
    pub timeout_secs: u64,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_owned(),
            timeout_secs: 30,
        }
    }
}
