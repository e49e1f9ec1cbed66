use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::BackendError;

/// Identifier of one computation run on the backend.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ComputationId(String);

/// Identifier of one structure (molecule) within a computation.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(transparent)]
pub struct StructureId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Wrap a raw identifier.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }

        impl From<String> for $ty {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ComputationId);
string_id!(StructureId);

/// Raw structure data handed to the viewer's loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructurePayload {
    /// Structure the payload was fetched for.
    pub structure_id: StructureId,
    /// Loader format hint (e.g. `"mmcif"`).
    pub format: String,
    /// File contents.
    pub data: Vec<u8>,
}

impl StructurePayload {
    /// Payload in mmCIF format.
    #[must_use]
    pub fn mmcif(structure_id: StructureId, data: Vec<u8>) -> Self {
        Self {
            structure_id,
            format: "mmcif".to_owned(),
            data,
        }
    }
}

/// Parsing switches applied to uploaded files before calculation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default)]
pub struct ComputationSettings {
    /// Read HETATM records from PDB/mmCIF files.
    pub read_hetatm: bool,
    /// Discard water molecules from PDB/mmCIF files.
    pub ignore_water: bool,
    /// Use relaxed atom typing rules.
    pub permissive_types: bool,
}

impl Default for ComputationSettings {
    fn default() -> Self {
        Self {
            read_hetatm: true,
            ignore_water: false,
            permissive_types: true,
        }
    }
}

/// One (method, parameters) pair requested from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChargeConfig {
    /// Charge method name; `None` lets the backend pick a suitable one.
    pub method: Option<String>,
    /// Parameter set name; `None` uses the method's default.
    pub parameters: Option<String>,
}

impl ChargeConfig {
    /// Label shown in charge-set selectors (`method/parameters`).
    #[must_use]
    pub fn label(&self) -> String {
        let method = self.method.as_deref().unwrap_or("auto");
        match self.parameters.as_deref() {
            Some(params) if !params.is_empty() => format!("{method}/{params}"),
            _ => method.to_owned(),
        }
    }
}

/// Response envelope wrapping every JSON body returned by the backend.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload or turn `success: false` into an API error.
    pub(crate) fn into_result(self) -> Result<T, BackendError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(BackendError::Decode(
                "successful response without data".to_owned(),
            )),
            (false, _) => Err(BackendError::Api(
                self.message
                    .unwrap_or_else(|| "request failed".to_owned()),
            )),
        }
    }
}

/// Body of `POST /charges/setup`.
#[derive(Debug, Serialize)]
pub(crate) struct SetupRequest<'a> {
    pub(crate) file_hashes: &'a [String],
    pub(crate) settings: &'a ComputationSettings,
}

/// Body of `POST /charges/calculate`.
#[derive(Debug, Serialize)]
pub(crate) struct CalculateRequest<'a> {
    pub(crate) file_hashes: &'a [String],
    pub(crate) configs: &'a [ChargeConfig],
    pub(crate) settings: &'a ComputationSettings,
}
