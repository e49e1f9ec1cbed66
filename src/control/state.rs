use rustc_hash::FxHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::mode::{ColoringMode, RenderStyle};
use crate::backend::StructureId;

/// Charge-set index selected after every structure load (1-based).
pub const DEFAULT_CHARGE_SET: usize = 1;

/// Where the coordinator is in a structure-load cycle.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum LoadPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A structure fetch or engine load is outstanding.
    Loading,
    /// A structure is loaded and cosmetic controls are live.
    Ready,
    /// The last load failed; only retry or navigation is offered.
    Error,
}

/// Snapshot of every user-facing control plus derived read-only data.
///
/// Values here are what the engine is actually displaying. The only
/// optimistic field is [`max_value`](Self::max_value), which tracks the
/// last user input and is rolled back if the engine rejects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlState {
    /// Load-cycle phase.
    pub phase: LoadPhase,
    /// Structures offered by the computation, in backend order.
    pub structures: Vec<StructureId>,
    /// Structure currently shown by the engine.
    pub structure_id: Option<StructureId>,
    /// Structure whose load is outstanding, if any.
    pub loading_structure: Option<StructureId>,
    /// Selected charge set (1-based index into `method_names`).
    pub charge_set_index: usize,
    /// Active coloring mode.
    pub coloring_mode: ColoringMode,
    /// Upper bound of the absolute coloring scale.
    pub max_value: f64,
    /// Active render style.
    pub render_style: RenderStyle,
    /// Charge method names of the loaded structure, `None` until loaded.
    pub method_names: Option<Vec<String>>,
    /// Max absolute charge reported by the engine, per loaded structure.
    pub max_charge_by_structure: FxHashMap<StructureId, f64>,
    /// Whether the engine can show the cartoon representation.
    pub cartoon_available: bool,
}

impl ControlState {
    /// Fresh state for a newly mounted results view.
    #[must_use]
    pub fn initial(
        coloring_mode: ColoringMode,
        render_style: RenderStyle,
    ) -> Self {
        Self {
            phase: LoadPhase::Idle,
            structures: Vec::new(),
            structure_id: None,
            loading_structure: None,
            charge_set_index: DEFAULT_CHARGE_SET,
            coloring_mode,
            max_value: 0.0,
            render_style,
            method_names: None,
            max_charge_by_structure: FxHashMap::default(),
            cartoon_available: false,
        }
    }

    /// Whether cosmetic controls can talk to the engine right now.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }

    /// Max charge of the structure currently shown.
    #[must_use]
    pub fn current_max_charge(&self) -> Option<f64> {
        let id = self.structure_id.as_ref()?;
        self.max_charge_by_structure.get(id).copied()
    }

    /// Number of charge sets available on the loaded structure.
    #[must_use]
    pub fn charge_set_count(&self) -> usize {
        self.method_names.as_ref().map_or(0, Vec::len)
    }

    /// Method name for a 1-based charge-set index.
    #[must_use]
    pub fn method_name(&self, index: usize) -> Option<&str> {
        let names = self.method_names.as_ref()?;
        names.get(index.checked_sub(1)?).map(String::as_str)
    }

    /// Whether the charge-set selector is usable.
    #[must_use]
    pub fn charge_set_enabled(&self) -> bool {
        self.is_ready() && self.charge_set_count() > 0
    }

    /// Whether `structures` includes `id` (always true before listing).
    #[must_use]
    pub fn offers_structure(&self, id: &StructureId) -> bool {
        self.structures.is_empty() || self.structures.contains(id)
    }
}
