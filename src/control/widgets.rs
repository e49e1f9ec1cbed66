//! Per-widget view models derived from [`ControlState`].
//!
//! Pure functions of the published snapshot; a UI renders these and sends
//! [`UiAction`](super::UiAction)s back.

use serde::Serialize;

use super::mode::{ColoringMode, RenderStyle};
use super::state::ControlState;
use crate::backend::StructureId;
use crate::coordinator::LoadFailure;

/// Step of the max-value number input.
pub const MAX_VALUE_STEP: f64 = 0.01;

/// One entry of a select widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption<T> {
    /// Value sent back when chosen.
    pub value: T,
    /// Display text.
    pub label: String,
    /// Whether the entry can be chosen.
    pub enabled: bool,
}

impl<T> SelectOption<T> {
    fn new(value: T, label: impl Into<String>, enabled: bool) -> Self {
        Self {
            value,
            label: label.into(),
            enabled,
        }
    }
}

/// Structure selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureControl {
    /// Structures of the computation, labelled in upper case.
    pub options: Vec<SelectOption<StructureId>>,
    /// Loading structure while a load is outstanding, else the shown one.
    pub selected: Option<StructureId>,
    /// Navigation stays possible while loading and after a failure.
    pub enabled: bool,
}

/// Charge-set selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeSetControl {
    /// Method names keyed by 1-based charge-set index.
    pub options: Vec<SelectOption<usize>>,
    /// Selected charge-set index.
    pub selected: usize,
    /// Whether the selector is usable.
    pub enabled: bool,
}

/// Coloring selector plus the absolute-scale max value input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColoringControl {
    /// Coloring modes.
    pub options: Vec<SelectOption<ColoringMode>>,
    /// Active mode.
    pub selected: ColoringMode,
    /// Whether the selector is usable.
    pub enabled: bool,
    /// Current max value input.
    pub max_value: f64,
    /// Max charge of the loaded structure, used as the input's upper hint.
    pub max_value_limit: Option<f64>,
    /// Input step.
    pub max_value_step: f64,
    /// Whether the input and its reset button are usable.
    pub max_value_enabled: bool,
}

/// Render style selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleControl {
    /// Render styles; cartoon is disabled when it does not apply.
    pub options: Vec<SelectOption<RenderStyle>>,
    /// Active style.
    pub selected: RenderStyle,
    /// Whether the selector is usable.
    pub enabled: bool,
}

/// Everything the results view renders besides the 3D canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlPanel {
    /// Structure selector.
    pub structure: StructureControl,
    /// Charge-set selector.
    pub charge_set: ChargeSetControl,
    /// Coloring selector and max value.
    pub coloring: ColoringControl,
    /// Style selector.
    pub style: StyleControl,
    /// Loading indicator.
    pub busy: bool,
    /// Message of the last load failure.
    pub error: Option<String>,
    /// Whether a retry button is offered.
    pub can_retry: bool,
}

impl ControlPanel {
    /// Derive every widget from one snapshot.
    #[must_use]
    pub fn build(
        state: &ControlState,
        busy: bool,
        error: Option<&LoadFailure>,
    ) -> Self {
        Self {
            structure: structure_control(state),
            charge_set: charge_set_control(state),
            coloring: coloring_control(state),
            style: style_control(state),
            busy,
            error: error.map(ToString::to_string),
            can_retry: error.is_some(),
        }
    }
}

fn structure_control(state: &ControlState) -> StructureControl {
    let options = state
        .structures
        .iter()
        .map(|id| {
            SelectOption::new(id.clone(), id.as_str().to_uppercase(), true)
        })
        .collect::<Vec<_>>();
    StructureControl {
        enabled: !options.is_empty(),
        options,
        selected: state
            .loading_structure
            .clone()
            .or_else(|| state.structure_id.clone()),
    }
}

fn charge_set_control(state: &ControlState) -> ChargeSetControl {
    let options = state
        .method_names
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, name)| SelectOption::new(i + 1, name.clone(), true))
        .collect();
    ChargeSetControl {
        options,
        selected: state.charge_set_index,
        enabled: state.charge_set_enabled(),
    }
}

/// Structure coloring is not offered for polymers, which already show
/// their secondary structure.
fn coloring_control(state: &ControlState) -> ColoringControl {
    let ready = state.is_ready();
    ColoringControl {
        options: ColoringMode::ALL
            .iter()
            .map(|&mode| {
                let enabled = ready
                    && (mode != ColoringMode::Structure
                        || !state.cartoon_available);
                SelectOption::new(mode, mode.label(), enabled)
            })
            .collect(),
        selected: state.coloring_mode,
        enabled: ready,
        max_value: state.max_value,
        max_value_limit: state.current_max_charge(),
        max_value_step: MAX_VALUE_STEP,
        max_value_enabled: ready,
    }
}

fn style_control(state: &ControlState) -> StyleControl {
    let ready = state.is_ready();
    StyleControl {
        options: RenderStyle::ALL
            .iter()
            .map(|&style| {
                let enabled = ready
                    && (style != RenderStyle::Cartoon
                        || state.cartoon_available);
                SelectOption::new(style, style.label(), enabled)
            })
            .collect(),
        selected: state.render_style,
        enabled: ready,
    }
}
