//! User-facing controls: the published [`ControlState`], its closed value
//! sets, the store that owns it, widget view models and the UI bridge.

mod action;
mod mode;
mod state;
mod store;
mod widgets;

pub use action::{parse_action, UiAction};
pub use mode::{ColoringMode, ParseModeError, RenderStyle};
pub use state::{ControlState, LoadPhase, DEFAULT_CHARGE_SET};
pub use store::ControlStore;
pub(crate) use store::Appearance;
pub use widgets::{
    ChargeSetControl, ColoringControl, ControlPanel, SelectOption,
    StructureControl, StyleControl, MAX_VALUE_STEP,
};
