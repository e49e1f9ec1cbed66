//! JSON messages sent by a results-view UI.
//!
//! Each message is an object with an `"action"` field plus action-specific
//! fields. Unknown actions and out-of-domain values are dropped here, so
//! the coordinator only ever sees closed, typed requests.

use super::mode::{ColoringMode, RenderStyle};
use crate::backend::StructureId;

/// Requests a UI can make of the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// `{"action": "select_structure", "structure": "1abc"}`
    SelectStructure(StructureId),
    /// `{"action": "select_charge_set", "index": 2}` (1-based)
    SelectChargeSet(usize),
    /// `{"action": "select_coloring", "mode": "charges-absolute"}`
    SelectColoring(ColoringMode),
    /// `{"action": "set_max_value", "value": 0.5}`
    SetMaxValue(f64),
    /// `{"action": "reset_max_value"}`
    ResetMaxValue,
    /// `{"action": "select_style", "style": "surface"}`
    SelectStyle(RenderStyle),
    /// `{"action": "retry"}`
    Retry,
}

impl UiAction {
    /// Parse a raw IPC message body.
    #[must_use]
    pub fn from_message(body: &str) -> Option<Self> {
        let msg = serde_json::from_str::<serde_json::Value>(body).ok()?;
        parse_action(&msg)
    }
}

/// Parse an already-decoded message.
#[must_use]
pub fn parse_action(msg: &serde_json::Value) -> Option<UiAction> {
    let action = msg.get("action")?.as_str()?;
    match action {
        "select_structure" => {
            let id = msg.get("structure")?.as_str()?;
            Some(UiAction::SelectStructure(StructureId::from(id)))
        }
        "select_charge_set" => {
            let index = msg.get("index")?.as_u64()?;
            Some(UiAction::SelectChargeSet(usize::try_from(index).ok()?))
        }
        "select_coloring" => {
            let mode = msg.get("mode")?.as_str()?.parse().ok()?;
            Some(UiAction::SelectColoring(mode))
        }
        "set_max_value" => {
            let value = msg.get("value")?.as_f64()?;
            Some(UiAction::SetMaxValue(value))
        }
        "reset_max_value" => Some(UiAction::ResetMaxValue),
        "select_style" => {
            let style = msg.get("style")?.as_str()?.parse().ok()?;
            Some(UiAction::SelectStyle(style))
        }
        "retry" => Some(UiAction::Retry),
        _ => None,
    }
}
