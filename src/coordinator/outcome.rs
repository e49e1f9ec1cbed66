use std::fmt;

use crate::viewer::EngineError;

/// What happened to an accepted intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The engine confirmed the change and the control state reflects it.
    Applied,
    /// Stored; applied once a structure is loaded or the mode needs it.
    Deferred,
    /// Identical to the latest request; nothing issued.
    Unchanged,
    /// Superseded by a newer request before resolving; result discarded.
    Stale,
    /// The engine rejected the change; the control reverted to the value
    /// the engine shows and a [`Notification`] was queued.
    RolledBack,
}

/// Which control a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Charge-set selector.
    ChargeSet,
    /// Coloring mode selector.
    Coloring,
    /// Absolute coloring max value.
    MaxValue,
    /// Render style selector.
    Style,
}

impl ControlKind {
    /// Human-readable control name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ChargeSet => "charge set",
            Self::Coloring => "coloring",
            Self::MaxValue => "max value",
            Self::Style => "view",
        }
    }
}

/// Non-blocking report of an engine operation that was rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Control that was reverted.
    pub control: ControlKind,
    /// Engine error behind the rollback.
    pub error: EngineError,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not change {}: {}", self.control.label(), self.error)
    }
}
