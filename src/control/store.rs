//! Single owner of [`ControlState`].
//!
//! The coordinator is the only writer. Widgets hold receivers and re-render
//! on change; nothing outside this module mutates the published snapshot.

use std::cell::Cell;

use tokio::sync::watch;

use super::mode::{ColoringMode, RenderStyle};
use super::state::{ControlState, LoadPhase, DEFAULT_CHARGE_SET};
use crate::backend::StructureId;
use crate::coordinator::LoadFailure;

/// Cosmetic values the engine is asked to show (or does show).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Appearance {
    pub(crate) coloring: ColoringMode,
    pub(crate) style: RenderStyle,
    pub(crate) max_value: f64,
}

impl Appearance {
    /// What the engine displays right after a structure load.
    pub(crate) const fn engine_defaults(max_value: f64) -> Self {
        Self {
            coloring: ColoringMode::Structure,
            style: RenderStyle::BallsAndSticks,
            max_value,
        }
    }

    /// Whether switching the engine from `shown` to `self` needs calls.
    pub(crate) fn differs_from(&self, shown: &Self) -> bool {
        self.coloring != shown.coloring
            || self.style != shown.style
            || (self.coloring == ColoringMode::ChargesAbsolute
                && self.max_value != shown.max_value)
    }
}

/// Published control snapshot plus the coordinator's private bookkeeping.
#[derive(Debug)]
pub struct ControlStore {
    state: watch::Sender<ControlState>,
    error: watch::Sender<Option<LoadFailure>>,
    /// Latest user choices, applied when the engine can take them.
    desired: Cell<Appearance>,
    /// Last values the engine acknowledged for the loaded structure.
    shown: Cell<Appearance>,
}

impl ControlStore {
    pub(crate) fn new(coloring: ColoringMode, style: RenderStyle) -> Self {
        let initial = ControlState::initial(coloring, style);
        let desired = Appearance {
            coloring,
            style,
            max_value: initial.max_value,
        };
        let (state, _) = watch::channel(initial);
        let (error, _) = watch::channel(None);
        Self {
            state,
            error,
            desired: Cell::new(desired),
            shown: Cell::new(Appearance::engine_defaults(0.0)),
        }
    }

    // ── Read API ──────────────────────────────────────────────────────────

    /// Clone of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ControlState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControlState> {
        self.state.subscribe()
    }

    /// Failure of the last load, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<LoadFailure> {
        self.error.borrow().clone()
    }

    /// Receiver for the load-failure signal.
    #[must_use]
    pub fn subscribe_error(&self) -> watch::Receiver<Option<LoadFailure>> {
        self.error.subscribe()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&ControlState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub(crate) fn phase(&self) -> LoadPhase {
        self.read(|s| s.phase)
    }

    pub(crate) fn desired(&self) -> Appearance {
        self.desired.get()
    }

    pub(crate) fn shown(&self) -> Appearance {
        self.shown.get()
    }

    fn modify(&self, f: impl FnOnce(&mut ControlState)) {
        self.state.send_modify(f);
    }

    fn update_desired(&self, f: impl FnOnce(&mut Appearance)) {
        let mut desired = self.desired.get();
        f(&mut desired);
        self.desired.set(desired);
    }

    // ── Load lifecycle ────────────────────────────────────────────────────

    pub(crate) fn set_structures(&self, structures: Vec<StructureId>) {
        self.modify(|s| s.structures = structures);
    }

    pub(crate) fn begin_load(&self, id: Option<StructureId>) {
        self.modify(|s| {
            s.phase = LoadPhase::Loading;
            s.loading_structure = id;
        });
        let _ = self.error.send_replace(None);
    }

    /// Enter `Error`. Structure-derived data is cleared since the engine may
    /// have dropped the previous structure.
    pub(crate) fn fail_load(&self, failure: LoadFailure) {
        self.modify(|s| {
            s.phase = LoadPhase::Error;
            s.loading_structure = None;
            s.structure_id = None;
            s.method_names = None;
            s.cartoon_available = false;
        });
        let _ = self.error.send_replace(Some(failure));
    }

    /// Record a freshly loaded structure. The engine now shows its defaults;
    /// returns what the rebind has to apply on top of them.
    pub(crate) fn apply_loaded(
        &self,
        id: StructureId,
        method_names: Vec<String>,
        max_charge: f64,
        cartoon_available: bool,
    ) -> Appearance {
        let shown = Appearance::engine_defaults(max_charge);
        self.shown.set(shown);
        self.modify(|s| {
            let _ = s.max_charge_by_structure.insert(id.clone(), max_charge);
            s.structure_id = Some(id);
            s.charge_set_index = DEFAULT_CHARGE_SET;
            s.method_names = Some(method_names);
            s.cartoon_available = cartoon_available;
            s.coloring_mode = shown.coloring;
            s.render_style = shown.style;
            s.max_value = max_charge;
        });
        self.update_desired(|d| {
            d.max_value = max_charge;
            if !cartoon_available && d.style == RenderStyle::Cartoon {
                d.style = RenderStyle::BallsAndSticks;
            }
        });
        self.desired.get()
    }

    pub(crate) fn finish_load(&self) {
        self.modify(|s| {
            s.phase = LoadPhase::Ready;
            s.loading_structure = None;
        });
    }

    // ── Cosmetic controls ─────────────────────────────────────────────────

    pub(crate) fn desire_coloring(&self, coloring: ColoringMode) {
        self.update_desired(|d| d.coloring = coloring);
    }

    pub(crate) fn desire_style(&self, style: RenderStyle) {
        self.update_desired(|d| d.style = style);
    }

    /// Optimistic write; the value is kept even while not in absolute mode.
    pub(crate) fn set_max_value(&self, max_value: f64) {
        self.update_desired(|d| d.max_value = max_value);
        self.modify(|s| s.max_value = max_value);
    }

    /// The engine accepted a coloring call, though a newer one may be
    /// pending. Only moves the rollback target.
    pub(crate) fn acknowledge_coloring(
        &self,
        coloring: ColoringMode,
        max_value: f64,
    ) {
        let mut shown = self.shown.get();
        shown.coloring = coloring;
        if coloring == ColoringMode::ChargesAbsolute {
            shown.max_value = max_value;
        }
        self.shown.set(shown);
    }

    pub(crate) fn acknowledge_style(&self, style: RenderStyle) {
        let mut shown = self.shown.get();
        shown.style = style;
        self.shown.set(shown);
    }

    /// Publish an acknowledged coloring call.
    pub(crate) fn confirm_coloring(
        &self,
        coloring: ColoringMode,
        max_value: f64,
    ) {
        self.acknowledge_coloring(coloring, max_value);
        self.modify(|s| s.coloring_mode = coloring);
    }

    pub(crate) fn confirm_style(&self, style: RenderStyle) {
        self.acknowledge_style(style);
        self.modify(|s| s.render_style = style);
    }

    /// Revert the coloring selector to what the engine shows. The scale
    /// follows along while the engine shows absolute coloring.
    pub(crate) fn rollback_coloring(&self) {
        let shown = self.shown.get();
        let absolute = shown.coloring.uses_max_value();
        self.update_desired(|d| {
            d.coloring = shown.coloring;
            if absolute {
                d.max_value = shown.max_value;
            }
        });
        self.modify(|s| {
            s.coloring_mode = shown.coloring;
            if absolute {
                s.max_value = shown.max_value;
            }
        });
    }

    /// Revert coloring and scale to the last ones the engine accepted.
    pub(crate) fn rollback_max_value(&self) {
        self.rollback_coloring();
        self.set_max_value(self.shown.get().max_value);
    }

    pub(crate) fn rollback_style(&self) {
        let style = self.shown.get().style;
        self.update_desired(|d| d.style = style);
        self.modify(|s| s.render_style = style);
    }

    pub(crate) fn set_charge_set(&self, index: usize) {
        self.modify(|s| s.charge_set_index = index);
    }

    /// Back to the freshly mounted state, for a new session.
    pub(crate) fn reset(&self, coloring: ColoringMode, style: RenderStyle) {
        let initial = ControlState::initial(coloring, style);
        self.desired.set(Appearance {
            coloring,
            style,
            max_value: initial.max_value,
        });
        self.shown.set(Appearance::engine_defaults(0.0));
        let _ = self.state.send_replace(initial);
        let _ = self.error.send_replace(None);
    }
}
