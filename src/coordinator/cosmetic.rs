//! Charge set, coloring, max value and style intents.
//!
//! While no structure is ready these only record the user's choice; the
//! post-load rebind applies it.

use super::{
    ControlKind, CoordinatorError, OperationKind, Outcome, PendingOperation,
    ResultsCoordinator,
};
use crate::backend::ComputationService;
use crate::control::{Appearance, ColoringMode, ControlState, RenderStyle};
use crate::viewer::{EngineError, ViewerHandle};

// ── Intents ──────────────────────────────────────────────────────────────

impl<V: ViewerHandle, B: ComputationService> ResultsCoordinator<V, B> {
    /// Select a charge set (1-based). Synchronous: the engine switches
    /// locally without a round trip.
    pub fn request_charge_set(
        &self,
        index: usize,
    ) -> Result<Outcome, CoordinatorError> {
        let _ = self.sequence.advance();
        let (ready, available, current) = self.store.read(|s| {
            (s.is_ready(), s.charge_set_count(), s.charge_set_index)
        });
        if !ready || available == 0 {
            return Err(CoordinatorError::NotReady);
        }
        if !(1..=available).contains(&index) {
            return Err(CoordinatorError::InvalidChargeSet { index, available });
        }
        if index == current {
            return Ok(Outcome::Unchanged);
        }
        let active = self.active();
        match active.session.viewer().select_charge_set(index) {
            Ok(()) => {
                self.store.set_charge_set(index);
                Ok(Outcome::Applied)
            }
            Err(e) => {
                self.notify(ControlKind::ChargeSet, e);
                Ok(Outcome::RolledBack)
            }
        }
    }

    /// Switch the coloring mode.
    pub async fn request_coloring(
        &self,
        mode: ColoringMode,
    ) -> Result<Outcome, CoordinatorError> {
        let sequence = self.sequence.advance();
        if self.store.desired().coloring == mode {
            return Ok(Outcome::Unchanged);
        }
        self.store.desire_coloring(mode);
        if !self.store.read(ControlState::is_ready) {
            log::debug!("#{sequence} coloring {} deferred", mode.as_str());
            return Ok(Outcome::Deferred);
        }
        Ok(self.recolor(sequence, ControlKind::Coloring).await)
    }

    /// Set the upper bound of the absolute scale.
    ///
    /// Negative values clamp to 0. Outside absolute coloring the value is
    /// only stored.
    pub async fn request_max_value(
        &self,
        max_value: f64,
    ) -> Result<Outcome, CoordinatorError> {
        let sequence = self.sequence.advance();
        self.apply_max_value(sequence, max_value).await
    }

    /// Restore the max value to the shown structure's max charge.
    pub async fn reset_max_value(&self) -> Result<Outcome, CoordinatorError> {
        let sequence = self.sequence.advance();
        let max_charge = self
            .store
            .read(|s| {
                if s.is_ready() {
                    s.current_max_charge()
                } else {
                    None
                }
            })
            .ok_or(CoordinatorError::NotReady)?;
        self.apply_max_value(sequence, max_charge).await
    }

    /// Switch the render style.
    pub async fn request_style(
        &self,
        style: RenderStyle,
    ) -> Result<Outcome, CoordinatorError> {
        let sequence = self.sequence.advance();
        let (ready, cartoon) =
            self.store.read(|s| (s.is_ready(), s.cartoon_available));
        if ready && style == RenderStyle::Cartoon && !cartoon {
            return Err(CoordinatorError::StyleUnavailable(style));
        }
        if self.store.desired().style == style {
            return Ok(Outcome::Unchanged);
        }
        self.store.desire_style(style);
        if !ready {
            log::debug!("#{sequence} style {} deferred", style.as_str());
            return Ok(Outcome::Deferred);
        }
        Ok(self.restyle(sequence).await)
    }
}

// ── Engine calls ─────────────────────────────────────────────────────────

impl<V: ViewerHandle, B: ComputationService> ResultsCoordinator<V, B> {
    async fn apply_max_value(
        &self,
        sequence: u64,
        max_value: f64,
    ) -> Result<Outcome, CoordinatorError> {
        if !max_value.is_finite() {
            return Err(CoordinatorError::InvalidMaxValue(max_value));
        }
        let max_value = if max_value < 0.0 { 0.0 } else { max_value };
        let desired = self.store.desired();
        if desired.max_value == max_value {
            return Ok(Outcome::Unchanged);
        }
        self.store.set_max_value(max_value);
        if !desired.coloring.uses_max_value()
            || !self.store.read(ControlState::is_ready)
        {
            return Ok(Outcome::Deferred);
        }
        Ok(self.recolor(sequence, ControlKind::MaxValue).await)
    }

    async fn recolor(&self, sequence: u64, control: ControlKind) -> Outcome {
        let active = self.active();
        let op = self.sequence.register(
            OperationKind::Recolor,
            sequence,
            self.shown_structure(),
        );
        let _busy = self.busy.enter();
        let _engine = active.engine.lock().await;
        if !self.sequence.is_current(&op) {
            log::debug!("#{sequence} recolor superseded before issue");
            return Outcome::Stale;
        }
        let want = self.store.desired();
        let result = Self::apply_coloring(active.session.viewer(), want).await;
        self.settle_coloring(&op, control, want, result)
    }

    async fn restyle(&self, sequence: u64) -> Outcome {
        let active = self.active();
        let op = self.sequence.register(
            OperationKind::Restyle,
            sequence,
            self.shown_structure(),
        );
        let _busy = self.busy.enter();
        let _engine = active.engine.lock().await;
        if !self.sequence.is_current(&op) {
            log::debug!("#{sequence} restyle superseded before issue");
            return Outcome::Stale;
        }
        let style = self.store.desired().style;
        let result = Self::apply_style(active.session.viewer(), style).await;
        self.settle_style(&op, style, result)
    }

    pub(super) async fn apply_coloring(
        viewer: &V,
        want: Appearance,
    ) -> Result<(), EngineError> {
        match want.coloring {
            ColoringMode::Structure => viewer.color_default().await,
            ColoringMode::ChargesRelative => viewer.color_relative().await,
            ColoringMode::ChargesAbsolute => {
                viewer.color_absolute(want.max_value).await
            }
        }
    }

    pub(super) async fn apply_style(
        viewer: &V,
        style: RenderStyle,
    ) -> Result<(), EngineError> {
        match style {
            RenderStyle::BallsAndSticks => {
                viewer.set_style_ball_and_stick().await
            }
            RenderStyle::Cartoon => viewer.set_style_default().await,
            RenderStyle::Surface => viewer.set_style_surface().await,
        }
    }
}

// ── Settling responses ───────────────────────────────────────────────────

impl<V: ViewerHandle, B: ComputationService> ResultsCoordinator<V, B> {
    /// Apply a coloring response if `op` is still current.
    ///
    /// A superseded success still moves the rollback target, since the
    /// engine now shows it.
    pub(super) fn settle_coloring(
        &self,
        op: &PendingOperation,
        control: ControlKind,
        want: Appearance,
        result: Result<(), EngineError>,
    ) -> Outcome {
        let current = self.sequence.is_current(op);
        match result {
            Ok(()) if current => {
                self.store.confirm_coloring(want.coloring, want.max_value);
                Outcome::Applied
            }
            Ok(()) => {
                if self.sequence.same_cycle(op) {
                    self.store
                        .acknowledge_coloring(want.coloring, want.max_value);
                }
                log::debug!("discarding stale recolor #{}", op.sequence);
                Outcome::Stale
            }
            Err(e) if current => {
                match control {
                    ControlKind::MaxValue => self.store.rollback_max_value(),
                    _ => self.store.rollback_coloring(),
                }
                self.notify(control, e);
                Outcome::RolledBack
            }
            Err(e) => {
                log::debug!(
                    "ignoring stale recolor #{} failure: {e}",
                    op.sequence
                );
                Outcome::Stale
            }
        }
    }

    pub(super) fn settle_style(
        &self,
        op: &PendingOperation,
        style: RenderStyle,
        result: Result<(), EngineError>,
    ) -> Outcome {
        let current = self.sequence.is_current(op);
        match result {
            Ok(()) if current => {
                self.store.confirm_style(style);
                Outcome::Applied
            }
            Ok(()) => {
                if self.sequence.same_cycle(op) {
                    self.store.acknowledge_style(style);
                }
                log::debug!("discarding stale restyle #{}", op.sequence);
                Outcome::Stale
            }
            Err(e) if current => {
                self.store.rollback_style();
                self.notify(ControlKind::Style, e);
                Outcome::RolledBack
            }
            Err(e) => {
                log::debug!(
                    "ignoring stale restyle #{} failure: {e}",
                    op.sequence
                );
                Outcome::Stale
            }
        }
    }
}
