//! Structure loading: mount, navigation, retry and the post-load rebind.

use std::future::Future;
use std::time::Duration;

use web_time::Instant;

use super::{
    ActiveSession, ControlKind, CoordinatorError, LoadCause, LoadFailure,
    OperationKind, Outcome, PendingOperation, ResultsCoordinator, RetryTarget,
};
use crate::backend::{BackendError, ComputationService, StructureId};
use crate::control::{Appearance, ControlState, LoadPhase, DEFAULT_CHARGE_SET};
use crate::viewer::ViewerHandle;

type Deadline = Option<(tokio::time::Instant, Duration)>;

/// Run `work`, giving up at the deadline.
async fn within<T>(
    deadline: Deadline,
    work: impl Future<Output = T>,
) -> Result<T, LoadCause> {
    match deadline {
        Some((at, limit)) => tokio::time::timeout_at(at, work)
            .await
            .map_err(|_| LoadCause::Timeout(limit)),
        None => Ok(work.await),
    }
}

impl<V: ViewerHandle, B: ComputationService> ResultsCoordinator<V, B> {
    /// List the computation's structures and load the first one.
    pub async fn mount(&self) -> Result<Outcome, CoordinatorError> {
        let sequence = self.sequence.advance();
        let op =
            self.sequence
                .register(OperationKind::StructureLoad, sequence, None);
        self.supersede_cosmetics();
        *self.retry.borrow_mut() = Some(RetryTarget::Mount);
        let _busy = self.busy.enter();
        self.store.begin_load(None);

        let active = self.active();
        let computation = active.session.computation_id().clone();
        log::debug!("#{sequence} listing structures of {computation}");
        let listed = self.backend.list_molecules(&computation).await;
        if !self.sequence.is_current(&op) {
            log::debug!("discarding stale listing #{sequence}");
            return Ok(Outcome::Stale);
        }

        let structures = listed
            .map_err(|e| self.fail(None, LoadCause::Backend(e)))?;
        let Some(first) = structures.first().cloned() else {
            let empty = BackendError::Api(format!(
                "computation {computation} has no structures"
            ));
            return Err(self.fail(None, LoadCause::Backend(empty)));
        };
        log::info!("{computation}: {} structure(s)", structures.len());
        self.store.set_structures(structures);
        self.request_structure(first).await
    }

    /// Show another structure of the computation.
    ///
    /// Supersedes every outstanding load and cosmetic call. On success the
    /// charge set returns to 1, the max value to the new structure's max
    /// charge, and the latest coloring and style choices are re-applied.
    pub async fn request_structure(
        &self,
        id: StructureId,
    ) -> Result<Outcome, CoordinatorError> {
        let sequence = self.sequence.advance();
        if !self.store.read(|s| s.offers_structure(&id)) {
            return Err(CoordinatorError::UnknownStructure(id));
        }
        let op = self.sequence.register(
            OperationKind::StructureLoad,
            sequence,
            Some(id.clone()),
        );
        self.supersede_cosmetics();
        *self.retry.borrow_mut() = Some(RetryTarget::Structure(id.clone()));
        let _busy = self.busy.enter();
        self.store.begin_load(Some(id.clone()));
        log::debug!("#{sequence} {} issued for {id}", op.kind.as_str());

        let started = Instant::now();
        let active = self.active();
        let result = self.load_structure(&active, &op, &id).await;
        if !self.sequence.is_current(&op) {
            log::debug!("discarding stale structure load #{sequence} ({id})");
            return Ok(Outcome::Stale);
        }
        match result {
            Ok(()) => {
                self.store.finish_load();
                *self.retry.borrow_mut() = None;
                log::info!("structure {id} ready in {:?}", started.elapsed());
                Ok(Outcome::Applied)
            }
            Err(cause) => Err(self.fail(Some(id), cause)),
        }
    }

    /// Re-issue the request that put the view into the error phase.
    pub async fn retry(&self) -> Result<Outcome, CoordinatorError> {
        if self.store.phase() != LoadPhase::Error {
            return Err(CoordinatorError::NothingToRetry);
        }
        let target = self.retry.borrow().clone();
        match target {
            Some(RetryTarget::Mount) => self.mount().await,
            Some(RetryTarget::Structure(id)) => {
                self.request_structure(id).await
            }
            None => Err(CoordinatorError::NothingToRetry),
        }
    }

    /// Fetch, load and rebind. Returns early (with `Ok`) once `op` goes
    /// stale; the caller checks staleness before looking at the result.
    async fn load_structure(
        &self,
        active: &ActiveSession<V>,
        op: &PendingOperation,
        id: &StructureId,
    ) -> Result<(), LoadCause> {
        let deadline = self
            .view
            .load_timeout()
            .map(|limit| (tokio::time::Instant::now() + limit, limit));
        let computation = active.session.computation_id();
        let payload =
            within(deadline, self.backend.get_structure(computation, id))
                .await?
                .map_err(LoadCause::Backend)?;
        if !self.sequence.is_current(op) {
            return Ok(());
        }

        let _engine = active.engine.lock().await;
        if !self.sequence.is_current(op) {
            return Ok(());
        }
        let viewer = active.session.viewer();
        within(deadline, viewer.load(&payload))
            .await?
            .map_err(LoadCause::Engine)?;
        if self.sequence.is_current(op) {
            self.bind_loaded(viewer, op, id).await;
        }
        Ok(())
    }

    /// Publish structure metadata and re-apply cosmetic choices on top of
    /// the engine's post-load defaults. Runs under the engine lock.
    ///
    /// Charge set 1 is published before it is selected. A load already
    /// leaves the engine on its first charge set, so a failed selection
    /// only raises a notification.
    async fn bind_loaded(
        &self,
        viewer: &V,
        op: &PendingOperation,
        id: &StructureId,
    ) {
        let mut want = self.store.apply_loaded(
            id.clone(),
            viewer.method_names(),
            viewer.max_charge(),
            viewer.is_default_style_applicable(),
        );
        if self.store.read(ControlState::charge_set_count) > 0 {
            if let Err(e) = viewer.select_charge_set(DEFAULT_CHARGE_SET) {
                self.notify(ControlKind::ChargeSet, e);
            }
        }

        // Choices made while loading are picked up on the next pass.
        while want.differs_from(&self.store.shown()) {
            self.rebind_coloring(viewer, want).await;
            if !self.sequence.is_current(op) {
                return;
            }
            self.rebind_style(viewer, want).await;
            if !self.sequence.is_current(op) {
                return;
            }
            want = self.store.desired();
        }
    }

    async fn rebind_coloring(&self, viewer: &V, want: Appearance) {
        let shown = self.store.shown();
        let control = if want.coloring != shown.coloring {
            ControlKind::Coloring
        } else if want.coloring.uses_max_value()
            && want.max_value != shown.max_value
        {
            // Only the scale moved: a failure reverts the max value.
            ControlKind::MaxValue
        } else {
            return;
        };
        let op = self.sequence.register(
            OperationKind::Recolor,
            self.sequence.advance(),
            self.shown_structure(),
        );
        let result = Self::apply_coloring(viewer, want).await;
        let _ = self.settle_coloring(&op, control, want, result);
    }

    async fn rebind_style(&self, viewer: &V, want: Appearance) {
        if want.style != self.store.shown().style {
            let op = self.sequence.register(
                OperationKind::Restyle,
                self.sequence.advance(),
                self.shown_structure(),
            );
            let result = Self::apply_style(viewer, want.style).await;
            let _ = self.settle_style(&op, want.style, result);
        }
    }

    fn supersede_cosmetics(&self) {
        self.sequence.supersede(OperationKind::Recolor);
        self.sequence.supersede(OperationKind::Restyle);
    }

    fn fail(
        &self,
        structure_id: Option<StructureId>,
        cause: LoadCause,
    ) -> CoordinatorError {
        let failure = LoadFailure::new(structure_id, cause);
        log::error!("{failure}");
        self.store.fail_load(failure.clone());
        CoordinatorError::Load(failure)
    }
}
