//! Results coordinator.
//!
//! Sole owner of [`ControlState`] and the only caller of the engine. Every
//! user intent goes through here; async work is tagged with a
//! [`PendingOperation`] so a response that lost the race to a newer request
//! is discarded instead of overwriting fresher state.
//!
//! Engine calls are serialized per session, so the engine always ends up
//! showing the latest request. Intents take `&self` and can be awaited
//! concurrently from a single-threaded executor.

mod cosmetic;
mod error;
mod load;
mod outcome;
mod sequence;

use std::cell::RefCell;
use std::rc::Rc;

pub use error::{CoordinatorError, LoadCause, LoadFailure};
pub use outcome::{ControlKind, Notification, Outcome};
pub use sequence::{OperationKind, PendingOperation, SequenceCounter};
use tokio::sync::{watch, Mutex};

use crate::backend::{ComputationService, StructureId};
use crate::busy::BusyTracker;
use crate::control::{ControlPanel, ControlState, ControlStore, UiAction};
use crate::options::ViewOptions;
use crate::session::Session;
use crate::viewer::{EngineError, ViewerHandle};

/// Session plus the lock that keeps engine calls from overlapping.
struct ActiveSession<V> {
    session: Session<V>,
    engine: Mutex<()>,
}

impl<V> ActiveSession<V> {
    fn new(session: Session<V>) -> Rc<Self> {
        Rc::new(Self {
            session,
            engine: Mutex::new(()),
        })
    }
}

/// Request re-issued by [`ResultsCoordinator::retry`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum RetryTarget {
    Mount,
    Structure(StructureId),
}

/// Mediates between result widgets, the backend and the engine session.
pub struct ResultsCoordinator<V, B> {
    active: RefCell<Rc<ActiveSession<V>>>,
    backend: B,
    store: ControlStore,
    sequence: SequenceCounter,
    busy: BusyTracker,
    notifications: RefCell<Vec<Notification>>,
    retry: RefCell<Option<RetryTarget>>,
    view: ViewOptions,
}

// ── Construction ─────────────────────────────────────────────────────────

impl<V: ViewerHandle, B: ComputationService> ResultsCoordinator<V, B> {
    /// Coordinator for a freshly mounted results view. Nothing is fetched
    /// until [`mount`](Self::mount) or a structure request.
    pub fn new(session: Session<V>, backend: B, view: ViewOptions) -> Self {
        Self {
            active: RefCell::new(ActiveSession::new(session)),
            backend,
            store: ControlStore::new(view.initial_coloring, view.initial_style),
            sequence: SequenceCounter::new(),
            busy: BusyTracker::new(),
            notifications: RefCell::new(Vec::new()),
            retry: RefCell::new(None),
            view,
        }
    }

    /// Switch to a different computation.
    ///
    /// Controls return to their initial values and every outstanding
    /// operation of the old session becomes stale. Call
    /// [`mount`](Self::mount) afterwards to load the new computation.
    pub fn replace_session(&self, session: Session<V>) {
        let epoch = self.sequence.begin_epoch();
        log::info!(
            "session epoch {epoch}: computation {}",
            session.computation_id()
        );
        *self.active.borrow_mut() = ActiveSession::new(session);
        self.store
            .reset(self.view.initial_coloring, self.view.initial_style);
        *self.retry.borrow_mut() = None;
        self.notifications.borrow_mut().clear();
    }
}

// ── Read API ─────────────────────────────────────────────────────────────

impl<V: ViewerHandle, B: ComputationService> ResultsCoordinator<V, B> {
    /// Current control snapshot.
    #[must_use]
    pub fn state(&self) -> ControlState {
        self.store.snapshot()
    }

    /// Receiver notified on every control change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControlState> {
        self.store.subscribe()
    }

    /// Failure of the last structure load, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<LoadFailure> {
        self.store.error()
    }

    /// Receiver for the load-failure signal.
    #[must_use]
    pub fn subscribe_error(&self) -> watch::Receiver<Option<LoadFailure>> {
        self.store.subscribe_error()
    }

    /// Outstanding-operation tracker backing the loading indicator.
    #[must_use]
    pub fn busy(&self) -> &BusyTracker {
        &self.busy
    }

    /// Widget view models for the current state.
    #[must_use]
    pub fn panel(&self) -> ControlPanel {
        let error = self.store.error();
        self.store.read(|state| {
            ControlPanel::build(state, self.busy.is_busy(), error.as_ref())
        })
    }

    /// Take every queued notification, oldest first.
    pub fn drain_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.borrow_mut())
    }

    /// Latest sequence number issued for `kind`.
    #[must_use]
    pub fn last_issued(&self, kind: OperationKind) -> u64 {
        self.sequence.latest(kind)
    }

    /// Run `f` against the current session.
    pub(crate) fn with_session<R>(
        &self,
        f: impl FnOnce(&Session<V>) -> R,
    ) -> R {
        f(&self.active.borrow().session)
    }
}

// ── UI bridge ────────────────────────────────────────────────────────────

impl<V: ViewerHandle, B: ComputationService> ResultsCoordinator<V, B> {
    /// Route a parsed UI action to its intent.
    pub async fn dispatch(
        &self,
        action: UiAction,
    ) -> Result<Outcome, CoordinatorError> {
        log::debug!("ui action: {action:?}");
        match action {
            UiAction::SelectStructure(id) => self.request_structure(id).await,
            UiAction::SelectChargeSet(index) => self.request_charge_set(index),
            UiAction::SelectColoring(mode) => self.request_coloring(mode).await,
            UiAction::SetMaxValue(value) => self.request_max_value(value).await,
            UiAction::ResetMaxValue => self.reset_max_value().await,
            UiAction::SelectStyle(style) => self.request_style(style).await,
            UiAction::Retry => self.retry().await,
        }
    }
}

// ── Internals ────────────────────────────────────────────────────────────

impl<V: ViewerHandle, B: ComputationService> ResultsCoordinator<V, B> {
    fn active(&self) -> Rc<ActiveSession<V>> {
        Rc::clone(&self.active.borrow())
    }

    fn notify(&self, control: ControlKind, error: EngineError) {
        let notification = Notification { control, error };
        log::warn!("{notification}");
        self.notifications.borrow_mut().push(notification);
    }

    fn shown_structure(&self) -> Option<StructureId> {
        self.store.read(|s| s.structure_id.clone())
    }
}
