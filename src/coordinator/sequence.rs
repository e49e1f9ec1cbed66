use std::cell::Cell;

use crate::backend::StructureId;

/// Category of async engine work tracked for staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Structure fetch + engine load + rebind.
    StructureLoad,
    /// Coloring call (including absolute max value changes).
    Recolor,
    /// Render style call.
    Restyle,
}

impl OperationKind {
    const fn slot(self) -> usize {
        match self {
            Self::StructureLoad => 0,
            Self::Recolor => 1,
            Self::Restyle => 2,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StructureLoad => "structure-load",
            Self::Recolor => "recolor",
            Self::Restyle => "restyle",
        }
    }
}

/// Token attached to one outstanding async call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    /// What the call does.
    pub kind: OperationKind,
    /// Structure shown (or being loaded) when the call was issued.
    pub issued_for: Option<StructureId>,
    /// Global sequence number of the intent that issued the call.
    pub sequence: u64,
    /// Latest structure-load sequence when the call was issued.
    pub cycle: u64,
    /// Session generation the call belongs to.
    pub epoch: u64,
}

/// Monotonic sequence numbers plus the latest issued number per kind.
///
/// A response is applied iff its token is still the latest of its kind in
/// the current session epoch.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    last: Cell<u64>,
    latest: [Cell<u64>; 3],
    epoch: Cell<u64>,
}

impl SequenceCounter {
    /// Fresh counter; the first issued number is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the next global sequence number.
    pub fn advance(&self) -> u64 {
        let next = self.last.get() + 1;
        self.last.set(next);
        next
    }

    /// Register `sequence` as the latest call of `kind`.
    pub fn register(
        &self,
        kind: OperationKind,
        sequence: u64,
        issued_for: Option<StructureId>,
    ) -> PendingOperation {
        self.latest[kind.slot()].set(sequence);
        PendingOperation {
            kind,
            issued_for,
            sequence,
            cycle: self.latest(OperationKind::StructureLoad),
            epoch: self.epoch.get(),
        }
    }

    /// Make every outstanding call of `kind` stale without issuing one.
    pub fn supersede(&self, kind: OperationKind) {
        let next = self.advance();
        self.latest[kind.slot()].set(next);
    }

    /// Whether `op` is still the newest call of its kind.
    #[must_use]
    pub fn is_current(&self, op: &PendingOperation) -> bool {
        op.epoch == self.epoch.get()
            && self.latest[op.kind.slot()].get() == op.sequence
    }

    /// Whether the structure `op` was issued against is still the one in
    /// the engine, even if a newer call of the same kind exists.
    #[must_use]
    pub fn same_cycle(&self, op: &PendingOperation) -> bool {
        op.epoch == self.epoch.get()
            && op.cycle == self.latest(OperationKind::StructureLoad)
    }

    /// Latest sequence number registered for `kind`.
    #[must_use]
    pub fn latest(&self, kind: OperationKind) -> u64 {
        self.latest[kind.slot()].get()
    }

    /// Last sequence number handed out.
    #[must_use]
    pub fn last(&self) -> u64 {
        self.last.get()
    }

    /// Start a new session generation; every earlier token becomes stale.
    pub fn begin_epoch(&self) -> u64 {
        let epoch = self.epoch.get() + 1;
        self.epoch.set(epoch);
        epoch
    }
}
