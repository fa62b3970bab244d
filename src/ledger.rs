use tracing::debug;

use crate::document::{ItemId, OccurrenceId};
use crate::kernel::BodyTag;

/// Document node a pending change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateTarget {
    /// A body item, correlated through the body ordinal.
    Brep(ItemId),
    /// An occurrence, correlated through the occurrence ordinal.
    Occurrence(OccurrenceId),
}

/// Kind of pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Replace the body item with the translation of the result body.
    Update,
    /// Omit the body item from its containing list.
    DeleteBody,
    /// Omit the occurrence from its parent's occurrence list.
    DeletePart,
}

/// One pending change accumulated during an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    pub target: UpdateTarget,
    pub kind: UpdateKind,
    /// Kernel body replacing the target, for [`UpdateKind::Update`].
    pub result_body: Option<BodyTag>,
    /// Position of the target in the canonical traversal of the live tree,
    /// stamped by the reconciler; `None` if the target was not found.
    pub ordinal: Option<usize>,
}

/// Ordered list of pending changes.
#[derive(Debug, Default)]
pub struct UpdateLedger {
    records: Vec<UpdateRecord>,
}

impl UpdateLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `brep` was regenerated as `body`.
    pub fn register_update(&mut self, brep: ItemId, body: BodyTag) {
        debug!(?brep, %body, "ledger: update");
        self.records.push(UpdateRecord {
            target: UpdateTarget::Brep(brep),
            kind: UpdateKind::Update,
            result_body: Some(body),
            ordinal: None,
        });
    }

    /// Records that `brep` was deleted.
    ///
    /// If records for `brep` already exist their kind is overwritten in place
    /// instead of appending another record.
    pub fn register_delete_body(&mut self, brep: ItemId) {
        let target = UpdateTarget::Brep(brep);
        let mut superseded = 0;
        for existing in self.records.iter_mut().filter(|r| r.target == target) {
            existing.kind = UpdateKind::DeleteBody;
            superseded += 1;
        }
        if superseded > 0 {
            debug!(?brep, superseded, "ledger: delete body supersedes existing records");
            return;
        }
        debug!(?brep, "ledger: delete body");
        self.records.push(UpdateRecord {
            target,
            kind: UpdateKind::DeleteBody,
            result_body: None,
            ordinal: None,
        });
    }

    /// Records that the occurrence was deleted.
    pub fn register_delete_part(&mut self, occurrence: OccurrenceId) {
        debug!(?occurrence, "ledger: delete part");
        self.records.push(UpdateRecord {
            target: UpdateTarget::Occurrence(occurrence),
            kind: UpdateKind::DeletePart,
            result_body: None,
            ordinal: None,
        });
    }

    /// Records in registration order.
    #[must_use]
    pub fn records(&self) -> &[UpdateRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [UpdateRecord] {
        &mut self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
