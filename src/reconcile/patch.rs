use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::document::{DocumentTree, Visit};
use crate::error::Result;
use crate::kernel::{BodyTag, Translator};
use crate::ledger::{UpdateKind, UpdateRecord, UpdateTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyPatch {
    Replace(BodyTag),
    Omit,
}

/// Patching decisions keyed by ordinal.
#[derive(Debug, Default)]
pub(crate) struct PatchPlan {
    bodies: BTreeMap<usize, BodyPatch>,
    occurrences: BTreeSet<usize>,
}

impl PatchPlan {
    /// Folds stamped records in ledger order; a later record for the same
    /// ordinal overwrites an earlier decision.
    pub(crate) fn from_records(records: &[UpdateRecord]) -> Self {
        let mut plan = Self::default();
        for record in records {
            let Some(ordinal) = record.ordinal else {
                continue;
            };
            match (record.target, record.kind) {
                (UpdateTarget::Brep(_), UpdateKind::Update) => match record.result_body {
                    Some(body) => {
                        plan.bodies.insert(ordinal, BodyPatch::Replace(body));
                    }
                    None => warn!(ordinal, "update record without result body"),
                },
                (UpdateTarget::Brep(_), UpdateKind::DeleteBody) => {
                    plan.bodies.insert(ordinal, BodyPatch::Omit);
                }
                (UpdateTarget::Occurrence(_), UpdateKind::DeletePart) => {
                    plan.occurrences.insert(ordinal);
                }
                (target, kind) => warn!(?target, ?kind, "record kind does not fit its target"),
            }
        }
        plan
    }

    /// Applies the plan to `copy`, whose canonical order is `order`. Returns
    /// the number of nodes patched.
    pub(crate) fn apply<T: Translator + ?Sized>(
        &self,
        copy: &mut DocumentTree,
        order: &[Visit],
        translator: &mut T,
    ) -> Result<usize> {
        let mut bodies = 0;
        let mut occurrences = 0;
        let mut applied = 0;
        for visit in order {
            match *visit {
                Visit::Body(item) => {
                    match self.bodies.get(&bodies) {
                        Some(BodyPatch::Replace(body)) => {
                            let context = translator.translate_back(copy, *body)?;
                            copy.replace_item(item, context.brep())?;
                            applied += 1;
                        }
                        Some(BodyPatch::Omit) => {
                            copy.remove_item(item)?;
                            applied += 1;
                        }
                        None => {}
                    }
                    bodies += 1;
                }
                Visit::Occurrence(occurrence) => {
                    if self.occurrences.contains(&occurrences) {
                        if copy.occurrence(occurrence)?.parent.is_some() {
                            copy.detach_occurrence(occurrence)?;
                            applied += 1;
                        } else {
                            warn!(ordinal = occurrences, "cannot delete the top-level occurrence");
                        }
                    }
                    occurrences += 1;
                }
                Visit::Part(_) | Visit::Set(_) => {}
            }
        }
        Ok(applied)
    }
}
