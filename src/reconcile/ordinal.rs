use crate::document::{TraversalCounts, Visit};
use crate::error::ReconcileError;
use crate::ledger::{UpdateRecord, UpdateTarget};

/// Walks `order` with one counter for bodies and one for occurrences and
/// stamps every record whose target is visited with the matching counter.
///
/// Ordinals left over from an earlier run are cleared first. Returns the
/// number of records stamped.
pub(crate) fn stamp_ordinals(order: &[Visit], records: &mut [UpdateRecord]) -> usize {
    for record in records.iter_mut() {
        record.ordinal = None;
    }
    let mut bodies = 0;
    let mut occurrences = 0;
    for visit in order {
        match *visit {
            Visit::Body(item) => {
                stamp(records, UpdateTarget::Brep(item), bodies);
                bodies += 1;
            }
            Visit::Occurrence(occurrence) => {
                stamp(records, UpdateTarget::Occurrence(occurrence), occurrences);
                occurrences += 1;
            }
            Visit::Part(_) | Visit::Set(_) => {}
        }
    }
    records.iter().filter(|r| r.ordinal.is_some()).count()
}

fn stamp(records: &mut [UpdateRecord], target: UpdateTarget, ordinal: usize) {
    for record in records.iter_mut().filter(|r| r.target == target) {
        record.ordinal = Some(ordinal);
    }
}

/// Checks that a copy's traversal has as many nodes of each ordinal-bearing
/// kind as the source's.
pub(crate) fn check_counts(source: &[Visit], copy: &[Visit]) -> Result<(), ReconcileError> {
    let original = TraversalCounts::of(source);
    let copied = TraversalCounts::of(copy);
    if original.bodies != copied.bodies {
        return Err(ReconcileError::OrdinalMismatch {
            counter: "body",
            original: original.bodies,
            copy: copied.bodies,
        });
    }
    if original.occurrences != copied.occurrences {
        return Err(ReconcileError::OrdinalMismatch {
            counter: "occurrence",
            original: original.occurrences,
            copy: copied.occurrences,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::fixtures::assembly;
    use crate::ledger::UpdateLedger;

    #[test]
    fn counters_are_scoped_by_kind() {
        let (doc, occurrences, bodies) = assembly(&[&["a", "b"], &["c"]]);
        let mut ledger = UpdateLedger::new();
        ledger.register_delete_body(bodies[1][0]);
        ledger.register_delete_part(occurrences[1]);
        let order = doc.canonical_order().unwrap();

        let stamped = stamp_ordinals(&order, ledger.records_mut());

        assert_eq!(stamped, 2);
        // Third body overall, third occurrence overall (root, child 0, child 1).
        assert_eq!(ledger.records()[0].ordinal, Some(2));
        assert_eq!(ledger.records()[1].ordinal, Some(2));
    }

    #[test]
    fn stale_ordinals_are_cleared() {
        let (mut doc, _, bodies) = assembly(&[&["a"]]);
        let detached = doc.add_brep("gone");
        let mut ledger = UpdateLedger::new();
        ledger.register_delete_body(detached);
        ledger.records_mut()[0].ordinal = Some(0);
        ledger.register_delete_body(bodies[0][0]);

        let stamped = stamp_ordinals(&doc.canonical_order().unwrap(), ledger.records_mut());

        assert_eq!(stamped, 1);
        assert_eq!(ledger.records()[0].ordinal, None);
    }

    #[test]
    fn count_mismatch_is_reported() {
        let (doc, _, _) = assembly(&[&["a", "b"]]);
        let order = doc.canonical_order().unwrap();
        let truncated = &order[..order.len() - 1];

        assert!(matches!(
            check_counts(&order, truncated),
            Err(ReconcileError::OrdinalMismatch { counter: "body", original: 2, copy: 1 })
        ));
        assert!(check_counts(&order, &order).is_ok());
    }
}
