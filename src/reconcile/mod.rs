//! Applies the update ledger to a deep copy of the document.
//!
//! Handles do not survive a deep copy, so records are correlated with copy
//! nodes by position instead: a canonical traversal of the live tree stamps
//! each record with the ordinal of its target among nodes of the same kind,
//! and the same traversal over the copy finds the node carrying that
//! ordinal.

mod ordinal;
mod patch;

use tracing::info;

use crate::document::DocumentTree;
use crate::error::Result;
use crate::kernel::Translator;
use crate::ledger::UpdateLedger;

use ordinal::{check_counts, stamp_ordinals};
use patch::PatchPlan;

/// A patched copy of the document.
#[derive(Debug)]
pub struct Reconciliation {
    /// The copy, with every stamped record applied.
    pub document: DocumentTree,
    /// Number of copy nodes replaced or omitted.
    pub applied: usize,
    /// Number of records whose target was not found in the live tree.
    pub skipped: usize,
}

/// Produces exportable copies of a document with pending changes applied.
#[derive(Debug, Clone)]
pub struct TreeReconciler {
    verify_copy_order: bool,
}

impl Default for TreeReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeReconciler {
    /// Creates a reconciler that verifies the copy's traversal shape.
    #[must_use]
    pub fn new() -> Self {
        Self {
            verify_copy_order: true,
        }
    }

    /// Enables or disables the node-count check between source and copy.
    #[must_use]
    pub fn verify_copy_order(mut self, verify: bool) -> Self {
        self.verify_copy_order = verify;
        self
    }

    /// Stamps the records of `ledger` against `source`, deep-copies it and
    /// patches the copy.
    ///
    /// Records whose target is not reachable in `source` are skipped. The
    /// ledger keeps its records; their ordinals reflect this run.
    ///
    /// # Errors
    ///
    /// Returns an error if navigation, the copy, or a back-translation fails,
    /// or if the copy's traversal does not match the source's.
    pub fn execute<T: Translator + ?Sized>(
        &self,
        source: &DocumentTree,
        ledger: &mut UpdateLedger,
        translator: &mut T,
    ) -> Result<Reconciliation> {
        let order = source.canonical_order()?;
        let stamped = stamp_ordinals(&order, ledger.records_mut());
        let skipped = ledger.len() - stamped;
        info!(records = ledger.len(), stamped, skipped, "stamped ledger ordinals");

        let mut copy = source.deep_copy()?;
        let copy_order = copy.canonical_order()?;
        if self.verify_copy_order {
            check_counts(&order, &copy_order)?;
        }

        let plan = PatchPlan::from_records(ledger.records());
        let applied = plan.apply(&mut copy, &copy_order, translator)?;
        info!(applied, "patched document copy");

        Ok(Reconciliation {
            document: copy,
            applied,
            skipped,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::fixtures::{assembly, body_names, single_part, slab};
    use crate::document::{ItemKind, ItemOwner};
    use crate::kernel::{BodyTag, MockKernel, SolidKernel, SolidShape};
    use crate::math::{Point3, Vector3};

    fn new_block(kernel: &mut MockKernel) -> BodyTag {
        kernel
            .create_solid(
                SolidShape::Block,
                Vector3::new(1.0, 1.0, 1.0),
                Point3::origin(),
                Vector3::z(),
            )
            .unwrap()
    }

    #[test]
    fn update_and_delete_patch_the_copy() {
        let (doc, _, bodies) = single_part(&["a", "b", "c"]);
        let mut kernel = MockKernel::new();
        let replacement = new_block(&mut kernel);
        let mut ledger = UpdateLedger::new();
        ledger.register_update(bodies[1], replacement);
        ledger.register_delete_body(bodies[2]);

        let result = TreeReconciler::new()
            .execute(&doc, &mut ledger, &mut kernel)
            .unwrap();

        assert_eq!(result.applied, 2);
        assert_eq!(result.skipped, 0);
        assert_eq!(
            body_names(&result.document),
            vec!["a".to_string(), format!("Body {replacement}")]
        );
        let order = result.document.canonical_order().unwrap();
        let crate::document::Visit::Body(second) = order[3] else {
            panic!("expected body");
        };
        assert_eq!(result.document.brep(second).unwrap().faces.len(), 6);
        // The live tree is untouched.
        assert_eq!(body_names(&doc), vec!["a", "b", "c"]);
    }

    #[test]
    fn delete_after_update_omits_the_body() {
        let (doc, _, bodies) = single_part(&["a", "b"]);
        let mut kernel = MockKernel::new();
        let replacement = new_block(&mut kernel);
        let mut ledger = UpdateLedger::new();
        ledger.register_update(bodies[0], replacement);
        ledger.register_delete_body(bodies[0]);

        let result = TreeReconciler::new()
            .execute(&doc, &mut ledger, &mut kernel)
            .unwrap();

        assert_eq!(body_names(&result.document), vec!["b"]);
    }

    #[test]
    fn update_after_delete_replaces_the_body() {
        let (doc, _, bodies) = single_part(&["a"]);
        let mut kernel = MockKernel::new();
        let replacement = new_block(&mut kernel);
        let mut ledger = UpdateLedger::new();
        ledger.register_delete_body(bodies[0]);
        ledger.register_update(bodies[0], replacement);

        let result = TreeReconciler::new()
            .execute(&doc, &mut ledger, &mut kernel)
            .unwrap();

        assert_eq!(body_names(&result.document), vec![format!("Body {replacement}")]);
    }

    #[test]
    fn missing_target_is_skipped_silently() {
        let (mut doc, _, bodies) = single_part(&["a", "b"]);
        let detached = slab(&mut doc, "detached");
        let mut kernel = MockKernel::new();
        let mut ledger = UpdateLedger::new();
        ledger.register_delete_body(detached);

        let result = TreeReconciler::new()
            .execute(&doc, &mut ledger, &mut kernel)
            .unwrap();

        assert_eq!(result.applied, 0);
        assert_eq!(result.skipped, 1);
        assert_eq!(body_names(&result.document), vec!["a", "b"]);
        assert!(ledger.records()[0].ordinal.is_none());
        assert_eq!(bodies.len(), 2);
    }

    #[test]
    fn set_is_kept_when_member_is_replaced() {
        let (mut doc, part, _) = single_part(&["a"]);
        let set = doc.add_set("set");
        doc.push_item(ItemOwner::Part(part), set).unwrap();
        let member = slab(&mut doc, "member");
        doc.push_item(ItemOwner::Set(set), member).unwrap();
        let untouched = doc.add_set("untouched");
        doc.push_item(ItemOwner::Part(part), untouched).unwrap();
        let mut kernel = MockKernel::new();
        let replacement = new_block(&mut kernel);
        let mut ledger = UpdateLedger::new();
        ledger.register_update(member, replacement);

        let result = TreeReconciler::new()
            .execute(&doc, &mut ledger, &mut kernel)
            .unwrap();

        let copy = &result.document;
        let copy_part = copy
            .occurrence(copy.root().unwrap())
            .unwrap()
            .part
            .unwrap();
        let items = &copy.part(copy_part).unwrap().items;
        assert_eq!(items.len(), 3);
        let ItemKind::Set(members) = &copy.item(items[1]).unwrap().kind else {
            panic!("expected set");
        };
        assert_eq!(members.len(), 1);
        assert_eq!(copy.item(members[0]).unwrap().name, format!("Body {replacement}"));
        assert!(matches!(copy.item(items[2]).unwrap().kind, ItemKind::Set(_)));
    }

    #[test]
    fn delete_part_omits_occurrence() {
        let (doc, occurrences, _) = assembly(&[&["a"], &["b"], &["c"]]);
        let mut kernel = MockKernel::new();
        let mut ledger = UpdateLedger::new();
        ledger.register_delete_part(occurrences[1]);

        let result = TreeReconciler::new()
            .execute(&doc, &mut ledger, &mut kernel)
            .unwrap();

        let copy = &result.document;
        assert_eq!(copy.occurrence(copy.root().unwrap()).unwrap().children.len(), 2);
        assert_eq!(body_names(copy), vec!["a", "c"]);
    }

    #[test]
    fn shared_prototype_is_patched_once() {
        let mut doc = crate::document::DocumentTree::new();
        let root = doc.add_occurrence("root");
        doc.set_root(root).unwrap();
        let proto = doc.add_occurrence("proto");
        let part = doc.add_part("p");
        doc.attach_part(proto, part).unwrap();
        let body = slab(&mut doc, "shared");
        doc.push_item(ItemOwner::Part(part), body).unwrap();
        for name in ["left", "right"] {
            let instance = doc.add_instance(name, proto).unwrap();
            doc.attach_occurrence(root, instance).unwrap();
        }
        let trailing = slab(&mut doc, "trailing");
        let other = doc.add_occurrence("other");
        let other_part = doc.add_part("q");
        doc.attach_part(other, other_part).unwrap();
        doc.push_item(ItemOwner::Part(other_part), trailing).unwrap();
        doc.attach_occurrence(root, other).unwrap();
        let mut kernel = MockKernel::new();
        let mut ledger = UpdateLedger::new();
        ledger.register_delete_body(trailing);

        let result = TreeReconciler::new()
            .execute(&doc, &mut ledger, &mut kernel)
            .unwrap();

        assert_eq!(ledger.records()[0].ordinal, Some(1));
        assert_eq!(body_names(&result.document), vec!["shared"]);
    }
}
