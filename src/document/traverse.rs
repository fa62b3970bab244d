use std::collections::HashSet;

use crate::error::DocumentError;

use super::item::{ItemId, ItemKind};
use super::occurrence::OccurrenceId;
use super::part::PartId;
use super::DocumentTree;

/// One node visited by the canonical traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visit {
    Occurrence(OccurrenceId),
    Part(PartId),
    Set(ItemId),
    Body(ItemId),
}

/// Number of nodes of each ordinal-bearing kind in a traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalCounts {
    pub bodies: usize,
    pub occurrences: usize,
}

impl TraversalCounts {
    /// Counts body and occurrence visits in `order`.
    #[must_use]
    pub fn of(order: &[Visit]) -> Self {
        order.iter().fold(Self::default(), |mut counts, visit| {
            match visit {
                Visit::Body(_) => counts.bodies += 1,
                Visit::Occurrence(_) => counts.occurrences += 1,
                Visit::Part(_) | Visit::Set(_) => {}
            }
            counts
        })
    }
}

impl DocumentTree {
    /// Returns every node reachable from the root in canonical order.
    ///
    /// Depth-first: an occurrence, then its part and that part's items (a set
    /// before its members), then its child occurrences. An instance is
    /// followed by its defining occurrence the first time that occurrence is
    /// reached; every occurrence appears at most once, so shared content is
    /// visited exactly once. The order depends only on list order, never on
    /// ids, so a faithful copy yields the same sequence shape.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced node is missing.
    pub fn canonical_order(&self) -> Result<Vec<Visit>, DocumentError> {
        let mut order = Vec::new();
        if let Some(root) = self.root() {
            let mut seen = HashSet::new();
            self.visit_occurrence(root, &mut seen, &mut order)?;
        }
        Ok(order)
    }

    fn visit_occurrence(
        &self,
        id: OccurrenceId,
        seen: &mut HashSet<OccurrenceId>,
        order: &mut Vec<Visit>,
    ) -> Result<(), DocumentError> {
        if !seen.insert(id) {
            return Ok(());
        }
        order.push(Visit::Occurrence(id));
        let data = self.occurrence(id)?;
        if let Some(prototype) = data.prototype {
            return self.visit_occurrence(prototype, seen, order);
        }
        if let Some(part) = data.part {
            order.push(Visit::Part(part));
            for &item in &self.part(part)?.items {
                self.visit_item(item, order)?;
            }
        }
        for &child in &data.children {
            self.visit_occurrence(child, seen, order)?;
        }
        Ok(())
    }

    fn visit_item(&self, id: ItemId, order: &mut Vec<Visit>) -> Result<(), DocumentError> {
        match &self.item(id)?.kind {
            ItemKind::Brep(_) => order.push(Visit::Body(id)),
            ItemKind::Set(members) => {
                order.push(Visit::Set(id));
                for &member in members {
                    self.visit_item(member, order)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::ItemOwner;

    #[test]
    fn empty_document_has_no_visits() {
        let doc = DocumentTree::new();
        assert!(doc.canonical_order().unwrap().is_empty());
    }

    #[test]
    fn set_precedes_its_members() {
        let mut doc = DocumentTree::new();
        let root = doc.add_occurrence("root");
        doc.set_root(root).unwrap();
        let part = doc.add_part("p");
        doc.attach_part(root, part).unwrap();
        let a = doc.add_brep("a");
        let set = doc.add_set("s");
        let b = doc.add_brep("b");
        doc.push_item(ItemOwner::Part(part), a).unwrap();
        doc.push_item(ItemOwner::Part(part), set).unwrap();
        doc.push_item(ItemOwner::Set(set), b).unwrap();

        assert_eq!(
            doc.canonical_order().unwrap(),
            vec![
                Visit::Occurrence(root),
                Visit::Part(part),
                Visit::Body(a),
                Visit::Set(set),
                Visit::Body(b),
            ]
        );
    }

    #[test]
    fn shared_prototype_is_visited_once() {
        let mut doc = DocumentTree::new();
        let root = doc.add_occurrence("root");
        doc.set_root(root).unwrap();
        let proto = doc.add_occurrence("proto");
        let part = doc.add_part("p");
        doc.attach_part(proto, part).unwrap();
        let body = doc.add_brep("b");
        doc.push_item(ItemOwner::Part(part), body).unwrap();
        let first = doc.add_instance("first", proto).unwrap();
        let second = doc.add_instance("second", proto).unwrap();
        doc.attach_occurrence(root, first).unwrap();
        doc.attach_occurrence(root, second).unwrap();

        let order = doc.canonical_order().unwrap();

        assert_eq!(
            order,
            vec![
                Visit::Occurrence(root),
                Visit::Occurrence(first),
                Visit::Occurrence(proto),
                Visit::Part(part),
                Visit::Body(body),
                Visit::Occurrence(second),
            ]
        );
        assert_eq!(
            TraversalCounts::of(&order),
            TraversalCounts {
                bodies: 1,
                occurrences: 4
            }
        );
    }
}
