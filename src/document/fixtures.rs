//! Small document builders shared by unit tests.
#![allow(clippy::unwrap_used)]

use crate::math::{Point3, Vector3};

use super::{DocumentTree, FaceSurface, ItemId, ItemOwner, OccurrenceId, PartId};

/// Adds a detached body item with two planar faces and one edge.
pub(crate) fn slab(doc: &mut DocumentTree, name: &str) -> ItemId {
    let brep = doc.add_brep(name);
    for (z, normal) in [(0.0, -Vector3::z()), (1.0, Vector3::z())] {
        doc.add_face(
            brep,
            FaceSurface::Plane {
                origin: Point3::new(0.0, 0.0, z),
                normal,
            },
        )
        .unwrap();
    }
    doc.add_edge(brep).unwrap();
    brep
}

/// A root occurrence carrying one part with the named bodies.
pub(crate) fn single_part(names: &[&str]) -> (DocumentTree, PartId, Vec<ItemId>) {
    let mut doc = DocumentTree::new();
    let root = doc.add_occurrence("root");
    doc.set_root(root).unwrap();
    let part = doc.add_part("part");
    doc.attach_part(root, part).unwrap();
    let bodies = names
        .iter()
        .map(|name| {
            let body = slab(&mut doc, name);
            doc.push_item(ItemOwner::Part(part), body).unwrap();
            body
        })
        .collect();
    (doc, part, bodies)
}

/// A part-less root occurrence with one child occurrence per entry, each
/// carrying a part with the named bodies.
pub(crate) fn assembly(parts: &[&[&str]]) -> (DocumentTree, Vec<OccurrenceId>, Vec<Vec<ItemId>>) {
    let mut doc = DocumentTree::new();
    let root = doc.add_occurrence("root");
    doc.set_root(root).unwrap();
    let mut occurrences = Vec::new();
    let mut bodies = Vec::new();
    for (i, names) in parts.iter().enumerate() {
        let occurrence = doc.add_occurrence(format!("child {i}"));
        doc.attach_occurrence(root, occurrence).unwrap();
        let part = doc.add_part(format!("part {i}"));
        doc.attach_part(occurrence, part).unwrap();
        let items = names
            .iter()
            .map(|name| {
                let body = slab(&mut doc, name);
                doc.push_item(ItemOwner::Part(part), body).unwrap();
                body
            })
            .collect();
        occurrences.push(occurrence);
        bodies.push(items);
    }
    (doc, occurrences, bodies)
}

/// Names of the bodies reachable from the root, in canonical order.
pub(crate) fn body_names(doc: &DocumentTree) -> Vec<String> {
    doc.canonical_order()
        .unwrap()
        .into_iter()
        .filter_map(|visit| match visit {
            super::Visit::Body(item) => Some(doc.item(item).unwrap().name.clone()),
            _ => None,
        })
        .collect()
}
