use std::collections::HashMap;

use crate::error::DocumentError;

use super::entity::{EdgeId, FaceId};
use super::item::{ItemId, ItemKind, ItemOwner};
use super::occurrence::OccurrenceId;
use super::part::PartId;
use super::DocumentTree;

/// Correspondence between source ids and the ids issued by a copy.
#[derive(Debug, Default)]
pub struct CopyMap {
    occurrences: HashMap<OccurrenceId, OccurrenceId>,
    parts: HashMap<PartId, PartId>,
    items: HashMap<ItemId, ItemId>,
    faces: HashMap<FaceId, FaceId>,
    edges: HashMap<EdgeId, EdgeId>,
}

impl CopyMap {
    /// Returns the copy of a source occurrence.
    #[must_use]
    pub fn occurrence(&self, source: OccurrenceId) -> Option<OccurrenceId> {
        self.occurrences.get(&source).copied()
    }

    /// Returns the copy of a source part.
    #[must_use]
    pub fn part(&self, source: PartId) -> Option<PartId> {
        self.parts.get(&source).copied()
    }

    /// Returns the copy of a source item.
    #[must_use]
    pub fn item(&self, source: ItemId) -> Option<ItemId> {
        self.items.get(&source).copied()
    }

    /// Returns the copy of a source face.
    #[must_use]
    pub fn face(&self, source: FaceId) -> Option<FaceId> {
        self.faces.get(&source).copied()
    }

    /// Returns the copy of a source edge.
    #[must_use]
    pub fn edge(&self, source: EdgeId) -> Option<EdgeId> {
        self.edges.get(&source).copied()
    }
}

impl DocumentTree {
    /// Produces a structural deep copy of the subtree under the root.
    ///
    /// Every list is copied in order and shared prototypes stay shared, so
    /// the copy's [`canonical_order`](Self::canonical_order) has the same
    /// shape as the source's. Detached nodes are not copied.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced node is missing.
    pub fn deep_copy(&self) -> Result<DocumentTree, DocumentError> {
        let mut copy = DocumentTree::new();
        if let Some(root) = self.root() {
            let (copied_root, _) = self.copy_occurrence_into(root, &mut copy)?;
            copy.set_root(copied_root)?;
        }
        Ok(copy)
    }

    /// Copies the subtree under `occurrence` into `target` as a detached
    /// occurrence and returns it with the id correspondence.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced node is missing.
    pub fn copy_occurrence_into(
        &self,
        occurrence: OccurrenceId,
        target: &mut DocumentTree,
    ) -> Result<(OccurrenceId, CopyMap), DocumentError> {
        let mut map = CopyMap::default();
        let copied = self.copy_occurrence(occurrence, target, &mut map)?;
        Ok((copied, map))
    }

    fn copy_occurrence(
        &self,
        id: OccurrenceId,
        target: &mut DocumentTree,
        map: &mut CopyMap,
    ) -> Result<OccurrenceId, DocumentError> {
        if let Some(copied) = map.occurrence(id) {
            return Ok(copied);
        }
        let data = self.occurrence(id)?;
        let copied = target.add_occurrence(data.name.clone());
        map.occurrences.insert(id, copied);

        if let Some(prototype) = data.prototype {
            let prototype = self.copy_occurrence(prototype, target, map)?;
            target.occurrence_mut(copied)?.prototype = Some(prototype);
            return Ok(copied);
        }
        if let Some(part) = data.part {
            let part = self.copy_part(part, target, map)?;
            target.attach_part(copied, part)?;
        }
        for &child in &data.children {
            let child = self.copy_occurrence(child, target, map)?;
            target.attach_occurrence(copied, child)?;
        }
        Ok(copied)
    }

    fn copy_part(
        &self,
        id: PartId,
        target: &mut DocumentTree,
        map: &mut CopyMap,
    ) -> Result<PartId, DocumentError> {
        let data = self.part(id)?;
        let copied = target.add_part(data.name.clone());
        map.parts.insert(id, copied);
        for &item in &data.items {
            let item = self.copy_item(item, target, map)?;
            target.push_item(ItemOwner::Part(copied), item)?;
        }
        Ok(copied)
    }

    fn copy_item(
        &self,
        id: ItemId,
        target: &mut DocumentTree,
        map: &mut CopyMap,
    ) -> Result<ItemId, DocumentError> {
        let data = self.item(id)?;
        let copied = match &data.kind {
            ItemKind::Brep(brep) => {
                let copied = target.add_brep(data.name.clone());
                for &face in &brep.faces {
                    let surface = self.face(face)?.surface.clone();
                    map.faces.insert(face, target.add_face(copied, surface)?);
                }
                for &edge in &brep.edges {
                    self.edge(edge)?;
                    map.edges.insert(edge, target.add_edge(copied)?);
                }
                copied
            }
            ItemKind::Set(members) => {
                let copied = target.add_set(data.name.clone());
                for &member in members {
                    let member = self.copy_item(member, target, map)?;
                    target.push_item(ItemOwner::Set(copied), member)?;
                }
                copied
            }
        };
        map.items.insert(id, copied);
        Ok(copied)
    }
}
