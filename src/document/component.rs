use crate::error::DocumentError;

use super::entity::{EdgeId, FaceId};
use super::item::{ItemId, ItemKind, ItemOwner};
use super::occurrence::OccurrenceId;
use super::part::PartId;
use super::DocumentTree;

/// A node of the document tree as seen by the viewer layer.
///
/// This is the closed set of node kinds the correlation layer distinguishes;
/// navigation and the reconciler match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Occurrence(OccurrenceId),
    Part(PartId),
    Set(ItemId),
    Body(ItemId),
    Face(FaceId),
    Edge(EdgeId),
}

impl DocumentTree {
    /// Returns the component wrapping a representation item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is not in the store.
    pub fn item_component(&self, item: ItemId) -> Result<Component, DocumentError> {
        Ok(match self.item(item)?.kind {
            ItemKind::Brep(_) => Component::Body(item),
            ItemKind::Set(_) => Component::Set(item),
        })
    }

    /// Returns the direct subcomponents of `component`, in document order.
    ///
    /// An instance occurrence exposes the content of its defining occurrence.
    /// A body exposes its faces followed by its edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the component or one of its members is missing.
    pub fn subcomponents(&self, component: Component) -> Result<Vec<Component>, DocumentError> {
        match component {
            Component::Occurrence(id) => {
                let data = self.occurrence(id)?;
                let data = match data.prototype {
                    Some(prototype) => self.occurrence(prototype)?,
                    None => data,
                };
                let mut subs: Vec<Component> = data.part.map(Component::Part).into_iter().collect();
                subs.extend(data.children.iter().copied().map(Component::Occurrence));
                Ok(subs)
            }
            Component::Part(id) => self
                .part(id)?
                .items
                .iter()
                .map(|&item| self.item_component(item))
                .collect(),
            Component::Set(id) | Component::Body(id) => match &self.item(id)?.kind {
                ItemKind::Set(members) => members
                    .iter()
                    .map(|&item| self.item_component(item))
                    .collect(),
                ItemKind::Brep(brep) => Ok(brep
                    .faces
                    .iter()
                    .copied()
                    .map(Component::Face)
                    .chain(brep.edges.iter().copied().map(Component::Edge))
                    .collect()),
            },
            Component::Face(id) => self.face(id).map(|_| Vec::new()),
            Component::Edge(id) => self.edge(id).map(|_| Vec::new()),
        }
    }

    /// Returns every body item at or below `component`, in document order.
    ///
    /// # Errors
    ///
    /// Returns an error if a node below `component` is missing.
    pub fn body_items(&self, component: Component) -> Result<Vec<ItemId>, DocumentError> {
        let mut found = Vec::new();
        let mut pending = vec![component];
        while let Some(next) = pending.pop() {
            match next {
                Component::Body(item) => {
                    if !found.contains(&item) {
                        found.push(item);
                    }
                }
                Component::Face(_) | Component::Edge(_) => {}
                Component::Occurrence(_) | Component::Part(_) | Component::Set(_) => {
                    let mut subs = self.subcomponents(next)?;
                    subs.reverse();
                    pending.extend(subs);
                }
            }
        }
        Ok(found)
    }

    /// Returns the component owning `component`, `None` at a root or for a
    /// detached node.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is not in the store.
    pub fn owner(&self, component: Component) -> Result<Option<Component>, DocumentError> {
        Ok(match component {
            Component::Occurrence(id) => self.occurrence(id)?.parent.map(Component::Occurrence),
            Component::Part(id) => self.part(id)?.owner.map(Component::Occurrence),
            Component::Set(id) | Component::Body(id) => match self.item(id)?.owner {
                Some(ItemOwner::Part(part)) => Some(Component::Part(part)),
                Some(ItemOwner::Set(set)) => Some(Component::Set(set)),
                None => None,
            },
            Component::Face(id) => Some(Component::Body(self.face(id)?.brep)),
            Component::Edge(id) => Some(Component::Body(self.edge(id)?.brep)),
        })
    }

    /// Returns the chain of owners from `component` (inclusive) up to the
    /// outermost reachable owner.
    ///
    /// # Errors
    ///
    /// Returns an error if a node on the chain is missing.
    pub fn owner_path(&self, component: Component) -> Result<Vec<Component>, DocumentError> {
        let mut path = vec![component];
        let mut current = component;
        while let Some(owner) = self.owner(current)? {
            if path.contains(&owner) {
                return Err(DocumentError::InvalidStructure("owner chain has a cycle".into()));
            }
            path.push(owner);
            current = owner;
        }
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::FaceSurface;

    #[test]
    fn body_subcomponents_are_faces_then_edges() {
        let mut doc = DocumentTree::new();
        let brep = doc.add_brep("b");
        let f0 = doc.add_face(brep, FaceSurface::Curved).unwrap();
        let e0 = doc.add_edge(brep).unwrap();
        let f1 = doc.add_face(brep, FaceSurface::Curved).unwrap();

        let subs = doc.subcomponents(Component::Body(brep)).unwrap();

        assert_eq!(
            subs,
            vec![Component::Face(f0), Component::Face(f1), Component::Edge(e0)]
        );
    }

    #[test]
    fn owner_path_reaches_root() {
        let mut doc = DocumentTree::new();
        let root = doc.add_occurrence("root");
        let child = doc.add_occurrence("child");
        doc.attach_occurrence(root, child).unwrap();
        let part = doc.add_part("p");
        doc.attach_part(child, part).unwrap();
        let set = doc.add_set("s");
        doc.push_item(ItemOwner::Part(part), set).unwrap();
        let brep = doc.add_brep("b");
        doc.push_item(ItemOwner::Set(set), brep).unwrap();
        let face = doc.add_face(brep, FaceSurface::Curved).unwrap();

        let path = doc.owner_path(Component::Face(face)).unwrap();

        assert_eq!(
            path,
            vec![
                Component::Face(face),
                Component::Body(brep),
                Component::Set(set),
                Component::Part(part),
                Component::Occurrence(child),
                Component::Occurrence(root),
            ]
        );
    }

    #[test]
    fn body_items_in_document_order() {
        let (doc, occurrences, bodies) =
            crate::document::fixtures::assembly(&[&["a", "b"], &["c"]]);

        assert_eq!(
            doc.body_items(Component::Occurrence(doc.root().unwrap()))
                .unwrap(),
            vec![bodies[0][0], bodies[0][1], bodies[1][0]]
        );
        assert_eq!(
            doc.body_items(Component::Occurrence(occurrences[1])).unwrap(),
            vec![bodies[1][0]]
        );
    }

    #[test]
    fn instance_exposes_prototype_content() {
        let mut doc = DocumentTree::new();
        let proto = doc.add_occurrence("proto");
        let part = doc.add_part("p");
        doc.attach_part(proto, part).unwrap();
        let inst = doc.add_instance("inst", proto).unwrap();

        assert_eq!(
            doc.subcomponents(Component::Occurrence(inst)).unwrap(),
            vec![Component::Part(part)]
        );
    }
}
