pub mod component;
pub mod copy;
pub mod entity;
pub mod item;
pub mod occurrence;
pub mod part;
pub mod traverse;

#[cfg(test)]
pub(crate) mod fixtures;

pub use component::Component;
pub use copy::CopyMap;
pub use entity::{EdgeData, EdgeId, FaceData, FaceId, FaceSurface, SubEntity};
pub use item::{BrepData, ItemData, ItemId, ItemKind, ItemOwner};
pub use occurrence::{OccurrenceData, OccurrenceId};
pub use part::{PartData, PartId};
pub use traverse::{TraversalCounts, Visit};

use crate::error::DocumentError;
use slotmap::SlotMap;

/// Persistent, handle-addressed CAD document.
///
/// Product occurrences, parts, representation items and their sub-entities
/// live in typed arenas and refer to each other by generational ids. Ids are
/// only meaningful inside the tree that issued them; a deep copy issues a
/// fresh set. The type has no `Clone`: copies go through
/// [`deep_copy`](Self::deep_copy).
#[derive(Debug, Default)]
pub struct DocumentTree {
    root: Option<OccurrenceId>,
    occurrences: SlotMap<OccurrenceId, OccurrenceData>,
    parts: SlotMap<PartId, PartData>,
    items: SlotMap<ItemId, ItemData>,
    faces: SlotMap<FaceId, FaceData>,
    edges: SlotMap<EdgeId, EdgeData>,
}

impl DocumentTree {
    /// Creates a new, empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the top-level occurrence, if any.
    #[must_use]
    pub fn root(&self) -> Option<OccurrenceId> {
        self.root
    }

    /// Makes `occurrence` the top-level occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if the occurrence is not in the store.
    pub fn set_root(&mut self, occurrence: OccurrenceId) -> Result<(), DocumentError> {
        self.occurrence(occurrence)?;
        self.root = Some(occurrence);
        Ok(())
    }

    // --- Occurrence operations ---

    /// Inserts a detached occurrence and returns its ID.
    pub fn add_occurrence(&mut self, name: impl Into<String>) -> OccurrenceId {
        self.occurrences.insert(OccurrenceData {
            name: name.into(),
            ..OccurrenceData::default()
        })
    }

    /// Inserts a detached instance of `prototype` and returns its ID.
    ///
    /// Instancing an instance instances its defining occurrence instead, so
    /// prototype chains never exceed one link.
    ///
    /// # Errors
    ///
    /// Returns an error if the prototype is not in the store.
    pub fn add_instance(
        &mut self,
        name: impl Into<String>,
        prototype: OccurrenceId,
    ) -> Result<OccurrenceId, DocumentError> {
        let defining = self.occurrence(prototype)?.prototype.unwrap_or(prototype);
        Ok(self.occurrences.insert(OccurrenceData {
            name: name.into(),
            prototype: Some(defining),
            ..OccurrenceData::default()
        }))
    }

    /// Returns a reference to the occurrence data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn occurrence(&self, id: OccurrenceId) -> Result<&OccurrenceData, DocumentError> {
        self.occurrences
            .get(id)
            .ok_or(DocumentError::EntityNotFound("occurrence"))
    }

    fn occurrence_mut(&mut self, id: OccurrenceId) -> Result<&mut OccurrenceData, DocumentError> {
        self.occurrences
            .get_mut(id)
            .ok_or(DocumentError::EntityNotFound("occurrence"))
    }

    /// Appends `child` to the ordered child list of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if either occurrence is missing, if `parent` is an
    /// instance, or if `child` is already attached elsewhere.
    pub fn attach_occurrence(
        &mut self,
        parent: OccurrenceId,
        child: OccurrenceId,
    ) -> Result<(), DocumentError> {
        if parent == child {
            return Err(DocumentError::InvalidStructure(
                "an occurrence cannot contain itself".into(),
            ));
        }
        if self.occurrence(child)?.parent.is_some() {
            return Err(DocumentError::InvalidStructure(
                "occurrence is already attached".into(),
            ));
        }
        let parent_data = self.occurrence_mut(parent)?;
        if parent_data.prototype.is_some() {
            return Err(DocumentError::InvalidStructure(
                "an instance cannot own child occurrences".into(),
            ));
        }
        parent_data.children.push(child);
        self.occurrence_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Removes `child` from its parent's occurrence list.
    ///
    /// The detached subtree stays in the store but is no longer reachable
    /// from the root, so traversals and copies ignore it.
    ///
    /// # Errors
    ///
    /// Returns an error if the occurrence is missing or has no parent.
    pub fn detach_occurrence(&mut self, child: OccurrenceId) -> Result<(), DocumentError> {
        let parent = self
            .occurrence(child)?
            .parent
            .ok_or(DocumentError::NotInContainer {
                child: "occurrence",
                container: "parent occurrence",
            })?;
        let siblings = &mut self.occurrence_mut(parent)?.children;
        let position = siblings
            .iter()
            .position(|&c| c == child)
            .ok_or(DocumentError::NotInContainer {
                child: "occurrence",
                container: "parent occurrence",
            })?;
        siblings.remove(position);
        self.occurrence_mut(child)?.parent = None;
        Ok(())
    }

    // --- Part operations ---

    /// Inserts a detached part and returns its ID.
    pub fn add_part(&mut self, name: impl Into<String>) -> PartId {
        self.parts.insert(PartData {
            name: name.into(),
            ..PartData::default()
        })
    }

    /// Returns a reference to the part data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn part(&self, id: PartId) -> Result<&PartData, DocumentError> {
        self.parts
            .get(id)
            .ok_or(DocumentError::EntityNotFound("part"))
    }

    fn part_mut(&mut self, id: PartId) -> Result<&mut PartData, DocumentError> {
        self.parts
            .get_mut(id)
            .ok_or(DocumentError::EntityNotFound("part"))
    }

    /// Makes `part` the part carried by `occurrence`.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is missing or the occurrence is an
    /// instance.
    pub fn attach_part(&mut self, occurrence: OccurrenceId, part: PartId) -> Result<(), DocumentError> {
        self.part(part)?;
        let data = self.occurrence_mut(occurrence)?;
        if data.prototype.is_some() {
            return Err(DocumentError::InvalidStructure(
                "an instance cannot carry its own part".into(),
            ));
        }
        data.part = Some(part);
        self.part_mut(part)?.owner = Some(occurrence);
        Ok(())
    }

    // --- Item operations ---

    /// Inserts a detached, empty body item and returns its ID.
    pub fn add_brep(&mut self, name: impl Into<String>) -> ItemId {
        self.items.insert(ItemData {
            name: name.into(),
            kind: ItemKind::Brep(BrepData::default()),
            owner: None,
        })
    }

    /// Inserts a detached, empty set item and returns its ID.
    pub fn add_set(&mut self, name: impl Into<String>) -> ItemId {
        self.items.insert(ItemData {
            name: name.into(),
            kind: ItemKind::Set(Vec::new()),
            owner: None,
        })
    }

    /// Returns a reference to the item data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn item(&self, id: ItemId) -> Result<&ItemData, DocumentError> {
        self.items
            .get(id)
            .ok_or(DocumentError::EntityNotFound("item"))
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut ItemData, DocumentError> {
        self.items
            .get_mut(id)
            .ok_or(DocumentError::EntityNotFound("item"))
    }

    /// Returns the B-rep payload of a body item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing or is a set.
    pub fn brep(&self, id: ItemId) -> Result<&BrepData, DocumentError> {
        self.item(id)?
            .brep()
            .ok_or_else(|| DocumentError::InvalidStructure("item is not a body".into()))
    }

    fn brep_mut(&mut self, id: ItemId) -> Result<&mut BrepData, DocumentError> {
        match &mut self.item_mut(id)?.kind {
            ItemKind::Brep(brep) => Ok(brep),
            ItemKind::Set(_) => Err(DocumentError::InvalidStructure("item is not a body".into())),
        }
    }

    fn item_list_mut(&mut self, owner: ItemOwner) -> Result<&mut Vec<ItemId>, DocumentError> {
        match owner {
            ItemOwner::Part(part) => Ok(&mut self.part_mut(part)?.items),
            ItemOwner::Set(set) => match &mut self.item_mut(set)?.kind {
                ItemKind::Set(members) => Ok(members),
                ItemKind::Brep(_) => {
                    Err(DocumentError::InvalidStructure("item is not a set".into()))
                }
            },
        }
    }

    /// Appends a detached `item` to the list owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if either entity is missing, the owner is a body, the
    /// item is already attached, or the owner is `item` or nested inside it.
    pub fn push_item(&mut self, owner: ItemOwner, item: ItemId) -> Result<(), DocumentError> {
        if self.item(item)?.owner.is_some() {
            return Err(DocumentError::InvalidStructure("item is already attached".into()));
        }
        self.check_not_within(owner, item)?;
        self.item_list_mut(owner)?.push(item);
        self.item_mut(item)?.owner = Some(owner);
        Ok(())
    }

    /// Puts the detached item `new` at the position `old` holds in its
    /// containing list and detaches `old`.
    ///
    /// # Errors
    ///
    /// Returns an error if either item is missing, `old` is detached, `new`
    /// is already attached, or `old` is nested inside `new`.
    pub fn replace_item(&mut self, old: ItemId, new: ItemId) -> Result<(), DocumentError> {
        if self.item(new)?.owner.is_some() {
            return Err(DocumentError::InvalidStructure("item is already attached".into()));
        }
        let owner = self.item(old)?.owner.ok_or(DocumentError::NotInContainer {
            child: "item",
            container: "item list",
        })?;
        self.check_not_within(owner, new)?;
        let list = self.item_list_mut(owner)?;
        let slot = list
            .iter_mut()
            .find(|slot| **slot == old)
            .ok_or(DocumentError::NotInContainer {
                child: "item",
                container: "item list",
            })?;
        *slot = new;
        self.item_mut(new)?.owner = Some(owner);
        self.item_mut(old)?.owner = None;
        Ok(())
    }

    /// Fails if placing `item` under `owner` would nest a set inside itself.
    fn check_not_within(&self, owner: ItemOwner, item: ItemId) -> Result<(), DocumentError> {
        let mut current = owner;
        while let ItemOwner::Set(set) = current {
            if set == item {
                return Err(DocumentError::InvalidStructure(
                    "a set cannot contain itself".into(),
                ));
            }
            match self.item(set)?.owner {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Ok(())
    }

    /// Omits `item` from its containing list.
    ///
    /// Nothing else is compacted: a part or set left empty stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing or detached.
    pub fn remove_item(&mut self, item: ItemId) -> Result<(), DocumentError> {
        let owner = self.item(item)?.owner.ok_or(DocumentError::NotInContainer {
            child: "item",
            container: "item list",
        })?;
        let list = self.item_list_mut(owner)?;
        let position = list
            .iter()
            .position(|&i| i == item)
            .ok_or(DocumentError::NotInContainer {
                child: "item",
                container: "item list",
            })?;
        list.remove(position);
        self.item_mut(item)?.owner = None;
        Ok(())
    }

    // --- Sub-entity operations ---

    /// Adds a face to a body item and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing or is not a body.
    pub fn add_face(&mut self, brep: ItemId, surface: FaceSurface) -> Result<FaceId, DocumentError> {
        self.brep(brep)?;
        let face = self.faces.insert(FaceData { brep, surface });
        self.brep_mut(brep)?.faces.push(face);
        Ok(face)
    }

    /// Adds an edge to a body item and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing or is not a body.
    pub fn add_edge(&mut self, brep: ItemId) -> Result<EdgeId, DocumentError> {
        self.brep(brep)?;
        let edge = self.edges.insert(EdgeData { brep });
        self.brep_mut(brep)?.edges.push(edge);
        Ok(edge)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, DocumentError> {
        self.faces
            .get(id)
            .ok_or(DocumentError::EntityNotFound("face"))
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, DocumentError> {
        self.edges
            .get(id)
            .ok_or(DocumentError::EntityNotFound("edge"))
    }
}
