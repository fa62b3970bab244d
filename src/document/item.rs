use super::entity::{EdgeId, FaceId};
use super::part::PartId;

slotmap::new_key_type! {
    /// Unique identifier for a representation item (B-rep body or set).
    pub struct ItemId;
}

/// Container holding a representation item in its ordered item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOwner {
    /// Item sits directly in a part's item list.
    Part(PartId),
    /// Item is a member of a grouping set.
    Set(ItemId),
}

/// Boundary-representation payload of a body item.
#[derive(Debug, Clone, Default)]
pub struct BrepData {
    /// Faces of the body, in definition order.
    pub faces: Vec<FaceId>,
    /// Edges of the body, in definition order.
    pub edges: Vec<EdgeId>,
}

/// Kind-specific payload of a representation item.
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// A body carrying boundary representation.
    Brep(BrepData),
    /// A grouping node with its own ordered item list.
    Set(Vec<ItemId>),
}

/// Data associated with a representation item.
#[derive(Debug, Clone)]
pub struct ItemData {
    /// Display name.
    pub name: String,
    /// Body or set payload.
    pub kind: ItemKind,
    /// Containing list, `None` while detached.
    pub owner: Option<ItemOwner>,
}

impl ItemData {
    /// Returns the B-rep payload if this item is a body.
    #[must_use]
    pub fn brep(&self) -> Option<&BrepData> {
        match &self.kind {
            ItemKind::Brep(brep) => Some(brep),
            ItemKind::Set(_) => None,
        }
    }

    /// Returns `true` if this item is a body.
    #[must_use]
    pub fn is_brep(&self) -> bool {
        matches!(self.kind, ItemKind::Brep(_))
    }
}
