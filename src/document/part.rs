use super::item::ItemId;
use super::occurrence::OccurrenceId;

slotmap::new_key_type! {
    /// Unique identifier for a part definition in the document tree.
    pub struct PartId;
}

/// Data associated with a part definition.
#[derive(Debug, Clone, Default)]
pub struct PartData {
    /// Display name.
    pub name: String,
    /// Ordered representation items.
    pub items: Vec<ItemId>,
    /// The occurrence carrying this part.
    pub owner: Option<OccurrenceId>,
}
