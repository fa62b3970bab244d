use super::part::PartId;

slotmap::new_key_type! {
    /// Unique identifier for a product occurrence in the document tree.
    pub struct OccurrenceId;
}

/// Data associated with a product occurrence.
///
/// An occurrence either owns its content (an optional part and ordered child
/// occurrences) or is an instance of a defining occurrence, in which case
/// `prototype` is set and the content fields stay empty.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceData {
    /// Display name.
    pub name: String,
    /// The part carried by this occurrence, if any.
    pub part: Option<PartId>,
    /// Ordered child occurrences.
    pub children: Vec<OccurrenceId>,
    /// Defining occurrence whose content this occurrence instances.
    pub prototype: Option<OccurrenceId>,
    /// Parent occurrence, `None` for the root and for detached subtrees.
    pub parent: Option<OccurrenceId>,
}
