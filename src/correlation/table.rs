use std::collections::HashMap;

use tracing::{debug, warn};

use crate::document::{DocumentTree, ItemId, SubEntity};
use crate::error::TranslationError;
use crate::kernel::{BodyTag, SubTag, TranslationContext, Translator};

/// Correlation between one document body item and one kernel body.
///
/// Entries are never updated in place: a regenerated body gets a fresh
/// entry and the old one, with its translation context, is dropped.
#[derive(Debug)]
pub struct CorrelationEntry {
    brep: ItemId,
    body: BodyTag,
    context: Option<TranslationContext>,
}

impl CorrelationEntry {
    /// The document body item.
    #[must_use]
    pub fn brep(&self) -> ItemId {
        self.brep
    }

    /// The kernel body.
    #[must_use]
    pub fn body(&self) -> BodyTag {
        self.body
    }

    /// The translation context, absent once the body has been regenerated by
    /// an edit.
    #[must_use]
    pub fn context(&self) -> Option<&TranslationContext> {
        self.context.as_ref()
    }
}

/// Per-document map from body item to kernel body, populated on demand.
#[derive(Debug, Default)]
pub struct EntityCorrelationTable {
    entries: HashMap<ItemId, CorrelationEntry>,
}

impl EntityCorrelationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry of a body item.
    #[must_use]
    pub fn get(&self, brep: ItemId) -> Option<&CorrelationEntry> {
        self.entries.get(&brep)
    }

    /// Returns the cached kernel body of a body item.
    #[must_use]
    pub fn body(&self, brep: ItemId) -> Option<BodyTag> {
        self.entries.get(&brep).map(CorrelationEntry::body)
    }

    /// Returns the body item correlated with a kernel body.
    #[must_use]
    pub fn brep_of(&self, body: BodyTag) -> Option<ItemId> {
        self.entries
            .values()
            .find(|entry| entry.body == body)
            .map(CorrelationEntry::brep)
    }

    /// Iterates over all entries in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = &CorrelationEntry> {
        self.entries.values()
    }

    /// Returns the kernel body of `brep`, translating it first when it has no
    /// entry and `create_if_missing` is set.
    ///
    /// Returns `Ok(None)` when there is no entry and none was requested.
    ///
    /// # Errors
    ///
    /// Returns an error if translation fails; the table is left untouched.
    pub fn resolve<T: Translator + ?Sized>(
        &mut self,
        translator: &mut T,
        document: &DocumentTree,
        brep: ItemId,
        create_if_missing: bool,
    ) -> Result<Option<BodyTag>, TranslationError> {
        if let Some(body) = self.body(brep) {
            return Ok(Some(body));
        }
        if !create_if_missing {
            return Ok(None);
        }
        let context = translator.translate(document, brep)?;
        if context.brep() != brep {
            return Err(TranslationError::Failed(
                "translation answered for a different item".into(),
            ));
        }
        let body = context.body();
        self.install(context);
        Ok(Some(body))
    }

    /// Installs a fresh entry from a translation context.
    ///
    /// Any entry for the same item, and any entry already holding the same
    /// kernel tag, is retired first. Returns `true` if an entry was retired.
    pub fn install(&mut self, context: TranslationContext) -> bool {
        let brep = context.brep();
        let body = context.body();
        let retired = self.retire(brep, body);
        self.entries.insert(
            brep,
            CorrelationEntry {
                brep,
                body,
                context: Some(context),
            },
        );
        debug!(?brep, %body, "installed correlation entry");
        retired
    }

    /// Correlates `brep` with a regenerated `body`.
    ///
    /// The previous context of `brep` is retired, so sub-entity tags obtained
    /// through it must no longer be used. Returns `true` if an entry was
    /// retired.
    pub fn replace(&mut self, brep: ItemId, body: BodyTag) -> bool {
        let retired = self.retire(brep, body);
        self.entries.insert(
            brep,
            CorrelationEntry {
                brep,
                body,
                context: None,
            },
        );
        debug!(?brep, %body, "replaced correlation entry");
        retired
    }

    /// Removes the entry of a body item.
    pub fn remove(&mut self, brep: ItemId) -> Option<CorrelationEntry> {
        self.entries.remove(&brep)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn retire(&mut self, brep: ItemId, body: BodyTag) -> bool {
        // Match on the tag value: a reused tag may still sit under another item.
        let stale: Vec<ItemId> = self
            .entries
            .values()
            .filter(|entry| entry.body == body && entry.brep != brep)
            .map(CorrelationEntry::brep)
            .collect();
        for other in &stale {
            warn!(?other, %body, "evicting entry that reuses kernel tag");
            self.entries.remove(other);
        }
        self.entries.remove(&brep).is_some() || !stale.is_empty()
    }

    /// Returns the kernel tag of a face or edge of `brep`.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::NoMatch`] if `brep` has no entry, its
    /// context was retired, or the sub-entity is not part of it.
    pub fn sub_tag(&self, brep: ItemId, entity: SubEntity) -> Result<SubTag, TranslationError> {
        self.context(brep)?.sub_tag(entity)
    }

    /// Returns the face or edge of `brep` behind a kernel tag.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::NoMatch`] if `brep` has no entry, its
    /// context was retired, or the tag is not part of it.
    pub fn sub_entity(&self, brep: ItemId, tag: SubTag) -> Result<SubEntity, TranslationError> {
        self.context(brep)?.sub_entity(tag)
    }

    fn context(&self, brep: ItemId) -> Result<&TranslationContext, TranslationError> {
        let entry = self
            .entries
            .get(&brep)
            .ok_or_else(|| TranslationError::NoMatch("correlation for body item".into()))?;
        entry.context.as_ref().ok_or_else(|| {
            TranslationError::NoMatch(format!("current sub-entities of regenerated body {}", entry.body))
        })
    }
}
