use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::correlation::{ComponentIndex, CorrelationEntry, EntityCorrelationTable};
use crate::document::{Component, DocumentTree, EdgeId, FaceId, ItemId, SubEntity};
use crate::error::{DocumentError, KernelError, Result, TranslationError};
use crate::kernel::{BodyTag, EdgeTag, FaceTag, SolidKernel, SubTag, Translator};
use crate::ledger::UpdateLedger;
use crate::reconcile::{Reconciliation, TreeReconciler};

/// Notification for the viewer layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The active document was replaced wholesale; any held reference to the
    /// previous document is stale and the viewer must re-attach.
    DocumentReplaced,
    /// A body item was spliced into the active document.
    BodyAdded { brep: ItemId, body: BodyTag },
}

/// One modeling session over one active document.
///
/// Owns the kernel bridge and every piece of mutable correlation state, so
/// independent sessions never share anything. Everything runs synchronously
/// on the caller's thread; the type is not meant to be shared between
/// threads.
#[derive(Debug)]
pub struct Session<K> {
    pub(crate) kernel: K,
    pub(crate) document: Option<DocumentTree>,
    pub(crate) correlation: EntityCorrelationTable,
    pub(crate) components: ComponentIndex,
    pub(crate) ledger: UpdateLedger,
    pub(crate) owner_path: Vec<Component>,
    pub(crate) events: Vec<SessionEvent>,
    config: SessionConfig,
}

impl<K: SolidKernel + Translator> Session<K> {
    /// Creates a session without a document, using the default config.
    pub fn new(kernel: K) -> Self {
        Self::with_config(kernel, SessionConfig::default())
    }

    /// Creates a session without a document.
    pub fn with_config(kernel: K, config: SessionConfig) -> Self {
        Self {
            kernel,
            document: None,
            correlation: EntityCorrelationTable::new(),
            components: ComponentIndex::new(),
            ledger: UpdateLedger::new(),
            owner_path: Vec::new(),
            events: Vec::new(),
            config,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The kernel bridge.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Mutable access to the kernel bridge.
    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    /// The active document, if any.
    pub fn document(&self) -> Option<&DocumentTree> {
        self.document.as_ref()
    }

    /// The correlation table.
    pub fn correlation(&self) -> &EntityCorrelationTable {
        &self.correlation
    }

    /// The component index.
    pub fn components(&self) -> &ComponentIndex {
        &self.components
    }

    /// Pending changes not yet reconciled.
    pub fn ledger(&self) -> &UpdateLedger {
        &self.ledger
    }

    /// Cached owner chain of the most recently added body, innermost first.
    pub fn owner_path(&self) -> &[Component] {
        &self.owner_path
    }

    /// Drains the notifications raised since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ends the session: drops the document and all correlation state and
    /// resets the kernel.
    pub fn reset(&mut self) {
        self.kernel.reset();
        self.document = None;
        self.correlation.clear();
        self.components.clear();
        self.ledger.clear();
        self.owner_path.clear();
        info!("session reset");
    }

    /// Starts a new session on `document` and indexes its bodies.
    ///
    /// # Errors
    ///
    /// Returns an error if indexing fails; the document stays active.
    pub fn open_document(&mut self, document: DocumentTree) -> Result<()> {
        self.reset();
        self.document = Some(document);
        self.events.push(SessionEvent::DocumentReplaced);
        self.rebuild_components()
    }

    /// Rebuilds the component index from the active document's root.
    ///
    /// # Errors
    ///
    /// Returns an error if navigation or a translation fails.
    pub fn rebuild_components(&mut self) -> Result<()> {
        let Some(document) = self.document.as_ref() else {
            self.components.clear();
            return Ok(());
        };
        match document.root() {
            Some(root) => self.components.build(
                document,
                &mut self.correlation,
                &mut self.kernel,
                Component::Occurrence(root),
            ),
            None => {
                self.components.clear();
                Ok(())
            }
        }
    }

    /// Returns the kernel tag of a body item, or of one of its faces or
    /// edges, for display. Returns `0` when there is no such tag.
    pub fn entity_tag(&mut self, brep: ItemId, sub: Option<SubEntity>) -> u32 {
        let tag = self.resolve_body(brep).and_then(|body| match sub {
            None => Ok(body.raw()),
            Some(entity) => Ok(self.correlation.sub_tag(brep, entity)?.raw()),
        });
        tag.unwrap_or_else(|err| {
            debug!(?brep, ?sub, %err, "no kernel tag");
            0
        })
    }

    /// Returns the document component showing a kernel body, or one of its
    /// faces or edges.
    ///
    /// # Errors
    ///
    /// Returns an error if no document is loaded or navigation fails.
    pub fn component(&mut self, body: BodyTag, sub: Option<SubTag>) -> Result<Option<Component>> {
        let document = self.document.as_ref().ok_or(DocumentError::NoDocument)?;
        self.components.lookup(document, &self.correlation, body, sub)
    }

    /// Produces a copy of the active document with every pending change
    /// applied. Unless configured otherwise the ledger is cleared afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if no document is loaded or reconciliation fails; the
    /// ledger is kept in that case.
    pub fn export_copy(&mut self) -> Result<Reconciliation> {
        let document = self.document.as_ref().ok_or(DocumentError::NoDocument)?;
        let reconciliation = TreeReconciler::new()
            .verify_copy_order(self.config.verify_copy_order)
            .execute(document, &mut self.ledger, &mut self.kernel)?;
        if self.config.consume_ledger_on_reconcile {
            self.ledger.clear();
        }
        Ok(reconciliation)
    }

    // --- Helpers for edit operations ---

    pub(crate) fn document_ref(&self) -> Result<&DocumentTree> {
        self.document
            .as_ref()
            .ok_or_else(|| DocumentError::NoDocument.into())
    }

    /// Returns the kernel body of `brep`, translating it on first use.
    pub(crate) fn resolve_body(&mut self, brep: ItemId) -> Result<BodyTag> {
        let document = self.document.as_ref().ok_or(DocumentError::NoDocument)?;
        let body = self
            .correlation
            .resolve(&mut self.kernel, document, brep, true)?
            .ok_or_else(|| TranslationError::NoMatch("kernel body for item".into()))?;
        Ok(body)
    }

    pub(crate) fn resolve_face(&mut self, brep: ItemId, face: FaceId) -> Result<FaceTag> {
        self.resolve_body(brep)?;
        match self.correlation.sub_tag(brep, SubEntity::Face(face))? {
            SubTag::Face(tag) => Ok(tag),
            SubTag::Edge(_) => Err(TranslationError::NoMatch("face tag".into()).into()),
        }
    }

    pub(crate) fn resolve_edge(&mut self, brep: ItemId, edge: EdgeId) -> Result<EdgeTag> {
        self.resolve_body(brep)?;
        match self.correlation.sub_tag(brep, SubEntity::Edge(edge))? {
            SubTag::Edge(tag) => Ok(tag),
            SubTag::Face(_) => Err(TranslationError::NoMatch("edge tag".into()).into()),
        }
    }

    /// Records that `brep`, previously `previous`, is now the kernel body
    /// `body`.
    ///
    /// Face and edge links whose kernel tags survived the edit are carried
    /// over; links to retired tags are dropped.
    pub(crate) fn commit_update(&mut self, brep: ItemId, previous: BodyTag, body: BodyTag) {
        let carried = self
            .correlation
            .get(brep)
            .and_then(CorrelationEntry::context)
            .map(|context| {
                let faces = self.kernel.faces(body)?;
                let edges = self.kernel.edges(body)?;
                Ok::<_, KernelError>(context.carry_over(body, &faces, &edges))
            });
        match carried {
            Some(Ok(context)) => {
                self.correlation.install(context);
            }
            Some(Err(err)) => {
                warn!(?brep, %body, %err, "cannot query regenerated body; dropping sub-entity links");
                self.correlation.replace(brep, body);
            }
            None => {
                self.correlation.replace(brep, body);
            }
        }
        if previous != body {
            self.components.invalidate(previous);
        }
        self.components.reinit(body, Component::Body(brep));
        self.ledger.register_update(brep, body);
    }

    /// Records that `brep` no longer has a kernel body.
    pub(crate) fn commit_delete_body(&mut self, brep: ItemId) {
        if let Some(entry) = self.correlation.remove(brep) {
            self.components.invalidate(entry.body());
        }
        self.ledger.register_delete_body(brep);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::fixtures::{body_names, single_part};
    use crate::kernel::MockKernel;
    use crate::operations::DeleteComponent;

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn session_on(names: &[&str]) -> (Session<MockKernel>, Vec<ItemId>) {
        init_logging();
        let (doc, _, bodies) = single_part(names);
        let mut session = Session::new(MockKernel::new());
        session.open_document(doc).unwrap();
        (session, bodies)
    }

    #[test]
    fn open_document_indexes_and_notifies() {
        let (mut session, bodies) = session_on(&["a"]);

        assert_eq!(session.take_events(), vec![SessionEvent::DocumentReplaced]);
        assert!(session.take_events().is_empty());
        let body = session.correlation().body(bodies[0]).unwrap();
        assert_eq!(
            session.component(body, None).unwrap(),
            Some(Component::Body(bodies[0]))
        );
    }

    #[test]
    fn entity_tag_for_body_and_face() {
        let (mut session, bodies) = session_on(&["a", "b"]);
        let face = session.document().unwrap().brep(bodies[1]).unwrap().faces[0];

        let body_tag = session.entity_tag(bodies[1], None);
        let face_tag = session.entity_tag(bodies[1], Some(SubEntity::Face(face)));

        assert_ne!(body_tag, 0);
        assert_ne!(face_tag, 0);
        assert_ne!(face_tag, body_tag);
        assert_eq!(session.correlation().body(bodies[1]).map(BodyTag::raw), Some(body_tag));
    }

    #[test]
    fn entity_tag_is_zero_when_translation_fails() {
        let (mut session, bodies) = session_on(&["a", "b"]);
        session.kernel_mut().fail_translations(true);

        assert_eq!(session.entity_tag(bodies[1], None), 0);
    }

    #[test]
    fn reset_clears_everything() {
        let (mut session, bodies) = session_on(&["a"]);
        DeleteComponent::new(Component::Body(bodies[0]))
            .execute(&mut session)
            .unwrap();

        session.reset();

        assert!(session.document().is_none());
        assert!(session.correlation().is_empty());
        assert!(session.components().is_empty());
        assert!(session.ledger().is_empty());
        assert_eq!(session.kernel().body_count(), 0);
    }

    #[test]
    fn export_copy_consumes_ledger() {
        let (mut session, bodies) = session_on(&["a", "b"]);
        DeleteComponent::new(Component::Body(bodies[0]))
            .execute(&mut session)
            .unwrap();

        let first = session.export_copy().unwrap();
        let second = session.export_copy().unwrap();

        assert_eq!(body_names(&first.document), vec!["b"]);
        assert_eq!(first.applied, 1);
        assert!(session.ledger().is_empty());
        assert_eq!(second.applied, 0);
        assert_eq!(body_names(&second.document), vec!["a", "b"]);
    }

    #[test]
    fn export_copy_can_retain_ledger() {
        init_logging();
        let (doc, _, bodies) = single_part(&["a", "b"]);
        let config = SessionConfig {
            consume_ledger_on_reconcile: false,
            ..SessionConfig::default()
        };
        let mut session = Session::with_config(MockKernel::new(), config);
        session.open_document(doc).unwrap();
        DeleteComponent::new(Component::Body(bodies[1]))
            .execute(&mut session)
            .unwrap();

        session.export_copy().unwrap();

        assert_eq!(session.ledger().len(), 1);
        assert_eq!(session.ledger().records()[0].ordinal, Some(1));
    }

    #[test]
    fn export_without_document_fails() {
        let mut session = Session::new(MockKernel::new());
        assert!(session.export_copy().is_err());
    }
}
