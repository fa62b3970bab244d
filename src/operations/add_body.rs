use tracing::{debug, info};

use crate::document::{
    Component, DocumentTree, ItemId, ItemOwner, OccurrenceId, PartId, Visit,
};
use crate::error::{DocumentError, Result};
use crate::kernel::{BodyTag, SolidKernel, TranslationContext, Translator};
use crate::session::{Session, SessionEvent};

/// How a new body is spliced into the active document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentShape {
    /// Nothing loaded: the body becomes a new document.
    Empty,
    /// The document has one part; the body joins its item list.
    SinglePart(PartId),
    /// Several parts; the body arrives as a new child occurrence of the root.
    Assembly(OccurrenceId),
}

/// Splices a kernel body into the active document.
pub struct AddBody {
    body: BodyTag,
}

impl AddBody {
    /// Creates a new `AddBody` operation.
    #[must_use]
    pub fn new(body: BodyTag) -> Self {
        Self { body }
    }

    /// Translates the body back into the document and correlates it.
    ///
    /// Returns the new body item. Raises [`SessionEvent::DocumentReplaced`]
    /// when a document had to be created, [`SessionEvent::BodyAdded`]
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be translated back or the document
    /// cannot be navigated.
    pub fn execute<K: SolidKernel + Translator>(&self, session: &mut Session<K>) -> Result<ItemId> {
        match document_shape(session)? {
            DocumentShape::Empty => self.into_new_document(session),
            DocumentShape::SinglePart(part) => self.into_part(session, part),
            DocumentShape::Assembly(root) => self.into_assembly(session, root),
        }
    }

    fn into_new_document<K: SolidKernel + Translator>(
        &self,
        session: &mut Session<K>,
    ) -> Result<ItemId> {
        let name = session.config().document_name.clone();
        let (document, context) = standalone_document(&mut session.kernel, &name, self.body)?;
        let brep = context.brep();

        session.correlation.clear();
        session.ledger.clear();
        session.correlation.install(context);
        session.owner_path = document.owner_path(Component::Body(brep))?;
        session.document = Some(document);
        session.rebuild_components()?;
        session.events.push(SessionEvent::DocumentReplaced);
        info!(body = %self.body, ?brep, "created document for new body");
        Ok(brep)
    }

    fn into_part<K: SolidKernel + Translator>(
        &self,
        session: &mut Session<K>,
        part: PartId,
    ) -> Result<ItemId> {
        let document = session.document.as_mut().ok_or(DocumentError::NoDocument)?;
        let context = session.kernel.translate_back(document, self.body)?;
        let brep = context.brep();
        document.push_item(ItemOwner::Part(part), brep)?;
        session.owner_path = document.owner_path(Component::Body(brep))?;

        session.correlation.install(context);
        session.components.reinit(self.body, Component::Body(brep));
        session.events.push(SessionEvent::BodyAdded {
            brep,
            body: self.body,
        });
        info!(body = %self.body, ?brep, ?part, "added body to part");
        Ok(brep)
    }

    fn into_assembly<K: SolidKernel + Translator>(
        &self,
        session: &mut Session<K>,
        root: OccurrenceId,
    ) -> Result<ItemId> {
        let name = format!("Body {}", self.body);
        let (standalone, context) = standalone_document(&mut session.kernel, &name, self.body)?;
        let standalone_root = standalone.root().ok_or(DocumentError::NoDocument)?;

        let document = session.document.as_mut().ok_or(DocumentError::NoDocument)?;
        let (occurrence, map) = standalone.copy_occurrence_into(standalone_root, document)?;
        let context = context.remap(&map)?;
        document.attach_occurrence(root, occurrence)?;
        let brep = context.brep();

        session.correlation.install(context);
        session.components.reinit(self.body, Component::Body(brep));
        session.owner_path.clear();
        session.events.push(SessionEvent::BodyAdded {
            brep,
            body: self.body,
        });
        info!(body = %self.body, ?brep, ?occurrence, "added body to assembly");
        Ok(brep)
    }
}

fn document_shape<K>(session: &Session<K>) -> Result<DocumentShape> {
    let Some(document) = session.document.as_ref() else {
        return Ok(DocumentShape::Empty);
    };
    let Some(root) = document.root() else {
        return Ok(DocumentShape::Empty);
    };

    let cached = session.owner_path.iter().find_map(|component| match component {
        Component::Part(part) => Some(*part),
        _ => None,
    });
    if let Some(part) = cached.filter(|&part| document.part(part).is_ok()) {
        debug!(?part, "using cached owner path");
        return Ok(DocumentShape::SinglePart(part));
    }

    let parts: Vec<PartId> = document
        .canonical_order()?
        .into_iter()
        .filter_map(|visit| match visit {
            Visit::Part(part) => Some(part),
            _ => None,
        })
        .collect();
    Ok(match parts.as_slice() {
        [part] => DocumentShape::SinglePart(*part),
        _ => DocumentShape::Assembly(root),
    })
}

/// Builds a one-occurrence, one-part document holding the translation of
/// `body`.
fn standalone_document<T: Translator + ?Sized>(
    translator: &mut T,
    name: &str,
    body: BodyTag,
) -> Result<(DocumentTree, TranslationContext)> {
    let mut document = DocumentTree::new();
    let occurrence = document.add_occurrence(name);
    document.set_root(occurrence)?;
    let part = document.add_part(name);
    document.attach_part(occurrence, part)?;
    let context = translator.translate_back(&mut document, body)?;
    document.push_item(ItemOwner::Part(part), context.brep())?;
    Ok((document, context))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::fixtures::{assembly, body_names, single_part};
    use crate::document::{SubEntity, TraversalCounts};
    use crate::kernel::{MockKernel, SolidShape, SubTag};
    use crate::math::{Point3, Vector3};

    fn block(session: &mut Session<MockKernel>) -> BodyTag {
        session
            .kernel_mut()
            .create_solid(
                SolidShape::Block,
                Vector3::new(1.0, 2.0, 3.0),
                Point3::origin(),
                Vector3::z(),
            )
            .unwrap()
    }

    #[test]
    fn empty_session_gets_minimal_document() {
        let mut session = Session::new(MockKernel::new());
        let body = block(&mut session);

        let brep = AddBody::new(body).execute(&mut session).unwrap();

        let doc = session.document().unwrap();
        let counts = TraversalCounts::of(&doc.canonical_order().unwrap());
        assert_eq!(counts.occurrences, 1);
        assert_eq!(counts.bodies, 1);
        let root = doc.root().unwrap();
        let part = doc.occurrence(root).unwrap().part.unwrap();
        assert_eq!(doc.part(part).unwrap().items, vec![brep]);
        assert_eq!(doc.occurrence(root).unwrap().name, "Untitled");
        assert_eq!(session.correlation().len(), 1);
        assert_eq!(session.correlation().body(brep), Some(body));
        assert_eq!(
            session.component(body, None).unwrap(),
            Some(Component::Body(brep))
        );
        assert_eq!(session.take_events(), vec![SessionEvent::DocumentReplaced]);
    }

    #[test]
    fn single_part_appends_item_and_caches_owner_path() {
        let (doc, part, _) = single_part(&["a"]);
        let mut session = Session::new(MockKernel::new());
        session.open_document(doc).unwrap();
        session.take_events();
        let body = block(&mut session);

        let brep = AddBody::new(body).execute(&mut session).unwrap();

        let doc = session.document().unwrap();
        assert_eq!(doc.part(part).unwrap().items.len(), 2);
        assert_eq!(doc.part(part).unwrap().items[1], brep);
        assert_eq!(session.owner_path()[0], Component::Body(brep));
        assert_eq!(session.owner_path()[1], Component::Part(part));
        assert_eq!(session.take_events(), vec![SessionEvent::BodyAdded { brep, body }]);
    }

    #[test]
    fn added_faces_resolve_both_ways() {
        let (doc, _, _) = single_part(&["a"]);
        let mut session = Session::new(MockKernel::new());
        session.open_document(doc).unwrap();
        let body = block(&mut session);
        let kernel_face = session.kernel().faces(body).unwrap()[2];

        let brep = AddBody::new(body).execute(&mut session).unwrap();

        let face = session.document().unwrap().brep(brep).unwrap().faces[2];
        assert_eq!(
            session.entity_tag(brep, Some(SubEntity::Face(face))),
            kernel_face.raw()
        );
        assert_eq!(
            session
                .component(body, Some(SubTag::Face(kernel_face)))
                .unwrap(),
            Some(Component::Face(face))
        );
    }

    #[test]
    fn assembly_gets_new_child_occurrence() {
        let (doc, occurrences, _) = assembly(&[&["a"], &["b"]]);
        let mut session = Session::new(MockKernel::new());
        session.open_document(doc).unwrap();
        let body = block(&mut session);

        let brep = AddBody::new(body).execute(&mut session).unwrap();

        let doc = session.document().unwrap();
        let root = doc.root().unwrap();
        let children = &doc.occurrence(root).unwrap().children;
        assert_eq!(children.len(), 3);
        assert_eq!(&children[..2], occurrences.as_slice());
        assert_eq!(
            body_names(doc),
            vec!["a".to_string(), "b".to_string(), format!("Body {body}")]
        );
        let path = doc.owner_path(Component::Body(brep)).unwrap();
        assert_eq!(path.last(), Some(&Component::Occurrence(root)));
        assert_eq!(session.correlation().body(brep), Some(body));
        assert!(session.owner_path().is_empty());
    }

    #[test]
    fn assembly_copy_keeps_sub_entity_correlation() {
        let (doc, _, _) = assembly(&[&["a"], &["b"]]);
        let mut session = Session::new(MockKernel::new());
        session.open_document(doc).unwrap();
        let body = block(&mut session);
        let kernel_edge = session.kernel().edges(body).unwrap()[5];

        let brep = AddBody::new(body).execute(&mut session).unwrap();

        let edge = session.document().unwrap().brep(brep).unwrap().edges[5];
        assert_eq!(
            session.entity_tag(brep, Some(SubEntity::Edge(edge))),
            kernel_edge.raw()
        );
    }

    #[test]
    fn unknown_body_leaves_document_untouched() {
        let (doc, part, _) = single_part(&["a"]);
        let mut session = Session::new(MockKernel::new());
        session.open_document(doc).unwrap();
        session.take_events();

        let result = AddBody::new(BodyTag::new(999).unwrap()).execute(&mut session);

        assert!(result.is_err());
        assert_eq!(session.document().unwrap().part(part).unwrap().items.len(), 1);
        assert!(session.take_events().is_empty());
    }
}
