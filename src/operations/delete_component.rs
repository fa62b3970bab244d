use tracing::{debug, info};

use crate::document::{Component, ItemId, OccurrenceId};
use crate::error::{OperationError, Result};
use crate::kernel::{BodyTag, SolidKernel, Translator};
use crate::session::Session;

/// Deletes a body or a whole occurrence from the model.
pub struct DeleteComponent {
    component: Component,
}

impl DeleteComponent {
    /// Creates a new `DeleteComponent` operation.
    #[must_use]
    pub fn new(component: Component) -> Self {
        Self { component }
    }

    /// Executes the deletion.
    ///
    /// A body deletes its kernel body, if it has one. An occurrence, or a
    /// part through its owning occurrence, deletes the kernel bodies of every
    /// body item beneath it. Each such body is recorded as deleted as soon
    /// as the kernel drops it, so earlier edits to it never reach an
    /// exported copy. The live document keeps its nodes; the change reaches
    /// exported copies through the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error for faces, edges and sets, for the root occurrence
    /// or an unowned part, or if the kernel refuses a deletion. If the kernel
    /// refuses partway through an occurrence, the bodies already dropped stay
    /// recorded as deleted and the occurrence itself is not.
    pub fn execute<K: SolidKernel + Translator>(&self, session: &mut Session<K>) -> Result<()> {
        match self.component {
            Component::Body(brep) => delete_body(session, brep),
            Component::Occurrence(occurrence) => delete_occurrence(session, occurrence),
            Component::Part(part) => {
                let owner = session
                    .document_ref()?
                    .part(part)?
                    .owner
                    .ok_or_else(|| OperationError::InvalidInput("part has no occurrence".into()))?;
                delete_occurrence(session, owner)
            }
            Component::Set(_) | Component::Face(_) | Component::Edge(_) => Err(
                OperationError::Unsupported(format!("deleting {:?}", self.component)).into(),
            ),
        }
    }
}

fn delete_body<K: SolidKernel + Translator>(session: &mut Session<K>, brep: ItemId) -> Result<()> {
    session.document_ref()?.brep(brep)?;
    if let Some(body) = session.correlation.body(brep) {
        session.kernel.delete_body(body)?;
    }
    session.commit_delete_body(brep);
    info!(?brep, "deleted body");
    Ok(())
}

fn delete_occurrence<K: SolidKernel + Translator>(
    session: &mut Session<K>,
    occurrence: OccurrenceId,
) -> Result<()> {
    let document = session.document_ref()?;
    if document.root() == Some(occurrence) {
        return Err(OperationError::InvalidInput("cannot delete the root occurrence".into()).into());
    }
    let items = document.body_items(Component::Occurrence(occurrence))?;
    let bodies: Vec<(ItemId, BodyTag)> = items
        .iter()
        .filter_map(|&brep| session.correlation.body(brep).map(|body| (brep, body)))
        .collect();

    for &(brep, body) in &bodies {
        session.kernel.delete_body(body)?;
        session.commit_delete_body(brep);
        debug!(?brep, %body, "deleted kernel body of occurrence");
    }
    session.ledger.register_delete_part(occurrence);
    info!(?occurrence, bodies = bodies.len(), "deleted occurrence");
    Ok(())
}
