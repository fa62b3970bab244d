use tracing::info;

use crate::document::{FaceId, ItemId};
use crate::error::{OperationError, Result};
use crate::kernel::{SolidKernel, Translator};
use crate::session::Session;

/// Removes faces from a body and lets the kernel heal the gap.
pub struct DeleteFaces {
    brep: ItemId,
    faces: Vec<FaceId>,
}

impl DeleteFaces {
    /// Creates a new `DeleteFaces` operation.
    #[must_use]
    pub fn new(brep: ItemId, faces: Vec<FaceId>) -> Self {
        Self { brep, faces }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if no face is given, a face has no kernel tag, or
    /// the kernel rejects the operation.
    pub fn execute<K: SolidKernel + Translator>(&self, session: &mut Session<K>) -> Result<()> {
        if self.faces.is_empty() {
            return Err(OperationError::InvalidInput("no faces to delete".into()).into());
        }
        let body = session.resolve_body(self.brep)?;
        let faces = self
            .faces
            .iter()
            .map(|&face| session.resolve_face(self.brep, face))
            .collect::<Result<Vec<_>>>()?;

        session.kernel.delete_faces(&faces)?;

        session.commit_update(self.brep, body, body);
        info!(brep = ?self.brep, %body, faces = faces.len(), "deleted faces");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::fixtures::single_part;
    use crate::error::BridgeError;
    use crate::kernel::MockKernel;

    #[test]
    fn deleted_face_leaves_kernel_body() {
        let (doc, _, bodies) = single_part(&["a"]);
        let mut session = Session::new(MockKernel::new());
        session.open_document(doc).unwrap();
        let face = session.document().unwrap().brep(bodies[0]).unwrap().faces[0];
        let body = session.correlation().body(bodies[0]).unwrap();

        DeleteFaces::new(bodies[0], vec![face])
            .execute(&mut session)
            .unwrap();

        assert_eq!(session.kernel().faces(body).unwrap().len(), 1);
        assert_eq!(session.ledger().len(), 1);
    }

    #[test]
    fn deleting_every_face_is_rejected() {
        let (doc, _, bodies) = single_part(&["a"]);
        let mut session = Session::new(MockKernel::new());
        session.open_document(doc).unwrap();
        let faces = session.document().unwrap().brep(bodies[0]).unwrap().faces.clone();

        let result = DeleteFaces::new(bodies[0], faces).execute(&mut session);

        assert!(matches!(result, Err(BridgeError::Kernel(_))));
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn face_of_other_body_has_no_tag() {
        let (doc, _, bodies) = single_part(&["a", "b"]);
        let mut session = Session::new(MockKernel::new());
        session.open_document(doc).unwrap();
        let foreign = session.document().unwrap().brep(bodies[1]).unwrap().faces[0];

        let result = DeleteFaces::new(bodies[0], vec![foreign]).execute(&mut session);

        assert!(matches!(result, Err(BridgeError::Translation(_))));
    }
}
