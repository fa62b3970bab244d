use tracing::debug;

use crate::document::{Component, FaceId, ItemId, SubEntity};
use crate::error::Result;
use crate::kernel::{RelatedFaceKind, SolidKernel, SubTag, Translator};
use crate::session::Session;

/// Collects the faces of a body related to a seed face.
pub struct FindRelatedFaces {
    brep: ItemId,
    face: FaceId,
    kind: RelatedFaceKind,
}

impl FindRelatedFaces {
    /// Creates a new `FindRelatedFaces` query.
    #[must_use]
    pub fn new(brep: ItemId, face: FaceId, kind: RelatedFaceKind) -> Self {
        Self { brep, face, kind }
    }

    /// Runs the query and returns the related face components, seed first.
    ///
    /// Kernel faces with no document counterpart are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed face has no kernel tag or the kernel
    /// query fails.
    pub fn execute<K: SolidKernel + Translator>(
        &self,
        session: &mut Session<K>,
    ) -> Result<Vec<Component>> {
        let seed = session.resolve_face(self.brep, self.face)?;
        let tags = session.kernel.find_related_faces(self.kind, seed)?;
        let faces = tags
            .into_iter()
            .filter_map(
                |tag| match session.correlation.sub_entity(self.brep, SubTag::Face(tag)) {
                    Ok(SubEntity::Face(face)) => Some(Component::Face(face)),
                    Ok(SubEntity::Edge(_)) | Err(_) => {
                        debug!(%tag, "related face has no document counterpart");
                        None
                    }
                },
            )
            .collect();
        Ok(faces)
    }
}
