use tracing::{info, warn};

use crate::document::{FaceId, ItemId};
use crate::error::Result;
use crate::kernel::{SolidKernel, Translator};
use crate::math::{Point3, Vector3};
use crate::session::Session;

use super::AddBody;

/// Plane a body is mirrored across.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MirrorPlane {
    /// Plane through `point` with normal `normal`.
    Explicit { point: Point3, normal: Vector3 },
    /// Plane of a planar face of some body item.
    Face { brep: ItemId, face: FaceId },
}

/// Mirrors a body, in place or as a copy.
pub struct MirrorEdit {
    brep: ItemId,
    plane: MirrorPlane,
    copy: bool,
    merge: bool,
}

impl MirrorEdit {
    /// Creates a new `MirrorEdit` that mirrors `brep` in place.
    #[must_use]
    pub fn new(brep: ItemId, plane: MirrorPlane) -> Self {
        Self {
            brep,
            plane,
            copy: false,
            merge: false,
        }
    }

    /// Keeps the original and produces a mirror image. With `merge` the image
    /// joins the original body, otherwise it becomes a new body.
    #[must_use]
    pub fn copy(mut self, merge: bool) -> Self {
        self.copy = true;
        self.merge = merge;
        self
    }

    /// Executes the mirror. Returns the item added for a separate mirror
    /// image, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the body or plane face cannot be translated, the
    /// plane face is not planar, or the kernel rejects the mirror. A separate
    /// image that cannot be added to the document is discarded from the
    /// kernel.
    pub fn execute<K: SolidKernel + Translator>(
        &self,
        session: &mut Session<K>,
    ) -> Result<Option<ItemId>> {
        let body = session.resolve_body(self.brep)?;
        let (point, normal) = match self.plane {
            MirrorPlane::Explicit { point, normal } => (point, normal),
            MirrorPlane::Face { brep, face } => {
                let tag = session.resolve_face(brep, face)?;
                session.kernel.plane_info(tag)?
            }
        };

        let image = session
            .kernel
            .mirror_body(body, point, normal, self.copy, self.merge)?;

        match image {
            Some(image) => match AddBody::new(image).execute(session) {
                Ok(added) => {
                    info!(brep = ?self.brep, %body, %image, "mirrored body into a copy");
                    Ok(Some(added))
                }
                Err(err) => {
                    if let Err(cleanup) = session.kernel.delete_body(image) {
                        warn!(%image, %cleanup, "could not discard orphaned mirror image");
                    }
                    Err(err)
                }
            },
            None => {
                session.commit_update(self.brep, body, body);
                info!(brep = ?self.brep, %body, copy = self.copy, "mirrored body");
                Ok(None)
            }
        }
    }
}
