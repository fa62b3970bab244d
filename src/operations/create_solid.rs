use tracing::{info, warn};

use crate::document::ItemId;
use crate::error::Result;
use crate::kernel::{SolidKernel, SolidShape, Translator};
use crate::math::{Point3, Vector3};
use crate::session::Session;

use super::AddBody;

/// Creates a primitive solid and adds it to the active document.
pub struct CreateSolid {
    shape: SolidShape,
    size: Vector3,
    offset: Point3,
    direction: Vector3,
}

impl CreateSolid {
    /// Creates a new `CreateSolid` operation.
    #[must_use]
    pub fn new(shape: SolidShape, size: Vector3, offset: Point3, direction: Vector3) -> Self {
        Self {
            shape,
            size,
            offset,
            direction,
        }
    }

    /// Executes the operation and returns the new body item.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the solid or it cannot be
    /// added to the document. The kernel body is discarded in the latter
    /// case.
    pub fn execute<K: SolidKernel + Translator>(&self, session: &mut Session<K>) -> Result<ItemId> {
        let body = session
            .kernel
            .create_solid(self.shape, self.size, self.offset, self.direction)?;
        match AddBody::new(body).execute(session) {
            Ok(brep) => {
                info!(shape = ?self.shape, %body, ?brep, "created solid");
                Ok(brep)
            }
            Err(err) => {
                if let Err(cleanup) = session.kernel.delete_body(body) {
                    warn!(%body, %cleanup, "could not discard orphaned kernel body");
                }
                Err(err)
            }
        }
    }
}
