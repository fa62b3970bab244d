use tracing::info;

use crate::document::{FaceId, ItemId};
use crate::error::{OperationError, Result};
use crate::kernel::{SolidKernel, Translator};
use crate::session::Session;

/// Shells a body to a constant wall thickness.
pub struct Hollow {
    brep: ItemId,
    thickness: f64,
    pierce_faces: Vec<FaceId>,
}

impl Hollow {
    /// Creates a new `Hollow` operation. `pierce_faces` are left open.
    #[must_use]
    pub fn new(brep: ItemId, thickness: f64, pierce_faces: Vec<FaceId>) -> Self {
        Self {
            brep,
            thickness,
            pierce_faces,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the thickness is not positive, a face has no
    /// kernel tag, or the kernel rejects the operation.
    pub fn execute<K: SolidKernel + Translator>(&self, session: &mut Session<K>) -> Result<()> {
        if self.thickness.is_nan() || self.thickness <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "wall thickness must be positive, got {}",
                self.thickness
            ))
            .into());
        }
        let body = session.resolve_body(self.brep)?;
        let faces = self
            .pierce_faces
            .iter()
            .map(|&face| session.resolve_face(self.brep, face))
            .collect::<Result<Vec<_>>>()?;

        session.kernel.hollow(self.thickness, body, &faces)?;

        session.commit_update(self.brep, body, body);
        info!(brep = ?self.brep, %body, thickness = self.thickness, "hollowed body");
        Ok(())
    }
}
