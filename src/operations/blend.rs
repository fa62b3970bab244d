use tracing::info;

use crate::document::{EdgeId, FaceId, ItemId};
use crate::error::{OperationError, Result};
use crate::kernel::{BlendKind, SolidKernel, Translator};
use crate::session::Session;

/// Rounds or chamfers edges of one body.
pub struct Blend {
    brep: ItemId,
    kind: BlendKind,
    radius: f64,
    secondary: f64,
    edges: Vec<EdgeId>,
    faces: Vec<FaceId>,
}

impl Blend {
    /// Creates a new `Blend` operation over `edges` of `brep`.
    #[must_use]
    pub fn new(brep: ItemId, kind: BlendKind, radius: f64, edges: Vec<EdgeId>) -> Self {
        Self {
            brep,
            kind,
            radius,
            secondary: 0.0,
            edges,
            faces: Vec::new(),
        }
    }

    /// Sets the second chamfer distance.
    #[must_use]
    pub fn with_secondary(mut self, distance: f64) -> Self {
        self.secondary = distance;
        self
    }

    /// Adds faces for a face-face blend.
    #[must_use]
    pub fn with_faces(mut self, faces: Vec<FaceId>) -> Self {
        self.faces = faces;
        self
    }

    /// Executes the blend in the kernel and records the regenerated body.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected, a selected entity has no
    /// kernel tag, or the kernel rejects the blend. Nothing is recorded in
    /// that case.
    pub fn execute<K: SolidKernel + Translator>(&self, session: &mut Session<K>) -> Result<()> {
        if self.edges.is_empty() && self.faces.is_empty() {
            return Err(OperationError::InvalidInput("blend needs edges or faces".into()).into());
        }
        let body = session.resolve_body(self.brep)?;
        let edges = self
            .edges
            .iter()
            .map(|&edge| session.resolve_edge(self.brep, edge))
            .collect::<Result<Vec<_>>>()?;
        let faces = self
            .faces
            .iter()
            .map(|&face| session.resolve_face(self.brep, face))
            .collect::<Result<Vec<_>>>()?;

        session
            .kernel
            .blend_edges(self.kind, self.radius, self.secondary, &edges, &faces)?;

        session.commit_update(self.brep, body, body);
        info!(brep = ?self.brep, %body, kind = ?self.kind, edges = edges.len(), "blended body");
        Ok(())
    }
}
