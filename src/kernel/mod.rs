pub mod context;
pub mod mock;
pub mod tag;

pub use context::TranslationContext;
pub use mock::{BooleanResults, MockKernel};
pub use tag::{BodyTag, EdgeTag, FaceTag, SubTag};

use crate::document::{DocumentTree, ItemId};
use crate::error::{KernelError, TranslationError};
use crate::math::{Point3, Vector3};

/// Primitive solids the kernel can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidShape {
    /// Axis-aligned block spanning `size` from the offset corner.
    Block,
    /// Cylinder of radius `size.x` and height `size.z` along the direction.
    Cylinder,
    /// Sphere of radius `size.x` centred on the offset.
    Sphere,
}

/// Edge blend profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendKind {
    Round,
    Chamfer,
}

/// Boolean operations between a target body and tool bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Unite,
    Subtract,
    Intersect,
}

/// Relationship used to collect faces related to a seed face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedFaceKind {
    /// Planar faces lying in the seed's plane, facing the same way.
    Coplanar,
    /// Planar faces whose normal is parallel to the seed's, either sense.
    Parallel,
}

/// Session-scoped boundary-representation modeler addressed by tags.
///
/// Implementations operate purely on tags and never touch the document tree.
/// Operations that modify a body keep its tag; new faces and edges get new
/// tags and removed ones are retired.
pub trait SolidKernel {
    /// Creates a primitive solid and returns its body tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are degenerate or the kernel
    /// rejects the operation.
    fn create_solid(
        &mut self,
        shape: SolidShape,
        size: Vector3,
        offset: Point3,
        direction: Vector3,
    ) -> Result<BodyTag, KernelError>;

    /// Blends `edges` (and face-face blends across `faces`) of one body.
    ///
    /// `secondary` is the second chamfer distance and is ignored for rounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the entities are unknown, span several bodies, or
    /// the kernel rejects the blend.
    fn blend_edges(
        &mut self,
        kind: BlendKind,
        radius: f64,
        secondary: f64,
        edges: &[EdgeTag],
        faces: &[FaceTag],
    ) -> Result<(), KernelError>;

    /// Hollows `body` to the given wall thickness, opening `pierce_faces`.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are invalid or the kernel rejects the
    /// operation.
    fn hollow(
        &mut self,
        thickness: f64,
        body: BodyTag,
        pierce_faces: &[FaceTag],
    ) -> Result<(), KernelError>;

    /// Deletes faces of one body and heals the gap.
    ///
    /// # Errors
    ///
    /// Returns an error if the faces are unknown, span several bodies, or the
    /// kernel rejects the operation.
    fn delete_faces(&mut self, faces: &[FaceTag]) -> Result<(), KernelError>;

    /// Combines `tools` into `target` and returns the resulting bodies.
    ///
    /// Tool bodies are consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if a body is unknown or the kernel rejects the
    /// operation.
    fn boolean(
        &mut self,
        op: BooleanOp,
        target: BodyTag,
        tools: &[BodyTag],
    ) -> Result<Vec<BodyTag>, KernelError>;

    /// Mirrors `body` across the plane through `point` with `normal`.
    ///
    /// With `copy` and without `merge` the mirror image is a new body whose
    /// tag is returned; otherwise `body` itself is modified and `None` is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is unknown, the normal is degenerate, or
    /// the kernel rejects the operation.
    fn mirror_body(
        &mut self,
        body: BodyTag,
        point: Point3,
        normal: Vector3,
        copy: bool,
        merge: bool,
    ) -> Result<Option<BodyTag>, KernelError>;

    /// Deletes a body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is unknown.
    fn delete_body(&mut self, body: BodyTag) -> Result<(), KernelError>;

    /// Returns the faces of the seed's body related to `face`, seed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is unknown.
    fn find_related_faces(
        &self,
        kind: RelatedFaceKind,
        face: FaceTag,
    ) -> Result<Vec<FaceTag>, KernelError>;

    /// Returns a point on and the unit normal of a planar face.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is unknown or not planar.
    fn plane_info(&self, face: FaceTag) -> Result<(Point3, Vector3), KernelError>;

    /// Returns the face tags of a body, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is unknown.
    fn faces(&self, body: BodyTag) -> Result<Vec<FaceTag>, KernelError>;

    /// Returns the edge tags of a body, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is unknown.
    fn edges(&self, body: BodyTag) -> Result<Vec<EdgeTag>, KernelError>;

    /// Discards every body and starts a fresh tag space.
    fn reset(&mut self);
}

/// Bridge between document body items and kernel bodies.
pub trait Translator {
    /// Creates a kernel body from a document body item and correlates every
    /// face and edge of the item with its kernel counterpart.
    ///
    /// # Errors
    ///
    /// Returns an error unless every sub-entity maps to exactly one kernel
    /// entity.
    fn translate(
        &mut self,
        document: &DocumentTree,
        brep: ItemId,
    ) -> Result<TranslationContext, TranslationError>;

    /// Creates a detached body item in `document` from a kernel body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is unknown or cannot be represented.
    fn translate_back(
        &mut self,
        document: &mut DocumentTree,
        body: BodyTag,
    ) -> Result<TranslationContext, TranslationError>;
}
