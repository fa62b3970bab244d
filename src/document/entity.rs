use crate::math::{Point3, Vector3};

use super::item::ItemId;

slotmap::new_key_type! {
    /// Unique identifier for a face sub-entity of a body item.
    pub struct FaceId;
}

slotmap::new_key_type! {
    /// Unique identifier for an edge sub-entity of a body item.
    pub struct EdgeId;
}

/// Surface carried by a document face.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceSurface {
    /// A planar surface through `origin` with unit `normal`.
    Plane { origin: Point3, normal: Vector3 },
    /// Any non-planar surface.
    Curved,
}

/// Data associated with a face of a body item.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The body item this face belongs to.
    pub brep: ItemId,
    /// The face geometry.
    pub surface: FaceSurface,
}

/// Data associated with an edge of a body item.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// The body item this edge belongs to.
    pub brep: ItemId,
}

/// A face or edge of a body item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubEntity {
    Face(FaceId),
    Edge(EdgeId),
}
