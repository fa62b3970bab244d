use std::collections::HashMap;

use crate::document::{CopyMap, EdgeId, FaceId, ItemId, SubEntity};
use crate::error::TranslationError;

use super::tag::{BodyTag, EdgeTag, FaceTag, SubTag};

/// Bidirectional correspondence between one document body item and one
/// kernel body, produced by a single translation.
///
/// Every face and edge of the item maps to exactly one kernel tag and back.
/// A context becomes stale as soon as the kernel body is regenerated; the
/// correlation table then retires it together with every tag read through it.
#[derive(Debug)]
pub struct TranslationContext {
    brep: ItemId,
    body: BodyTag,
    face_tags: HashMap<FaceId, FaceTag>,
    faces: HashMap<FaceTag, FaceId>,
    edge_tags: HashMap<EdgeId, EdgeTag>,
    edges: HashMap<EdgeTag, EdgeId>,
}

impl TranslationContext {
    /// Creates an empty context for `brep` and `body`.
    #[must_use]
    pub fn new(brep: ItemId, body: BodyTag) -> Self {
        Self {
            brep,
            body,
            face_tags: HashMap::new(),
            faces: HashMap::new(),
            edge_tags: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// The document body item.
    #[must_use]
    pub fn brep(&self) -> ItemId {
        self.brep
    }

    /// The kernel body.
    #[must_use]
    pub fn body(&self) -> BodyTag {
        self.body
    }

    /// Records that `face` and `tag` correspond.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::MultipleMatches`] if either side is
    /// already linked.
    pub fn link_face(&mut self, face: FaceId, tag: FaceTag) -> Result<(), TranslationError> {
        if self.face_tags.contains_key(&face) || self.faces.contains_key(&tag) {
            return Err(TranslationError::MultipleMatches(format!("face tag {tag}")));
        }
        self.face_tags.insert(face, tag);
        self.faces.insert(tag, face);
        Ok(())
    }

    /// Records that `edge` and `tag` correspond.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::MultipleMatches`] if either side is
    /// already linked.
    pub fn link_edge(&mut self, edge: EdgeId, tag: EdgeTag) -> Result<(), TranslationError> {
        if self.edge_tags.contains_key(&edge) || self.edges.contains_key(&tag) {
            return Err(TranslationError::MultipleMatches(format!("edge tag {tag}")));
        }
        self.edge_tags.insert(edge, tag);
        self.edges.insert(tag, edge);
        Ok(())
    }

    /// Returns the kernel tag of a document face.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::NoMatch`] if the face is not part of this
    /// translation.
    pub fn face_tag(&self, face: FaceId) -> Result<FaceTag, TranslationError> {
        self.face_tags
            .get(&face)
            .copied()
            .ok_or_else(|| TranslationError::NoMatch(format!("face of body {}", self.body)))
    }

    /// Returns the kernel tag of a document edge.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::NoMatch`] if the edge is not part of this
    /// translation.
    pub fn edge_tag(&self, edge: EdgeId) -> Result<EdgeTag, TranslationError> {
        self.edge_tags
            .get(&edge)
            .copied()
            .ok_or_else(|| TranslationError::NoMatch(format!("edge of body {}", self.body)))
    }

    /// Returns the kernel tag of a document sub-entity.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::NoMatch`] if it is not part of this
    /// translation.
    pub fn sub_tag(&self, entity: SubEntity) -> Result<SubTag, TranslationError> {
        match entity {
            SubEntity::Face(face) => self.face_tag(face).map(SubTag::Face),
            SubEntity::Edge(edge) => self.edge_tag(edge).map(SubTag::Edge),
        }
    }

    /// Returns the document sub-entity behind a kernel tag.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::NoMatch`] if the tag is not part of this
    /// translation.
    pub fn sub_entity(&self, tag: SubTag) -> Result<SubEntity, TranslationError> {
        let entity = match tag {
            SubTag::Face(face) => self.faces.get(&face).copied().map(SubEntity::Face),
            SubTag::Edge(edge) => self.edges.get(&edge).copied().map(SubEntity::Edge),
        };
        entity.ok_or_else(|| TranslationError::NoMatch(format!("kernel tag {}", tag.raw())))
    }

    /// Number of linked faces and edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.face_tags.len() + self.edge_tags.len()
    }

    /// Returns `true` if nothing is linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a context for the regenerated `body` holding only the links
    /// whose kernel tags are still among `faces` and `edges`.
    #[must_use]
    pub fn carry_over(&self, body: BodyTag, faces: &[FaceTag], edges: &[EdgeTag]) -> Self {
        let mut carried = TranslationContext::new(self.brep, body);
        for (&face, &tag) in &self.face_tags {
            if faces.contains(&tag) {
                carried.face_tags.insert(face, tag);
                carried.faces.insert(tag, face);
            }
        }
        for (&edge, &tag) in &self.edge_tags {
            if edges.contains(&tag) {
                carried.edge_tags.insert(edge, tag);
                carried.edges.insert(tag, edge);
            }
        }
        carried
    }

    /// Rewrites the document side through a copy map, keeping kernel tags.
    ///
    /// Used when a freshly translated item is copied into another tree.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::NoMatch`] if the item or one of its
    /// sub-entities was not copied.
    pub fn remap(&self, map: &CopyMap) -> Result<TranslationContext, TranslationError> {
        let brep = map
            .item(self.brep)
            .ok_or_else(|| TranslationError::NoMatch(format!("copy of body {}", self.body)))?;
        let mut remapped = TranslationContext::new(brep, self.body);
        for (&face, &tag) in &self.face_tags {
            let face = map
                .face(face)
                .ok_or_else(|| TranslationError::NoMatch(format!("copy of face tag {tag}")))?;
            remapped.link_face(face, tag)?;
        }
        for (&edge, &tag) in &self.edge_tags {
            let edge = map
                .edge(edge)
                .ok_or_else(|| TranslationError::NoMatch(format!("copy of edge tag {tag}")))?;
            remapped.link_edge(edge, tag)?;
        }
        Ok(remapped)
    }
}
