//! Deterministic in-memory kernel implementing [`SolidKernel`] and
//! [`Translator`].
//!
//! Bodies are plain face/edge lists with analytic plane data where it
//! matters; tags come from one counter shared by bodies, faces and edges.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use crate::document::{DocumentTree, FaceSurface, ItemId};
use crate::error::{KernelError, TranslationError};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::context::TranslationContext;
use super::tag::{BodyTag, EdgeTag, FaceTag};
use super::{BlendKind, BooleanOp, RelatedFaceKind, SolidKernel, SolidShape, Translator};

#[derive(Debug, Clone)]
struct MockFace {
    tag: FaceTag,
    surface: FaceSurface,
}

#[derive(Debug, Clone, Default)]
struct MockBody {
    faces: Vec<MockFace>,
    edges: Vec<EdgeTag>,
}

/// Shape of the result list returned by [`MockKernel`] booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BooleanResults {
    /// Tools merge into the target, which is the only result.
    #[default]
    Merged,
    /// Each tool leaves a separate lump with fresh tags, listed after the
    /// target.
    Split,
    /// Nothing is left; target and tools are all consumed.
    Empty,
}

/// Deterministic test double for the solid kernel and its translation bridge.
#[derive(Debug)]
pub struct MockKernel {
    next_tag: NonZeroU32,
    bodies: BTreeMap<BodyTag, MockBody>,
    reject: bool,
    fail_translation: bool,
    boolean_results: BooleanResults,
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockKernel {
    /// Creates a kernel with an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_tag: NonZeroU32::MIN,
            bodies: BTreeMap::new(),
            reject: false,
            fail_translation: false,
            boolean_results: BooleanResults::Merged,
        }
    }

    /// Makes every modeling operation fail with [`KernelError::Rejected`].
    pub fn reject_operations(&mut self, reject: bool) {
        self.reject = reject;
    }

    /// Makes every translation fail with [`TranslationError::Failed`].
    pub fn fail_translations(&mut self, fail: bool) {
        self.fail_translation = fail;
    }

    /// Selects what subsequent booleans return.
    pub fn boolean_results(&mut self, results: BooleanResults) {
        self.boolean_results = results;
    }

    /// Number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if `body` is live.
    #[must_use]
    pub fn contains_body(&self, body: BodyTag) -> bool {
        self.bodies.contains_key(&body)
    }

    fn check_accepting(&self, operation: &'static str) -> Result<(), KernelError> {
        if self.reject {
            return Err(KernelError::Rejected {
                operation,
                reason: "operation rejected by kernel".into(),
            });
        }
        Ok(())
    }

    fn alloc(&mut self) -> Result<NonZeroU32, KernelError> {
        let tag = self.next_tag;
        self.next_tag = tag.checked_add(1).ok_or_else(|| KernelError::Rejected {
            operation: "allocate tag",
            reason: "tag space exhausted".into(),
        })?;
        Ok(tag)
    }

    fn new_face(&mut self, surface: FaceSurface) -> Result<MockFace, KernelError> {
        Ok(MockFace {
            tag: FaceTag::from(self.alloc()?),
            surface,
        })
    }

    fn new_edges(&mut self, count: usize) -> Result<Vec<EdgeTag>, KernelError> {
        (0..count).map(|_| self.alloc().map(EdgeTag::from)).collect()
    }

    fn new_body(
        &mut self,
        surfaces: Vec<FaceSurface>,
        edge_count: usize,
    ) -> Result<BodyTag, KernelError> {
        let tag = BodyTag::from(self.alloc()?);
        let faces = surfaces
            .into_iter()
            .map(|surface| self.new_face(surface))
            .collect::<Result<Vec<_>, _>>()?;
        let edges = self.new_edges(edge_count)?;
        self.bodies.insert(tag, MockBody { faces, edges });
        Ok(tag)
    }

    fn body(&self, tag: BodyTag) -> Result<&MockBody, KernelError> {
        self.bodies
            .get(&tag)
            .ok_or(KernelError::UnknownTag(tag.raw()))
    }

    fn body_mut(&mut self, tag: BodyTag) -> Result<&mut MockBody, KernelError> {
        self.bodies
            .get_mut(&tag)
            .ok_or(KernelError::UnknownTag(tag.raw()))
    }

    fn face(&self, tag: FaceTag) -> Result<(BodyTag, &MockFace), KernelError> {
        self.bodies
            .iter()
            .find_map(|(&body, data)| {
                data.faces
                    .iter()
                    .find(|face| face.tag == tag)
                    .map(|face| (body, face))
            })
            .ok_or(KernelError::UnknownTag(tag.raw()))
    }

    fn edge_owner(&self, tag: EdgeTag) -> Result<BodyTag, KernelError> {
        self.bodies
            .iter()
            .find(|(_, data)| data.edges.contains(&tag))
            .map(|(&body, _)| body)
            .ok_or(KernelError::UnknownTag(tag.raw()))
    }

    /// Returns the one body owning every given face and edge.
    fn single_owner(&self, faces: &[FaceTag], edges: &[EdgeTag]) -> Result<BodyTag, KernelError> {
        let mut owner = None;
        let owners = faces
            .iter()
            .map(|&face| self.face(face).map(|(body, _)| body))
            .chain(edges.iter().map(|&edge| self.edge_owner(edge)));
        for body in owners {
            let body = body?;
            match owner {
                None => owner = Some(body),
                Some(existing) if existing != body => {
                    return Err(KernelError::InvalidInput(
                        "entities belong to different bodies".into(),
                    ));
                }
                Some(_) => {}
            }
        }
        owner.ok_or_else(|| KernelError::InvalidInput("no entities given".into()))
    }
}

fn plane(origin: Point3, normal: Vector3) -> FaceSurface {
    FaceSurface::Plane { origin, normal }
}

fn unit(v: Vector3) -> Result<Vector3, KernelError> {
    let norm = v.norm();
    if norm < TOLERANCE {
        return Err(KernelError::InvalidInput("zero-length direction".into()));
    }
    Ok(v / norm)
}

fn positive(value: f64, what: &str) -> Result<f64, KernelError> {
    if value < TOLERANCE {
        return Err(KernelError::InvalidInput(format!("{what} must be positive")));
    }
    Ok(value)
}

fn reflect(surface: &FaceSurface, point: &Point3, n: &Vector3) -> FaceSurface {
    match surface {
        FaceSurface::Plane { origin, normal } => {
            let distance = (origin - point).dot(n);
            plane(origin - n * (2.0 * distance), normal - n * (2.0 * normal.dot(n)))
        }
        FaceSurface::Curved => FaceSurface::Curved,
    }
}

fn offset_inward(surface: &FaceSurface, thickness: f64) -> FaceSurface {
    match surface {
        FaceSurface::Plane { origin, normal } => plane(origin - normal * thickness, -normal),
        FaceSurface::Curved => FaceSurface::Curved,
    }
}

fn flipped(surface: &FaceSurface) -> FaceSurface {
    match surface {
        FaceSurface::Plane { origin, normal } => plane(*origin, -normal),
        FaceSurface::Curved => FaceSurface::Curved,
    }
}

impl SolidKernel for MockKernel {
    fn create_solid(
        &mut self,
        shape: SolidShape,
        size: Vector3,
        offset: Point3,
        direction: Vector3,
    ) -> Result<BodyTag, KernelError> {
        self.check_accepting("create solid")?;
        match shape {
            SolidShape::Block => {
                positive(size.x.min(size.y).min(size.z), "block size")?;
                let far = offset + size;
                let surfaces = vec![
                    plane(offset, -Vector3::x()),
                    plane(far, Vector3::x()),
                    plane(offset, -Vector3::y()),
                    plane(far, Vector3::y()),
                    plane(offset, -Vector3::z()),
                    plane(far, Vector3::z()),
                ];
                self.new_body(surfaces, 12)
            }
            SolidShape::Cylinder => {
                positive(size.x, "cylinder radius")?;
                let height = positive(size.z, "cylinder height")?;
                let axis = unit(direction)?;
                let surfaces = vec![
                    plane(offset, -axis),
                    plane(offset + axis * height, axis),
                    FaceSurface::Curved,
                ];
                self.new_body(surfaces, 2)
            }
            SolidShape::Sphere => {
                positive(size.x, "sphere radius")?;
                self.new_body(vec![FaceSurface::Curved], 0)
            }
        }
    }

    fn blend_edges(
        &mut self,
        kind: BlendKind,
        radius: f64,
        secondary: f64,
        edges: &[EdgeTag],
        faces: &[FaceTag],
    ) -> Result<(), KernelError> {
        self.check_accepting("blend")?;
        positive(radius, "blend radius")?;
        if kind == BlendKind::Chamfer && secondary < 0.0 {
            return Err(KernelError::InvalidInput(
                "chamfer distance must not be negative".into(),
            ));
        }
        let owner = self.single_owner(faces, edges)?;

        // Each blended edge becomes a blend face bounded by two new edges;
        // a face-face blend adds one blend face per adjacent pair.
        let blend_faces = edges.len() + faces.len().saturating_sub(1);
        let new_faces = (0..blend_faces)
            .map(|_| self.new_face(FaceSurface::Curved))
            .collect::<Result<Vec<_>, _>>()?;
        let new_edges = self.new_edges(2 * blend_faces)?;

        let body = self.body_mut(owner)?;
        body.edges.retain(|edge| !edges.contains(edge));
        body.faces.extend(new_faces);
        body.edges.extend(new_edges);
        Ok(())
    }

    fn hollow(
        &mut self,
        thickness: f64,
        body: BodyTag,
        pierce_faces: &[FaceTag],
    ) -> Result<(), KernelError> {
        self.check_accepting("hollow")?;
        positive(thickness, "wall thickness")?;
        let data = self.body(body)?;
        if let Some(stray) = pierce_faces
            .iter()
            .find(|tag| !data.faces.iter().any(|face| face.tag == **tag))
        {
            return Err(KernelError::InvalidInput(format!(
                "face {stray} is not on body {body}"
            )));
        }
        let inner: Vec<FaceSurface> = data
            .faces
            .iter()
            .filter(|face| !pierce_faces.contains(&face.tag))
            .map(|face| offset_inward(&face.surface, thickness))
            .collect();
        if inner.is_empty() {
            return Err(KernelError::InvalidInput(
                "cannot pierce every face of a body".into(),
            ));
        }
        let edge_count = data.edges.len();

        let inner_faces = inner
            .into_iter()
            .map(|surface| self.new_face(surface))
            .collect::<Result<Vec<_>, _>>()?;
        let inner_edges = self.new_edges(edge_count)?;

        let data = self.body_mut(body)?;
        data.faces.retain(|face| !pierce_faces.contains(&face.tag));
        data.faces.extend(inner_faces);
        data.edges.extend(inner_edges);
        Ok(())
    }

    fn delete_faces(&mut self, faces: &[FaceTag]) -> Result<(), KernelError> {
        self.check_accepting("delete faces")?;
        let owner = self.single_owner(faces, &[])?;
        let body = self.body_mut(owner)?;
        if body.faces.iter().all(|face| faces.contains(&face.tag)) {
            return Err(KernelError::InvalidInput(
                "cannot delete every face of a body".into(),
            ));
        }
        body.faces.retain(|face| !faces.contains(&face.tag));
        Ok(())
    }

    fn boolean(
        &mut self,
        op: BooleanOp,
        target: BodyTag,
        tools: &[BodyTag],
    ) -> Result<Vec<BodyTag>, KernelError> {
        self.check_accepting("boolean")?;
        self.body(target)?;
        if tools.is_empty() {
            return Err(KernelError::InvalidInput("boolean needs a tool body".into()));
        }
        for (i, tool) in tools.iter().enumerate() {
            self.body(*tool)?;
            if *tool == target || tools[..i].contains(tool) {
                return Err(KernelError::InvalidInput(format!(
                    "body {tool} appears twice in boolean"
                )));
            }
        }

        let mut faces = Vec::new();
        let mut edges = Vec::new();
        let mut lumps = Vec::new();
        for tool in tools {
            let consumed = self
                .bodies
                .remove(tool)
                .ok_or(KernelError::UnknownTag(tool.raw()))?;
            if self.boolean_results == BooleanResults::Split {
                let surfaces = consumed.faces.into_iter().map(|face| face.surface).collect();
                lumps.push(self.new_body(surfaces, consumed.edges.len())?);
                continue;
            }
            for face in consumed.faces {
                let surface = match op {
                    BooleanOp::Subtract => flipped(&face.surface),
                    BooleanOp::Unite | BooleanOp::Intersect => face.surface,
                };
                faces.push(MockFace {
                    tag: face.tag,
                    surface,
                });
            }
            edges.extend(consumed.edges);
        }
        if self.boolean_results == BooleanResults::Empty {
            self.bodies.remove(&target);
            return Ok(Vec::new());
        }
        let body = self.body_mut(target)?;
        body.faces.extend(faces);
        body.edges.extend(edges);
        Ok(std::iter::once(target).chain(lumps).collect())
    }

    fn mirror_body(
        &mut self,
        body: BodyTag,
        point: Point3,
        normal: Vector3,
        copy: bool,
        merge: bool,
    ) -> Result<Option<BodyTag>, KernelError> {
        self.check_accepting("mirror")?;
        let n = unit(normal)?;
        let source = self.body(body)?;
        let mirrored: Vec<FaceSurface> = source
            .faces
            .iter()
            .map(|face| reflect(&face.surface, &point, &n))
            .collect();
        let edge_count = source.edges.len();

        match (copy, merge) {
            (true, false) => self.new_body(mirrored, edge_count).map(Some),
            (true, true) => {
                let faces = mirrored
                    .into_iter()
                    .map(|surface| self.new_face(surface))
                    .collect::<Result<Vec<_>, _>>()?;
                let edges = self.new_edges(edge_count)?;
                let data = self.body_mut(body)?;
                data.faces.extend(faces);
                data.edges.extend(edges);
                Ok(None)
            }
            (false, _) => {
                let data = self.body_mut(body)?;
                for (face, surface) in data.faces.iter_mut().zip(mirrored) {
                    face.surface = surface;
                }
                Ok(None)
            }
        }
    }

    fn delete_body(&mut self, body: BodyTag) -> Result<(), KernelError> {
        self.check_accepting("delete body")?;
        self.bodies
            .remove(&body)
            .map(|_| ())
            .ok_or(KernelError::UnknownTag(body.raw()))
    }

    fn find_related_faces(
        &self,
        kind: RelatedFaceKind,
        face: FaceTag,
    ) -> Result<Vec<FaceTag>, KernelError> {
        let (owner, seed) = self.face(face)?;
        let FaceSurface::Plane { origin, normal } = &seed.surface else {
            return Ok(vec![face]);
        };
        let related = self.body(owner)?.faces.iter().filter(|other| {
            if other.tag == face {
                return false;
            }
            let FaceSurface::Plane {
                origin: other_origin,
                normal: other_normal,
            } = &other.surface
            else {
                return false;
            };
            let alignment = other_normal.dot(normal);
            match kind {
                RelatedFaceKind::Coplanar => {
                    (1.0 - alignment).abs() < TOLERANCE
                        && (other_origin - origin).dot(normal).abs() < TOLERANCE
                }
                RelatedFaceKind::Parallel => (1.0 - alignment.abs()).abs() < TOLERANCE,
            }
        });
        Ok(std::iter::once(face)
            .chain(related.map(|other| other.tag))
            .collect())
    }

    fn plane_info(&self, face: FaceTag) -> Result<(Point3, Vector3), KernelError> {
        match &self.face(face)?.1.surface {
            FaceSurface::Plane { origin, normal } => Ok((*origin, *normal)),
            FaceSurface::Curved => Err(KernelError::NotPlanar(face.raw())),
        }
    }

    fn faces(&self, body: BodyTag) -> Result<Vec<FaceTag>, KernelError> {
        Ok(self.body(body)?.faces.iter().map(|f| f.tag).collect())
    }

    fn edges(&self, body: BodyTag) -> Result<Vec<EdgeTag>, KernelError> {
        Ok(self.body(body)?.edges.clone())
    }

    fn reset(&mut self) {
        self.bodies.clear();
        self.next_tag = NonZeroU32::MIN;
    }
}

fn kernel_failure(err: KernelError) -> TranslationError {
    TranslationError::Failed(err.to_string())
}

impl Translator for MockKernel {
    fn translate(
        &mut self,
        document: &DocumentTree,
        brep: ItemId,
    ) -> Result<TranslationContext, TranslationError> {
        if self.fail_translation {
            return Err(TranslationError::Failed("translation disabled".into()));
        }
        let data = document
            .brep(brep)
            .map_err(|err| TranslationError::NoMatch(err.to_string()))?;
        if data.faces.is_empty() {
            return Err(TranslationError::NoMatch("faces of body item".into()));
        }

        let tag = BodyTag::from(self.alloc().map_err(kernel_failure)?);
        let mut context = TranslationContext::new(brep, tag);
        let mut body = MockBody::default();
        for &face in &data.faces {
            let surface = document
                .face(face)
                .map_err(|err| TranslationError::NoMatch(err.to_string()))?
                .surface
                .clone();
            let created = self.new_face(surface).map_err(kernel_failure)?;
            context.link_face(face, created.tag)?;
            body.faces.push(created);
        }
        for &edge in &data.edges {
            let created = EdgeTag::from(self.alloc().map_err(kernel_failure)?);
            context.link_edge(edge, created)?;
            body.edges.push(created);
        }
        self.bodies.insert(tag, body);
        Ok(context)
    }

    fn translate_back(
        &mut self,
        document: &mut DocumentTree,
        body: BodyTag,
    ) -> Result<TranslationContext, TranslationError> {
        if self.fail_translation {
            return Err(TranslationError::Failed("translation disabled".into()));
        }
        let source = self
            .bodies
            .get(&body)
            .ok_or_else(|| TranslationError::NoMatch(format!("kernel body {body}")))?;

        let brep = document.add_brep(format!("Body {body}"));
        let mut context = TranslationContext::new(brep, body);
        for face in &source.faces {
            let id = document
                .add_face(brep, face.surface.clone())
                .map_err(|err| TranslationError::Failed(err.to_string()))?;
            context.link_face(id, face.tag)?;
        }
        for &edge in &source.edges {
            let id = document
                .add_edge(brep)
                .map_err(|err| TranslationError::Failed(err.to_string()))?;
            context.link_edge(id, edge)?;
        }
        Ok(context)
    }
}
