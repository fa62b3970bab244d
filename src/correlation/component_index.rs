use std::collections::HashMap;

use tracing::debug;

use crate::document::{Component, DocumentTree, SubEntity};
use crate::error::Result;
use crate::kernel::{BodyTag, SubTag, Translator};

use super::table::EntityCorrelationTable;

/// Reverse map from kernel body (and optional face/edge tag) to the
/// document component that displays it.
#[derive(Debug, Default)]
pub struct ComponentIndex {
    bodies: HashMap<BodyTag, Component>,
    sub_maps: HashMap<BodyTag, HashMap<SubTag, Component>>,
}

impl ComponentIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if no body is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.sub_maps.clear();
    }

    /// Rebuilds the index by scanning the subcomponents of `root`.
    ///
    /// The scan is depth-first. Within one list of subcomponents, the first
    /// body encountered is registered and the rest of that list is skipped;
    /// enclosing lists carry on with their next sibling. Bodies are
    /// translated on demand through `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if navigation or a translation fails.
    pub fn build<T: Translator + ?Sized>(
        &mut self,
        document: &DocumentTree,
        table: &mut EntityCorrelationTable,
        translator: &mut T,
        root: Component,
    ) -> Result<()> {
        self.clear();
        self.scan(document, table, translator, root)?;
        debug!(bodies = self.bodies.len(), "built component index");
        Ok(())
    }

    fn scan<T: Translator + ?Sized>(
        &mut self,
        document: &DocumentTree,
        table: &mut EntityCorrelationTable,
        translator: &mut T,
        component: Component,
    ) -> Result<()> {
        for sub in document.subcomponents(component)? {
            if let Component::Body(brep) = sub {
                if let Some(body) = table.resolve(translator, document, brep, true)? {
                    self.bodies.insert(body, sub);
                }
                return Ok(());
            }
            self.scan(document, table, translator, sub)?;
        }
        Ok(())
    }

    /// Returns the component of `body`, or of one of its faces or edges.
    ///
    /// The face/edge map of a body is built on first use from the body
    /// component's descendants and its current translation context.
    ///
    /// # Errors
    ///
    /// Returns an error if the body component can no longer be navigated.
    pub fn lookup(
        &mut self,
        document: &DocumentTree,
        table: &EntityCorrelationTable,
        body: BodyTag,
        sub: Option<SubTag>,
    ) -> Result<Option<Component>> {
        let Some(&component) = self.bodies.get(&body) else {
            return Ok(None);
        };
        let Some(sub) = sub else {
            return Ok(Some(component));
        };
        if !self.sub_maps.contains_key(&body) {
            let map = sub_components(document, table, body, component)?;
            self.sub_maps.insert(body, map);
        }
        Ok(self
            .sub_maps
            .get(&body)
            .and_then(|map| map.get(&sub))
            .copied())
    }

    /// Forgets `body` and its face/edge map. Returns `true` if it was
    /// registered.
    pub fn invalidate(&mut self, body: BodyTag) -> bool {
        self.sub_maps.remove(&body);
        self.bodies.remove(&body).is_some()
    }

    /// Registers `body` afresh under `component`, dropping any stale
    /// face/edge map.
    pub fn reinit(&mut self, body: BodyTag, component: Component) {
        self.invalidate(body);
        self.bodies.insert(body, component);
        debug!(%body, ?component, "reinitialised component index entry");
    }
}

fn sub_components(
    document: &DocumentTree,
    table: &EntityCorrelationTable,
    body: BodyTag,
    component: Component,
) -> Result<HashMap<SubTag, Component>> {
    let mut map = HashMap::new();
    let Component::Body(brep) = component else {
        return Ok(map);
    };
    if table.body(brep) != Some(body) {
        return Ok(map);
    }
    let mut pending = document.subcomponents(component)?;
    while let Some(next) = pending.pop() {
        let entity = match next {
            Component::Face(face) => SubEntity::Face(face),
            Component::Edge(edge) => SubEntity::Edge(edge),
            _ => {
                pending.extend(document.subcomponents(next)?);
                continue;
            }
        };
        if let Ok(tag) = table.sub_tag(brep, entity) {
            map.insert(tag, next);
        }
    }
    Ok(map)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::fixtures::{assembly, single_part};
    use crate::kernel::MockKernel;

    fn built(doc: &DocumentTree) -> (ComponentIndex, EntityCorrelationTable, MockKernel) {
        let mut kernel = MockKernel::new();
        let mut table = EntityCorrelationTable::new();
        let mut index = ComponentIndex::new();
        let root = Component::Occurrence(doc.root().unwrap());
        index.build(doc, &mut table, &mut kernel, root).unwrap();
        (index, table, kernel)
    }

    #[test]
    fn lookup_returns_registered_body() {
        let (doc, _, bodies) = single_part(&["a"]);
        let (mut index, table, _) = built(&doc);
        let body = table.body(bodies[0]).unwrap();

        assert_eq!(
            index.lookup(&doc, &table, body, None).unwrap(),
            Some(Component::Body(bodies[0]))
        );
    }

    #[test]
    fn lookup_of_unknown_body_is_none() {
        let (doc, _, _) = single_part(&["a"]);
        let (mut index, table, _) = built(&doc);

        assert_eq!(
            index.lookup(&doc, &table, BodyTag::new(999).unwrap(), None).unwrap(),
            None
        );
    }

    #[test]
    fn scan_registers_only_first_body_of_a_part() {
        let (doc, _, bodies) = single_part(&["a", "b", "c"]);
        let (index, table, _) = built(&doc);

        assert_eq!(index.len(), 1);
        assert!(table.body(bodies[0]).is_some());
        assert!(table.body(bodies[1]).is_none());
    }

    #[test]
    fn scan_continues_with_sibling_occurrences() {
        let (doc, _, bodies) = assembly(&[&["a", "b"], &["c"]]);
        let (index, table, _) = built(&doc);

        assert_eq!(index.len(), 2);
        assert!(table.body(bodies[0][0]).is_some());
        assert!(table.body(bodies[0][1]).is_none());
        assert!(table.body(bodies[1][0]).is_some());
    }

    #[test]
    fn sub_lookup_resolves_faces_and_edges() {
        let (doc, _, bodies) = single_part(&["a"]);
        let (mut index, table, _) = built(&doc);
        let body = table.body(bodies[0]).unwrap();
        let brep = doc.brep(bodies[0]).unwrap();
        let face_tag = table.sub_tag(bodies[0], SubEntity::Face(brep.faces[1])).unwrap();
        let edge_tag = table.sub_tag(bodies[0], SubEntity::Edge(brep.edges[0])).unwrap();

        assert_eq!(
            index.lookup(&doc, &table, body, Some(face_tag)).unwrap(),
            Some(Component::Face(brep.faces[1]))
        );
        assert_eq!(
            index.lookup(&doc, &table, body, Some(edge_tag)).unwrap(),
            Some(Component::Edge(brep.edges[0]))
        );
    }

    #[test]
    fn reinit_drops_stale_sub_map() {
        let (doc, _, bodies) = single_part(&["a"]);
        let (mut index, mut table, _) = built(&doc);
        let body = table.body(bodies[0]).unwrap();
        let face = doc.brep(bodies[0]).unwrap().faces[0];
        let face_tag = table.sub_tag(bodies[0], SubEntity::Face(face)).unwrap();
        assert!(index.lookup(&doc, &table, body, Some(face_tag)).unwrap().is_some());

        table.replace(bodies[0], body);
        index.reinit(body, Component::Body(bodies[0]));

        assert_eq!(index.lookup(&doc, &table, body, Some(face_tag)).unwrap(), None);
        assert_eq!(
            index.lookup(&doc, &table, body, None).unwrap(),
            Some(Component::Body(bodies[0]))
        );
    }

    #[test]
    fn invalidate_forgets_body() {
        let (doc, _, bodies) = single_part(&["a"]);
        let (mut index, table, _) = built(&doc);
        let body = table.body(bodies[0]).unwrap();

        assert!(index.invalidate(body));
        assert!(!index.invalidate(body));
        assert_eq!(index.lookup(&doc, &table, body, None).unwrap(), None);
    }
}
