//! The topology: three arenas plus the incidence index linking them

use crate::arena::Arena;
use crate::entity::*;
use itertools::Itertools;
use meshtopo_core::{centroid, triangle_area, CostConfig, Error, Point3d, Result, Vector3d};

/// Key types that address one of the topology's arenas.
pub trait EntityKey: slotmap::Key + 'static {
    type Entity;
    const KIND: &'static str;

    fn arena(topology: &Topology) -> &Arena<Self, Self::Entity>;
    fn arena_mut(topology: &mut Topology) -> &mut Arena<Self, Self::Entity>;
}

impl EntityKey for VertexKey {
    type Entity = Vertex;
    const KIND: &'static str = "vertex";

    fn arena(topology: &Topology) -> &Arena<Self, Vertex> {
        &topology.vertices
    }

    fn arena_mut(topology: &mut Topology) -> &mut Arena<Self, Vertex> {
        &mut topology.vertices
    }
}

impl EntityKey for EdgeKey {
    type Entity = Edge;
    const KIND: &'static str = "edge";

    fn arena(topology: &Topology) -> &Arena<Self, Edge> {
        &topology.edges
    }

    fn arena_mut(topology: &mut Topology) -> &mut Arena<Self, Edge> {
        &mut topology.edges
    }
}

impl EntityKey for FaceKey {
    type Entity = Face;
    const KIND: &'static str = "face";

    fn arena(topology: &Topology) -> &Arena<Self, Face> {
        &topology.faces
    }

    fn arena_mut(topology: &mut Topology) -> &mut Arena<Self, Face> {
        &mut topology.faces
    }
}

/// Vertex/edge/face incidence structure of a triangle mesh.
///
/// The topology exclusively owns its entities. Dense IDs are only stable
/// between mutations; keys stay valid until their entity is removed.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub(crate) vertices: Arena<VertexKey, Vertex>,
    pub(crate) edges: Arena<EdgeKey, Edge>,
    pub(crate) faces: Arena<FaceKey, Face>,
    pub(crate) cost_config: CostConfig,
}

impl Topology {
    /// Create an empty topology
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cost_config(cost_config: CostConfig) -> Self {
        Self {
            cost_config,
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> &Arena<VertexKey, Vertex> {
        &self.vertices
    }

    pub fn edges(&self) -> &Arena<EdgeKey, Edge> {
        &self.edges
    }

    pub fn faces(&self) -> &Arena<FaceKey, Face> {
        &self.faces
    }

    /// Look up a live entity by key.
    pub fn entity<K: EntityKey>(&self, key: K) -> Result<&K::Entity> {
        K::arena(self).get(key).ok_or(Error::StaleHandle(K::KIND))
    }

    pub(crate) fn entity_mut<K: EntityKey>(&mut self, key: K) -> Result<&mut K::Entity> {
        K::arena_mut(self)
            .get_mut(key)
            .ok_or(Error::StaleHandle(K::KIND))
    }

    /// Key of the entity currently holding dense ID `id`.
    pub fn key<K: EntityKey>(&self, id: usize) -> Result<K> {
        let arena = K::arena(self);
        arena.key_at(id).ok_or(Error::InvalidId {
            kind: K::KIND,
            id,
            count: arena.len(),
        })
    }

    /// Current dense ID of a live entity.
    pub fn id<K: EntityKey>(&self, key: K) -> Result<usize> {
        K::arena(self)
            .id_of(key)
            .ok_or(Error::StaleHandle(K::KIND))
    }

    pub fn vertex(&self, key: VertexKey) -> Result<&Vertex> {
        self.entity(key)
    }

    pub fn edge(&self, key: EdgeKey) -> Result<&Edge> {
        self.entity(key)
    }

    pub fn face(&self, key: FaceKey) -> Result<&Face> {
        self.entity(key)
    }

    /// Append a new entity; its dense ID is the current count of its type.
    pub fn create<K: EntityKey>(&mut self, entity: K::Entity) -> K {
        K::arena_mut(self).insert(entity)
    }

    pub fn create_vertex(&mut self, position: Point3d) -> VertexKey {
        self.create(Vertex::new(position))
    }

    pub fn create_edge(&mut self) -> EdgeKey {
        self.create(Edge::new())
    }

    pub fn create_face(&mut self, normal: Vector3d) -> FaceKey {
        self.create(Face::new(normal))
    }

    /// Link every entity of `a` with every entity of `b`, in both
    /// directions. Already present links are not duplicated.
    pub fn add_incidence<A, B>(&mut self, a: &[A], b: &[B]) -> Result<()>
    where
        A: EntityKey,
        B: EntityKey,
        A::Entity: Links<B>,
        B::Entity: Links<A>,
    {
        // Resolve everything first so a stale key links nothing.
        for &ka in a {
            self.entity(ka)?;
        }
        for &kb in b {
            self.entity(kb)?;
        }

        for &ka in a {
            for &kb in b {
                push_unique(self.entity_mut(ka)?.links_mut(), kb);
                push_unique(self.entity_mut(kb)?.links_mut(), ka);
            }
        }
        Ok(())
    }

    /// Link a complete triangle: each edge to its two vertices, and the
    /// face to its three vertices and three edges in winding order.
    #[allow(clippy::too_many_arguments)]
    pub fn add_triangle(
        &mut self,
        va: VertexKey,
        vb: VertexKey,
        vc: VertexKey,
        eab: EdgeKey,
        ebc: EdgeKey,
        eca: EdgeKey,
        f: FaceKey,
    ) -> Result<()> {
        self.add_incidence(&[eab], &[va, vb])?;
        self.add_incidence(&[ebc], &[vb, vc])?;
        self.add_incidence(&[eca], &[vc, va])?;
        self.add_incidence(&[f], &[va, vb, vc])?;
        self.add_incidence(&[f], &[eab, ebc, eca])
    }

    /// Drop `key` from the adjacency lists of its `neighbours`.
    fn unlink<A, B>(&mut self, key: A, neighbours: &[B])
    where
        A: EntityKey,
        B: EntityKey,
        B::Entity: Links<A>,
    {
        let arena = B::arena_mut(self);
        for &n in neighbours {
            if let Some(entity) = arena.get_mut(n) {
                entity.links_mut().retain(|&k| k != key);
            }
        }
    }

    /// Remove a vertex: strip it from its edges and faces, then compact.
    pub fn remove_vertex(&mut self, key: VertexKey) -> Result<Vertex> {
        let vertex = self.vertex(key)?;
        let (edges, faces) = (vertex.edges.clone(), vertex.faces.clone());
        self.unlink(key, &edges);
        self.unlink(key, &faces);
        self.vertices.remove(key).ok_or(Error::StaleHandle("vertex"))
    }

    /// Remove an edge: strip it from its vertices and faces, then compact.
    pub fn remove_edge(&mut self, key: EdgeKey) -> Result<Edge> {
        let edge = self.edge(key)?;
        let (vertices, faces) = (edge.vertices.clone(), edge.faces.clone());
        self.unlink(key, &vertices);
        self.unlink(key, &faces);
        self.edges.remove(key).ok_or(Error::StaleHandle("edge"))
    }

    /// Remove a face: strip it from its vertices and edges, then compact.
    pub fn remove_face(&mut self, key: FaceKey) -> Result<Face> {
        let face = self.face(key)?;
        let (vertices, edges) = (face.vertices.clone(), face.edges.clone());
        self.unlink(key, &vertices);
        self.unlink(key, &edges);
        self.faces.remove(key).ok_or(Error::StaleHandle("face"))
    }

    /// Remove the entity with the given dense ID.
    pub fn remove(&mut self, element: Element) -> Result<()> {
        match element {
            Element::Vertex(id) => {
                let key = self.key(id)?;
                self.remove_vertex(key)?;
            }
            Element::Edge(id) => {
                let key = self.key(id)?;
                self.remove_edge(key)?;
            }
            Element::Face(id) => {
                let key = self.key(id)?;
                self.remove_face(key)?;
            }
        }
        Ok(())
    }

    /// The edge joining `va` and `vb`, if any.
    pub fn edge_with_vertices(&self, va: VertexKey, vb: VertexKey) -> Option<EdgeKey> {
        let vertex = self.vertices.get(va)?;
        vertex.edges.iter().copied().find(|&e| {
            self.edges
                .get(e)
                .is_some_and(|edge| edge.contains(vb) && va != vb)
        })
    }

    /// The edge shared by faces `fa` and `fb`, if any.
    pub fn edge_with_faces(&self, fa: FaceKey, fb: FaceKey) -> Option<EdgeKey> {
        let face = self.faces.get(fa)?;
        face.edges.iter().copied().find(|&e| {
            self.edges
                .get(e)
                .is_some_and(|edge| edge.faces.contains(&fb) && fa != fb)
        })
    }

    /// Vertices sharing an edge with `v`, in the order of its edge list.
    pub fn neighbors(&self, v: VertexKey) -> Result<Vec<VertexKey>> {
        let vertex = self.vertex(v)?;
        vertex
            .edges
            .iter()
            .map(|&e| {
                self.edge(e)?
                    .opposite(v)
                    .ok_or_else(|| Error::InvalidData("edge does not reference its vertex".into()))
            })
            .collect()
    }

    /// Positions of a face's corners in winding order.
    pub fn face_positions(&self, f: FaceKey) -> Result<Vec<Point3d>> {
        self.face(f)?
            .vertices
            .iter()
            .map(|&v| self.vertex(v).map(|vertex| vertex.position))
            .collect()
    }

    /// Midpoint of an edge.
    pub fn edge_center(&self, e: EdgeKey) -> Result<Point3d> {
        let positions = self
            .edge(e)?
            .vertices
            .iter()
            .map(|&v| self.vertex(v).map(|vertex| vertex.position))
            .collect::<Result<Vec<_>>>()?;
        centroid(&positions).ok_or_else(|| Error::InvalidData("edge has no vertices".into()))
    }

    /// Centroid of a face.
    pub fn face_center(&self, f: FaceKey) -> Result<Point3d> {
        let positions = self.face_positions(f)?;
        centroid(&positions).ok_or_else(|| Error::InvalidData("face has no vertices".into()))
    }

    pub fn face_area(&self, f: FaceKey) -> Result<f64> {
        match self.face_positions(f)?.as_slice() {
            [a, b, c] => Ok(triangle_area(a, b, c)),
            _ => Err(Error::InvalidData("face is not a triangle".into())),
        }
    }

    fn ids<K: EntityKey>(&self, keys: &[K]) -> String {
        keys.iter()
            .map(|&k| match K::arena(self).id_of(k) {
                Some(id) => id.to_string(),
                None => "?".to_string(),
            })
            .join(",")
    }

    /// One-line summary of an entity's adjacency, by dense IDs.
    pub fn describe(&self, element: Element) -> Result<String> {
        Ok(match element {
            Element::Vertex(id) => {
                let v = self.vertex(self.key(id)?)?;
                format!(
                    "{}. Adj edges: [{}]. Adj faces: [{}].",
                    element,
                    self.ids(&v.edges),
                    self.ids(&v.faces)
                )
            }
            Element::Edge(id) => {
                let e = self.edge(self.key(id)?)?;
                format!(
                    "{}. Adj vertices: [{}]. Adj faces: [{}].",
                    element,
                    self.ids(&e.vertices),
                    self.ids(&e.faces)
                )
            }
            Element::Face(id) => {
                let f = self.face(self.key(id)?)?;
                format!(
                    "{}. Adj vertices: [{}]. Adj edges: [{}].",
                    element,
                    self.ids(&f.vertices),
                    self.ids(&f.edges)
                )
            }
        })
    }

    /// Check every structural invariant, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::InvalidData(msg));

        if !self.vertices.is_consistent()
            || !self.edges.is_consistent()
            || !self.faces.is_consistent()
        {
            return fail("arena key table out of sync with dense storage".into());
        }

        self.check_symmetric::<VertexKey, EdgeKey>()?;
        self.check_symmetric::<VertexKey, FaceKey>()?;
        self.check_symmetric::<EdgeKey, VertexKey>()?;
        self.check_symmetric::<EdgeKey, FaceKey>()?;
        self.check_symmetric::<FaceKey, VertexKey>()?;
        self.check_symmetric::<FaceKey, EdgeKey>()?;

        for (id, _, edge) in self.edges.iter() {
            match edge.endpoints() {
                Some([a, b]) if a != b => {}
                _ => return fail(format!("edge {} does not join two distinct vertices", id)),
            }
            if edge.faces.len() > 2 {
                return fail(format!("edge {} has {} faces", id, edge.faces.len()));
            }
        }

        for (id, _, face) in self.faces.iter() {
            let corners = match face.corners() {
                Some(c) => c,
                None => return fail(format!("face {} does not have 3 vertices", id)),
            };
            if face.edges.len() != 3 {
                return fail(format!("face {} does not have 3 edges", id));
            }
            for i in 0..3 {
                let (a, b) = (corners[i], corners[(i + 1) % 3]);
                let edge = self.edge(face.edges[i])?;
                if !(edge.contains(a) && edge.contains(b)) {
                    return fail(format!(
                        "face {} edge {} does not join corners {} and {}",
                        id, i, i, (i + 1) % 3
                    ));
                }
            }
        }

        Ok(())
    }

    /// Every link from an `A` to a `B` resolves, is unique, and is mirrored.
    fn check_symmetric<A, B>(&self) -> Result<()>
    where
        A: EntityKey,
        B: EntityKey,
        A::Entity: Links<B>,
        B::Entity: Links<A>,
    {
        for (id, key, entity) in A::arena(self).iter() {
            let links = entity.links();
            if links.iter().all_unique() {
                for &other in links {
                    let back = B::arena(self).get(other).ok_or_else(|| {
                        Error::InvalidData(format!(
                            "{} {} references a removed {}",
                            A::KIND,
                            id,
                            B::KIND
                        ))
                    })?;
                    if !back.links().contains(&key) {
                        return Err(Error::InvalidData(format!(
                            "{} {} -> {} link is not mirrored",
                            A::KIND,
                            id,
                            B::KIND
                        )));
                    }
                }
            } else {
                return Err(Error::InvalidData(format!(
                    "{} {} lists a {} twice",
                    A::KIND,
                    id,
                    B::KIND
                )));
            }
        }
        Ok(())
    }
}

fn push_unique<K: PartialEq>(list: &mut Vec<K>, key: K) {
    if !list.contains(&key) {
        list.push(key);
    }
}
