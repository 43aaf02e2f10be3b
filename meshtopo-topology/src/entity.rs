//! Vertex, edge and face records and their adjacency lists

use meshtopo_core::{Point3d, Vector3d};
use std::fmt;

slotmap::new_key_type! {
    /// Stable handle to a vertex, valid until the vertex is removed.
    pub struct VertexKey;
    /// Stable handle to an edge, valid until the edge is removed.
    pub struct EdgeKey;
    /// Stable handle to a face, valid until the face is removed.
    pub struct FaceKey;
}

/// A mesh vertex: position, incident edges and faces, and its cached
/// collapse cost.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub position: Point3d,
    pub(crate) edges: Vec<EdgeKey>,
    pub(crate) faces: Vec<FaceKey>,
    pub(crate) collapse_cost: f64,
    pub(crate) collapse_target: Option<VertexKey>,
}

impl Vertex {
    /// A vertex with no incidences whose cost has not been computed yet.
    pub fn new(position: Point3d) -> Self {
        Self {
            position,
            edges: Vec::new(),
            faces: Vec::new(),
            collapse_cost: f64::INFINITY,
            collapse_target: None,
        }
    }

    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }

    pub fn faces(&self) -> &[FaceKey] {
        &self.faces
    }

    /// Number of incident edges
    pub fn valence(&self) -> usize {
        self.edges.len()
    }

    /// Cached cost of collapsing this vertex into [`Vertex::collapse_target`].
    /// Infinite until computed.
    pub fn collapse_cost(&self) -> f64 {
        self.collapse_cost
    }

    pub fn collapse_target(&self) -> Option<VertexKey> {
        self.collapse_target
    }
}

/// A mesh edge joining two vertices, shared by up to two faces.
#[derive(Debug, Clone, Default)]
pub struct Edge {
    pub(crate) vertices: Vec<VertexKey>,
    pub(crate) faces: Vec<FaceKey>,
}

impl Edge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[VertexKey] {
        &self.vertices
    }

    pub fn faces(&self) -> &[FaceKey] {
        &self.faces
    }

    /// Both endpoints, once the edge is fully linked.
    pub fn endpoints(&self) -> Option<[VertexKey; 2]> {
        match self.vertices.as_slice() {
            [a, b] => Some([*a, *b]),
            _ => None,
        }
    }

    /// The endpoint that is not `v`.
    pub fn opposite(&self, v: VertexKey) -> Option<VertexKey> {
        let [a, b] = self.endpoints()?;
        if a == v {
            Some(b)
        } else if b == v {
            Some(a)
        } else {
            None
        }
    }

    pub fn contains(&self, v: VertexKey) -> bool {
        self.vertices.contains(&v)
    }

    /// Shared by exactly two faces.
    pub fn is_manifold(&self) -> bool {
        self.faces.len() == 2
    }
}

/// A triangular face. Vertex order defines the winding; edge `i` joins
/// vertex `i` and vertex `i + 1` (cyclically).
#[derive(Debug, Clone)]
pub struct Face {
    pub normal: Vector3d,
    pub(crate) vertices: Vec<VertexKey>,
    pub(crate) edges: Vec<EdgeKey>,
    pub(crate) color: Option<usize>,
}

impl Face {
    pub fn new(normal: Vector3d) -> Self {
        Self {
            normal,
            vertices: Vec::new(),
            edges: Vec::new(),
            color: None,
        }
    }

    pub fn vertices(&self) -> &[VertexKey] {
        &self.vertices
    }

    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }

    /// Palette index assigned by the colorizer
    pub fn color(&self) -> Option<usize> {
        self.color
    }

    pub fn corners(&self) -> Option<[VertexKey; 3]> {
        match self.vertices.as_slice() {
            [a, b, c] => Some([*a, *b, *c]),
            _ => None,
        }
    }

    /// The corner that is neither `a` nor `b`.
    pub fn apex(&self, a: VertexKey, b: VertexKey) -> Option<VertexKey> {
        let mut rest = self.vertices.iter().filter(|&&v| v != a && v != b);
        match (rest.next(), rest.next()) {
            (Some(&v), None) => Some(v),
            _ => None,
        }
    }

    /// Corners in winding order with `from` swapped for `to`.
    pub fn substituted(&self, from: VertexKey, to: VertexKey) -> Vec<VertexKey> {
        self.vertices
            .iter()
            .map(|&v| if v == from { to } else { v })
            .collect()
    }
}

/// Access to one adjacency list of an entity, keyed by the neighbour type.
pub trait Links<K> {
    fn links(&self) -> &[K];
    fn links_mut(&mut self) -> &mut Vec<K>;
}

macro_rules! impl_links {
    ($entity:ty, $key:ty, $field:ident) => {
        impl Links<$key> for $entity {
            fn links(&self) -> &[$key] {
                &self.$field
            }

            fn links_mut(&mut self) -> &mut Vec<$key> {
                &mut self.$field
            }
        }
    };
}

impl_links!(Vertex, EdgeKey, edges);
impl_links!(Vertex, FaceKey, faces);
impl_links!(Edge, VertexKey, vertices);
impl_links!(Edge, FaceKey, faces);
impl_links!(Face, VertexKey, vertices);
impl_links!(Face, EdgeKey, edges);

/// An entity addressed by its dense ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Vertex(usize),
    Edge(usize),
    Face(usize),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Vertex(id) => write!(f, "vertex {}", id),
            Element::Edge(id) => write!(f, "edge {}", id),
            Element::Face(id) => write!(f, "face {}", id),
        }
    }
}
