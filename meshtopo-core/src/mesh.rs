//! Mesh data structures exchanged with the rendering side

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A single input face: a triangle, or a legacy quad that is split into
/// two triangles on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonFace {
    Triangle([usize; 3]),
    Quad([usize; 4]),
}

impl PolygonFace {
    /// Point indices in face order
    pub fn indices(&self) -> &[usize] {
        match self {
            PolygonFace::Triangle(t) => t,
            PolygonFace::Quad(q) => q,
        }
    }

    /// Fan-split into triangles sharing the first corner, keeping the winding.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        match *self {
            PolygonFace::Triangle(t) => vec![t],
            PolygonFace::Quad([a, b, c, d]) => vec![[a, b, c], [a, c, d]],
        }
    }
}

impl From<[usize; 3]> for PolygonFace {
    fn from(t: [usize; 3]) -> Self {
        PolygonFace::Triangle(t)
    }
}

impl From<[usize; 4]> for PolygonFace {
    fn from(q: [usize; 4]) -> Self {
        PolygonFace::Quad(q)
    }
}

/// Input mesh: points, faces of 3 or 4 point indices and one unit
/// normal per face computed by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolygonMesh {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<PolygonFace>,
    pub normals: Vec<Vector3d>,
}

impl PolygonMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from points, faces and per-face normals
    pub fn from_parts(
        vertices: Vec<Point3d>,
        faces: Vec<PolygonFace>,
        normals: Vec<Vector3d>,
    ) -> Self {
        Self {
            vertices,
            faces,
            normals,
        }
    }

    /// Create a triangle mesh whose face normals are derived from the
    /// winding of each triangle.
    pub fn from_triangles(vertices: Vec<Point3d>, faces: Vec<[usize; 3]>) -> Result<Self> {
        let mut normals = Vec::with_capacity(faces.len());
        for (i, face) in faces.iter().enumerate() {
            let corner = |k: usize| {
                vertices.get(face[k]).ok_or_else(|| {
                    Error::InvalidData(format!(
                        "face {} references point {} but only {} exist",
                        i,
                        face[k],
                        vertices.len()
                    ))
                })
            };
            let normal = triangle_normal(corner(0)?, corner(1)?, corner(2)?).ok_or_else(|| {
                Error::InvalidData(format!("face {} has zero area", i))
            })?;
            normals.push(normal);
        }

        Ok(Self {
            vertices,
            faces: faces.into_iter().map(PolygonFace::Triangle).collect(),
            normals,
        })
    }

    /// Get the number of points
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of input faces (quads count once)
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of triangles after quads are split
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|f| match f {
                PolygonFace::Triangle(_) => 1,
                PolygonFace::Quad(_) => 2,
            })
            .sum()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// All triangles with the normal of the face they came from.
    pub fn triangles(&self) -> Vec<([usize; 3], Vector3d)> {
        self.faces
            .iter()
            .zip(self.normals.iter())
            .flat_map(|(face, normal)| face.triangles().into_iter().map(move |t| (t, *normal)))
            .collect()
    }
}

/// Output mesh handed to the renderer: points, triangles and an optional
/// palette index per face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3d>,
    pub faces: Vec<[usize; 3]>,
    pub face_colors: Option<Vec<usize>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3d>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            face_colors: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Calculate face normals. Degenerate faces get a zero vector.
    pub fn calculate_face_normals(&self) -> Vec<Vector3d> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];
                triangle_normal(&v0, &v1, &v2).unwrap_or_else(Vector3d::zeros)
            })
            .collect()
    }

    /// Set per-face palette indices
    pub fn set_face_colors(&mut self, colors: Vec<usize>) {
        if colors.len() == self.faces.len() {
            self.face_colors = Some(colors);
        }
    }

    /// Resolve the per-face palette indices against `palette`. Indices past
    /// the end of the palette wrap around.
    pub fn face_palette_colors(&self, palette: &[[u8; 3]]) -> Option<Vec<[u8; 3]>> {
        if palette.is_empty() {
            return None;
        }
        self.face_colors
            .as_ref()
            .map(|colors| colors.iter().map(|&c| palette[c % palette.len()]).collect())
    }

    /// Convert back into an input mesh, normals derived from the winding.
    pub fn to_polygon_mesh(&self) -> PolygonMesh {
        PolygonMesh {
            vertices: self.vertices.clone(),
            faces: self.faces.iter().copied().map(PolygonFace::Triangle).collect(),
            normals: self.calculate_face_normals(),
        }
    }
}
