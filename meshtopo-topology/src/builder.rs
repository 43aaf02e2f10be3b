//! Building a topology from an input polygon mesh

use crate::entity::VertexKey;
use crate::topology::Topology;
use meshtopo_core::{CostConfig, Error, PolygonMesh, Result};
use std::collections::HashMap;
use tracing::debug;

/// Tolerance on `|n| - 1` for supplied face normals
const NORMAL_TOLERANCE: f64 = 1e-3;

/// Reject input the topology cannot represent: out-of-range or repeated
/// indices, a normal count that does not match the face count, normals
/// that are not unit length, and edges shared by more than two triangles.
///
/// Runs before any entity is created; construction itself assumes a valid
/// manifold and does not check again.
pub fn validate_polygon_mesh(mesh: &PolygonMesh) -> Result<()> {
    if mesh.normals.len() != mesh.faces.len() {
        return Err(Error::InvalidData(format!(
            "{} faces but {} normals",
            mesh.faces.len(),
            mesh.normals.len()
        )));
    }

    for (i, (face, normal)) in mesh.faces.iter().zip(&mesh.normals).enumerate() {
        let indices = face.indices();
        if let Some(&bad) = indices.iter().find(|&&p| p >= mesh.vertices.len()) {
            return Err(Error::InvalidData(format!(
                "face {} references point {} but only {} exist",
                i,
                bad,
                mesh.vertices.len()
            )));
        }
        for (j, a) in indices.iter().enumerate() {
            if indices[j + 1..].contains(a) {
                return Err(Error::InvalidData(format!(
                    "face {} repeats point {}",
                    i, a
                )));
            }
        }
        let length = normal.norm();
        if !length.is_finite() || (length - 1.0).abs() > NORMAL_TOLERANCE {
            return Err(Error::InvalidData(format!(
                "face {} normal has length {}",
                i, length
            )));
        }
    }

    let mut edge_uses: HashMap<(usize, usize), usize> = HashMap::new();
    for triangle in mesh.faces.iter().flat_map(|f| f.triangles()) {
        for k in 0..3 {
            let (a, b) = (triangle[k], triangle[(k + 1) % 3]);
            *edge_uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }
    if let Some((&(a, b), &count)) = edge_uses
        .iter()
        .filter(|&(_, &count)| count > 2)
        .min_by_key(|&(&edge, _)| edge)
    {
        return Err(Error::NonManifold(a, b, count));
    }

    Ok(())
}

impl Topology {
    /// Build the incidence structure of `mesh` and initialize collapse costs.
    ///
    /// Vertex IDs follow the input point order. Face IDs follow the input
    /// face order, with each quad contributing two consecutive triangles.
    pub fn from_polygon_mesh(mesh: &PolygonMesh, cost_config: CostConfig) -> Result<Self> {
        validate_polygon_mesh(mesh)?;

        let mut topo = Topology::with_cost_config(cost_config);
        let vertex_keys: Vec<VertexKey> = mesh
            .vertices
            .iter()
            .map(|&p| topo.create_vertex(p))
            .collect();

        let triangles = mesh.triangles();
        let mut face_keys = Vec::with_capacity(triangles.len());
        for (corners, normal) in &triangles {
            let f = topo.create_face(*normal);
            let corner_keys = corners.map(|p| vertex_keys[p]);
            topo.add_incidence(&[f], &corner_keys)?;
            face_keys.push(f);
        }

        for ((corners, _), &f) in triangles.iter().zip(&face_keys) {
            for k in 0..3 {
                let a = vertex_keys[corners[k]];
                let b = vertex_keys[corners[(k + 1) % 3]];
                let e = match topo.edge_with_vertices(a, b) {
                    Some(e) => e,
                    None => {
                        let e = topo.create_edge();
                        topo.add_incidence(&[e], &[a, b])?;
                        e
                    }
                };
                topo.add_incidence(&[e], &[f])?;
            }
        }

        topo.initialize_collapse_costs()?;

        debug!(
            vertices = topo.vertex_count(),
            edges = topo.edge_count(),
            faces = topo.face_count(),
            "Built topology"
        );
        Ok(topo)
    }
}
