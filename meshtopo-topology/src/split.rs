//! Local refinement: inserting a vertex inside a face or on an edge
//!
//! Neither split touches collapse costs. The new vertex starts with an
//! infinite cost; use [`Topology::refresh_costs_around`] before simplifying.

use crate::entity::{EdgeKey, Element, FaceKey, VertexKey};
use crate::topology::Topology;
use meshtopo_core::{Error, Point3d, Result};
use tracing::debug;

impl Topology {
    /// Split face `face_id` into three around a new vertex at `point`.
    pub fn split_face(&mut self, face_id: usize, point: Point3d) -> Result<VertexKey> {
        let face = self.key(face_id)?;
        self.split_face_key(face, point)
    }

    /// Split a face into three triangles fanned around a new vertex. The
    /// three boundary edges are kept; three spokes and three faces are added
    /// and the parent face is removed.
    pub fn split_face_key(&mut self, face: FaceKey, point: Point3d) -> Result<VertexKey> {
        let f = self.face(face)?;
        let normal = f.normal;
        let [a, b, c] = f
            .corners()
            .ok_or_else(|| Error::InvalidData("face is not a triangle".into()))?;
        let [eab, ebc, eca] = [(a, b), (b, c), (c, a)].map(|(x, y)| self.edge_with_vertices(x, y));
        let (eab, ebc, eca) = match (eab, ebc, eca) {
            (Some(eab), Some(ebc), Some(eca)) => (eab, ebc, eca),
            _ => return Err(Error::InvalidData("face is missing a boundary edge".into())),
        };

        let n = self.create_vertex(point);
        let ean = self.create_edge();
        let ebn = self.create_edge();
        let ecn = self.create_edge();
        let fabn = self.create_face(normal);
        let fbcn = self.create_face(normal);
        let fcan = self.create_face(normal);

        self.add_triangle(a, b, n, eab, ebn, ean, fabn)?;
        self.add_triangle(b, c, n, ebc, ecn, ebn, fbcn)?;
        self.add_triangle(c, a, n, eca, ean, ecn, fcan)?;

        self.remove_face(face)?;

        debug!(
            vertices = self.vertex_count(),
            faces = self.face_count(),
            "Split face"
        );
        Ok(n)
    }

    /// Split edge `edge_id` at `point`.
    pub fn split_edge(&mut self, edge_id: usize, point: Point3d) -> Result<VertexKey> {
        let edge = self.key(edge_id)?;
        self.split_edge_key(edge, point)
    }

    /// Split an interior edge at a new vertex. Both adjacent faces are
    /// replaced by two faces each, fanned around the new vertex; the edge is
    /// replaced by two halves and joined to both apex vertices.
    pub fn split_edge_key(&mut self, edge: EdgeKey, point: Point3d) -> Result<VertexKey> {
        let e = self.edge(edge)?;
        let [v0, v1] = e
            .endpoints()
            .ok_or_else(|| Error::InvalidData("edge does not have two vertices".into()))?;
        let [f0, f1] = match e.faces() {
            [f0, f1] => [*f0, *f1],
            faces => {
                return Err(Error::Precondition(format!(
                    "edge split needs exactly 2 adjacent faces, found {}",
                    faces.len()
                )))
            }
        };

        // Everything is looked up before the first entity is created.
        let mut sides = Vec::with_capacity(2);
        for f in [f0, f1] {
            let face = self.face(f)?;
            let apex = face
                .apex(v0, v1)
                .ok_or_else(|| Error::InvalidData("face does not contain the split edge".into()))?;
            let e0 = self.edge_with_vertices(v0, apex);
            let e1 = self.edge_with_vertices(v1, apex);
            match (e0, e1) {
                (Some(e0), Some(e1)) => sides.push((f, face.normal, face.vertices().to_vec(), apex, e0, e1)),
                _ => return Err(Error::InvalidData("face is missing an edge to its apex".into())),
            }
        }
        if sides[0].3 == sides[1].3 {
            return Err(Error::Precondition(
                "both faces of the edge share the same apex".into(),
            ));
        }

        let n = self.create_vertex(point);
        let e0n = self.create_edge();
        let e1n = self.create_edge();

        for (_, normal, corners, apex, e0a, e1a) in &sides {
            let ean = self.create_edge();
            let lookup = |x: VertexKey, y: VertexKey| -> Result<EdgeKey> {
                let pair = |p: VertexKey, q: VertexKey| (x == p && y == q) || (x == q && y == p);
                if pair(v0, n) {
                    Ok(e0n)
                } else if pair(v1, n) {
                    Ok(e1n)
                } else if pair(*apex, n) {
                    Ok(ean)
                } else if pair(v0, *apex) {
                    Ok(*e0a)
                } else if pair(v1, *apex) {
                    Ok(*e1a)
                } else {
                    Err(Error::InvalidData("unexpected corner pair in edge split".into()))
                }
            };

            // Keep the parent's winding: the new vertex takes the place of
            // one endpoint in each half.
            for replaced in [v1, v0] {
                let sub: Vec<VertexKey> = corners
                    .iter()
                    .map(|&v| if v == replaced { n } else { v })
                    .collect();
                let (p, q, r) = (sub[0], sub[1], sub[2]);
                let (epq, eqr, erp) = (lookup(p, q)?, lookup(q, r)?, lookup(r, p)?);
                let f = self.create_face(*normal);
                self.add_triangle(p, q, r, epq, eqr, erp, f)?;
            }
        }

        self.remove_edge(edge)?;
        for (f, ..) in sides {
            self.remove_face(f)?;
        }

        debug!(
            vertices = self.vertex_count(),
            faces = self.face_count(),
            "Split edge"
        );
        Ok(n)
    }

    /// Split the face or edge named by `element` at `point`. Vertices cannot
    /// be retriangulated.
    pub fn retriangulate(&mut self, element: Element, point: Point3d) -> Result<VertexKey> {
        match element {
            Element::Face(id) => self.split_face(id, point),
            Element::Edge(id) => self.split_edge(id, point),
            Element::Vertex(_) => Err(Error::Unsupported(format!(
                "cannot retriangulate {}",
                element
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes::{octahedron, single_triangle, tetrahedron};
    use meshtopo_core::{CostConfig, PolygonMesh};

    fn build(mesh: &PolygonMesh) -> Topology {
        Topology::from_polygon_mesh(mesh, CostConfig::default()).unwrap()
    }

    fn corner_ids(topo: &Topology, f: FaceKey) -> Vec<usize> {
        topo.face(f)
            .unwrap()
            .vertices()
            .iter()
            .map(|&k| topo.id(k).unwrap())
            .collect()
    }

    #[test]
    fn test_split_face_counts() {
        let mut topo = build(&single_triangle());
        let center = topo.face_center(topo.key(0).unwrap()).unwrap();
        let n = topo.split_face(0, center).unwrap();

        assert_eq!(topo.vertex_count(), 4);
        assert_eq!(topo.edge_count(), 6);
        assert_eq!(topo.face_count(), 3);
        assert_eq!(topo.id(n).unwrap(), 3);
        assert_eq!(topo.vertex(n).unwrap().valence(), 3);
        assert_eq!(topo.vertex(n).unwrap().position, center);
        topo.validate().unwrap();
    }

    #[test]
    fn test_split_face_keeps_winding_and_normal() {
        let mut topo = build(&single_triangle());
        let normal = topo.faces().get_by_id(0).unwrap().normal;
        topo.split_face(0, Point3d::new(0.25, 0.25, 0.0)).unwrap();

        let mut faces: Vec<Vec<usize>> = topo.faces().keys().map(|f| corner_ids(&topo, f)).collect();
        faces.sort();
        assert_eq!(faces, vec![vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3]]);
        for (_, _, f) in topo.faces().iter() {
            assert_eq!(f.normal, normal);
        }
    }

    #[test]
    fn test_split_face_leaves_costs_alone() {
        let mut topo = build(&octahedron());
        let before: Vec<f64> = topo.vertices().iter().map(|(_, _, v)| v.collapse_cost()).collect();
        let n = topo.split_face(0, Point3d::new(0.4, 0.4, 0.4)).unwrap();

        assert!(topo.vertex(n).unwrap().collapse_cost().is_infinite());
        for (id, cost) in before.iter().enumerate() {
            assert_eq!(topo.vertices().get_by_id(id).unwrap().collapse_cost(), *cost);
        }

        topo.refresh_costs_around(n).unwrap();
        assert!(topo.vertex(n).unwrap().collapse_cost().is_finite());
        assert!(topo.vertex(n).unwrap().collapse_target().is_some());
    }

    #[test]
    fn test_split_edge_counts() {
        let mut topo = build(&tetrahedron());
        let e = topo.key(0).unwrap();
        let mid = topo.edge_center(e).unwrap();
        let n = topo.split_edge_key(e, mid).unwrap();

        assert_eq!(topo.vertex_count(), 5);
        assert_eq!(topo.edge_count(), 9);
        assert_eq!(topo.face_count(), 6);
        assert_eq!(topo.vertex(n).unwrap().valence(), 4);
        assert_eq!(topo.vertex(n).unwrap().faces().len(), 4);
        assert!(topo.edge(e).is_err());
        topo.validate().unwrap();
        for (_, _, edge) in topo.edges().iter() {
            assert!(edge.is_manifold());
        }
    }

    #[test]
    fn test_split_edge_keeps_winding() {
        // Every interior edge of a consistently wound closed mesh is
        // traversed once in each direction.
        let mut topo = build(&octahedron());
        topo.split_edge(3, Point3d::new(0.0, 0.0, 0.0)).unwrap();

        let mut directed = std::collections::HashSet::new();
        for f in topo.faces().keys() {
            let c = corner_ids(&topo, f);
            for k in 0..3 {
                assert!(directed.insert((c[k], c[(k + 1) % 3])));
            }
        }
        for &(a, b) in &directed {
            assert!(directed.contains(&(b, a)));
        }
    }

    #[test]
    fn test_split_boundary_edge_rejected() {
        let mut topo = build(&single_triangle());
        let err = topo.split_edge(0, Point3d::new(0.5, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert_eq!(topo.vertex_count(), 3);
        assert_eq!(topo.edge_count(), 3);
        assert_eq!(topo.face_count(), 1);
    }

    #[test]
    fn test_retriangulate_dispatch() {
        let mut topo = build(&tetrahedron());
        topo.retriangulate(Element::Face(1), Point3d::new(0.5, 0.3, 0.3)).unwrap();
        assert_eq!(topo.face_count(), 6);
        topo.retriangulate(Element::Edge(0), Point3d::new(0.0, 0.5, 0.0)).unwrap();
        assert_eq!(topo.face_count(), 8);
        assert!(matches!(
            topo.retriangulate(Element::Vertex(0), Point3d::origin()),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            topo.retriangulate(Element::Face(99), Point3d::origin()),
            Err(Error::InvalidId { .. })
        ));
        topo.validate().unwrap();
    }
}
