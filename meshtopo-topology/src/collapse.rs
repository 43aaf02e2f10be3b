//! Edge collapse: merge a vertex into an edge neighbour and re-fan the hole
//!
//! Collapsing `v0` into `v1` removes `v0` with every edge and face around
//! it, leaving a hole bounded by the ring of edges opposite `v0`. The ring
//! is walked starting and ending at `v1` and closed with a fan of triangles
//! anchored at `v1`. For a vertex of valence `k` that removes `k` edges and
//! faces and adds `k - 3` spokes and `k - 2` faces, so a collapse always
//! costs one vertex, three edges and two faces.
//!
//! All preconditions are checked before the first entity is created or
//! removed; a rejected collapse leaves the topology untouched.

use crate::entity::{EdgeKey, FaceKey, VertexKey};
use crate::topology::Topology;
use meshtopo_core::{triangle_normal, Error, Result, Vector3d};
use std::collections::HashMap;
use tracing::debug;

/// What a successful collapse did.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapseSummary {
    /// The surviving vertex
    pub survivor: VertexKey,
    pub faces_removed: usize,
    pub faces_created: usize,
    pub edges_created: usize,
    /// The former neighbours of the removed vertex, whose costs were refreshed
    pub refreshed: Vec<VertexKey>,
}

/// A triangle of the fan, ready to be linked.
struct FanFace {
    corners: [VertexKey; 3],
    normal: Vector3d,
}

impl Topology {
    /// Merge vertex `v0` into vertex `v1`, by dense IDs.
    pub fn collapse_edge(&mut self, v0: usize, v1: usize) -> Result<CollapseSummary> {
        let k0 = self.key(v0)?;
        let k1 = self.key(v1)?;
        self.collapse_edge_keys(k0, k1)
    }

    /// Merge `v0` into `v1`, eliminating `v0`.
    ///
    /// Rejected with [`Error::Precondition`] when the vertices are not joined
    /// by an edge, when `v0` lies on a boundary, when the ring around `v0` is
    /// not a single loop through `v1`, when the two vertices share
    /// neighbours other than the apexes of their edge, or when the fan would
    /// contain a zero-area or duplicate triangle.
    pub fn collapse_edge_keys(&mut self, v0: VertexKey, v1: VertexKey) -> Result<CollapseSummary> {
        if v0 == v1 {
            return Err(Error::Precondition("cannot collapse a vertex into itself".into()));
        }
        self.vertex(v1)?;
        let vertex0 = self.vertex(v0)?;
        let collapsed = self
            .edge_with_vertices(v0, v1)
            .ok_or_else(|| Error::Precondition("vertices are not joined by an edge".into()))?;

        // Snapshot by key: dense IDs shift as soon as removal starts.
        let star_edges: Vec<EdgeKey> = vertex0.edges().to_vec();
        let star_faces: Vec<FaceKey> = vertex0.faces().to_vec();
        let outer = self.neighbors(v0)?;

        for &e in &star_edges {
            if !self.edge(e)?.is_manifold() {
                return Err(Error::Precondition(
                    "collapsed vertex lies on a boundary".into(),
                ));
            }
        }

        self.check_link_condition(v0, v1, collapsed)?;

        let ring = self.boundary_ring(&star_edges, &star_faces)?;
        let ordered = self.order_ring(&ring, v1)?;
        let fan = self.plan_fan(v0, v1, &ordered)?;

        // Commit. Spokes join v1 to the inner ring vertices; the two ends of
        // the ring already touch v1.
        let mut spokes: HashMap<VertexKey, EdgeKey> = HashMap::new();
        for &(e, _) in &ordered {
            if let Some(other) = self.edge(e)?.opposite(v1) {
                spokes.insert(other, e);
            }
        }
        let mut edges_created = 0;
        for face in &fan {
            for &v in &face.corners {
                if v != v1 && !spokes.contains_key(&v) {
                    spokes.insert(v, self.create_edge());
                    edges_created += 1;
                }
            }
        }

        let ring_edges: HashMap<(VertexKey, VertexKey), EdgeKey> = ordered
            .iter()
            .map(|&(e, _)| -> Result<((VertexKey, VertexKey), EdgeKey)> {
                let [a, b] = self
                    .edge(e)?
                    .endpoints()
                    .ok_or_else(|| Error::InvalidData("ring edge without endpoints".into()))?;
                Ok(((a, b), e))
            })
            .collect::<Result<_>>()?;
        let edge_for = |x: VertexKey, y: VertexKey| -> Result<EdgeKey> {
            let edge = if x == v1 {
                spokes.get(&y)
            } else if y == v1 {
                spokes.get(&x)
            } else {
                ring_edges.get(&(x, y)).or_else(|| ring_edges.get(&(y, x)))
            };
            edge.copied()
                .ok_or_else(|| Error::InvalidData("fan edge missing".into()))
        };

        let mut fan_edges = Vec::with_capacity(fan.len());
        for face in &fan {
            let [p, q, r] = face.corners;
            fan_edges.push([edge_for(p, q)?, edge_for(q, r)?, edge_for(r, p)?]);
        }
        for (face, [epq, eqr, erp]) in fan.iter().zip(fan_edges) {
            let [p, q, r] = face.corners;
            let f = self.create_face(face.normal);
            self.add_triangle(p, q, r, epq, eqr, erp, f)?;
        }

        self.remove_vertex(v0)?;
        for &e in &star_edges {
            self.remove_edge(e)?;
        }
        for &f in &star_faces {
            self.remove_face(f)?;
        }

        for &v in &outer {
            self.compute_collapse_cost_at_vertex(v)?;
        }

        debug!(
            valence = star_edges.len(),
            vertices = self.vertex_count(),
            edges = self.edge_count(),
            faces = self.face_count(),
            "Collapsed edge"
        );

        Ok(CollapseSummary {
            survivor: v1,
            faces_removed: star_faces.len(),
            faces_created: fan.len(),
            edges_created,
            refreshed: outer,
        })
    }

    /// The common neighbours of `v0` and `v1` must be exactly the apexes of
    /// the two faces on their edge, or the fan would duplicate an edge.
    fn check_link_condition(&self, v0: VertexKey, v1: VertexKey, collapsed: EdgeKey) -> Result<()> {
        let edge = self.edge(collapsed)?;
        let mut apexes = Vec::with_capacity(2);
        for &f in edge.faces() {
            let apex = self
                .face(f)?
                .apex(v0, v1)
                .ok_or_else(|| Error::InvalidData("face does not contain its edge".into()))?;
            apexes.push(apex);
        }

        let n1 = self.neighbors(v1)?;
        let common: Vec<VertexKey> = self
            .neighbors(v0)?
            .into_iter()
            .filter(|v| n1.contains(v))
            .collect();

        if common.len() != apexes.len() || !common.iter().all(|v| apexes.contains(v)) {
            return Err(Error::Precondition(format!(
                "link condition fails: {} common neighbours, {} apexes",
                common.len(),
                apexes.len()
            )));
        }
        Ok(())
    }

    /// Edges of the faces around `v0` that do not touch `v0`, each with the
    /// face it was found in.
    fn boundary_ring(
        &self,
        star_edges: &[EdgeKey],
        star_faces: &[FaceKey],
    ) -> Result<Vec<(EdgeKey, FaceKey)>> {
        let mut ring: Vec<(EdgeKey, FaceKey)> = Vec::with_capacity(star_faces.len());
        for &f in star_faces {
            for &e in self.face(f)?.edges() {
                if star_edges.contains(&e) {
                    continue;
                }
                if ring.iter().any(|&(r, _)| r == e) {
                    return Err(Error::Precondition(
                        "ring edge is shared by two faces around the collapsed vertex".into(),
                    ));
                }
                ring.push((e, f));
            }
        }
        Ok(ring)
    }

    /// Chain the ring into one loop that leaves `v1` and returns to it.
    fn order_ring(
        &self,
        ring: &[(EdgeKey, FaceKey)],
        v1: VertexKey,
    ) -> Result<Vec<(EdgeKey, FaceKey)>> {
        let mut used = vec![false; ring.len()];
        let mut ordered = Vec::with_capacity(ring.len());
        let mut cursor = v1;

        loop {
            let mut next = None;
            for (i, &(e, _)) in ring.iter().enumerate() {
                if used[i] {
                    continue;
                }
                if let Some(other) = self.edge(e)?.opposite(cursor) {
                    next = Some((i, other));
                    break;
                }
            }
            let Some((i, other)) = next else { break };
            used[i] = true;
            ordered.push(ring[i]);
            cursor = other;
            if cursor == v1 {
                break;
            }
        }

        if cursor != v1 || ordered.len() != ring.len() || ordered.len() < 3 {
            return Err(Error::Precondition(
                "boundary ring is not a single loop through the target vertex".into(),
            ));
        }
        Ok(ordered)
    }

    /// One triangle per ring edge away from `v1`, in the winding of the face
    /// it replaces with `v0` swapped for `v1`.
    fn plan_fan(
        &self,
        v0: VertexKey,
        v1: VertexKey,
        ordered: &[(EdgeKey, FaceKey)],
    ) -> Result<Vec<FanFace>> {
        let mut fan = Vec::with_capacity(ordered.len().saturating_sub(2));
        for &(e, f) in ordered {
            let edge = self.edge(e)?;
            if edge.contains(v1) {
                continue;
            }

            // The face on the far side of this ring edge must not already be
            // the triangle we are about to create.
            for &g in edge.faces() {
                if g != f && self.face(g)?.vertices().contains(&v1) {
                    return Err(Error::Precondition(
                        "collapse would duplicate an existing face".into(),
                    ));
                }
            }

            let corners: [VertexKey; 3] = self
                .face(f)?
                .substituted(v0, v1)
                .try_into()
                .map_err(|_| Error::InvalidData("face is not a triangle".into()))?;
            let [p, q, r] = corners.map(|v| self.vertex(v).map(|vertex| vertex.position));
            let normal = triangle_normal(&p?, &q?, &r?).ok_or_else(|| {
                Error::Precondition("collapse would create a zero-area triangle".into())
            })?;
            fan.push(FanFace { corners, normal });
        }
        Ok(fan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes::{bipyramid, octahedron, single_triangle, tetrahedron};
    use meshtopo_core::{CostConfig, PolygonMesh};
    use std::collections::HashSet;

    fn build(mesh: &PolygonMesh) -> Topology {
        Topology::from_polygon_mesh(mesh, CostConfig::default()).unwrap()
    }

    fn counts(topo: &Topology) -> (usize, usize, usize) {
        (topo.vertex_count(), topo.edge_count(), topo.face_count())
    }

    /// Every edge of a closed, consistently wound mesh is walked once in
    /// each direction.
    fn assert_consistent_winding(topo: &Topology) {
        let mut directed = HashSet::new();
        for (_, _, f) in topo.faces().iter() {
            let c = f.vertices();
            for k in 0..3 {
                assert!(directed.insert((c[k], c[(k + 1) % 3])));
            }
        }
        for &(a, b) in &directed {
            assert!(directed.contains(&(b, a)));
        }
    }

    #[test]
    fn test_octahedron_collapse_counts() {
        let mut topo = build(&octahedron());
        let v0 = topo.vertex_to_collapse().unwrap();
        let v1 = topo.collapse_target(v0).unwrap().unwrap();
        let summary = topo.collapse_edge(v0, v1).unwrap();

        assert_eq!(counts(&topo), (5, 9, 6));
        assert_eq!(summary.faces_removed, 4);
        assert_eq!(summary.faces_created, 2);
        assert_eq!(summary.edges_created, 1);
        assert_eq!(summary.refreshed.len(), 4);
        topo.validate().unwrap();
        for (_, _, e) in topo.edges().iter() {
            assert!(e.is_manifold());
        }
        assert_consistent_winding(&topo);
    }

    #[test]
    fn test_keys_survive_compaction() {
        let mut topo = build(&octahedron());
        let last = topo.key::<VertexKey>(5).unwrap();
        let position = topo.vertex(last).unwrap().position;
        let v0 = topo.key::<VertexKey>(0).unwrap();
        let target = topo.vertex(v0).unwrap().collapse_target().unwrap();
        let summary = topo.collapse_edge_keys(v0, target).unwrap();

        // The last vertex moved into the freed ID 0; its key still resolves.
        assert_eq!(topo.id(last).unwrap(), 0);
        assert_eq!(topo.vertex(last).unwrap().position, position);
        assert_eq!(topo.vertex(v0).unwrap_err(), Error::StaleHandle("vertex"));
        assert_eq!(summary.survivor, target);
        assert!(topo.vertex(target).is_ok());
    }

    #[test]
    fn test_collapse_refreshes_neighbour_costs() {
        let mut topo = build(&octahedron());
        let summary = topo.collapse_edge(0, 2).unwrap();
        for v in summary.refreshed {
            let vertex = topo.vertex(v).unwrap();
            let target = vertex.collapse_target().unwrap();
            assert!(topo.vertex(target).is_ok());
            assert!(topo.edge_with_vertices(v, target).is_some());
            assert!(vertex.collapse_cost().is_finite());
        }
    }

    #[test]
    fn test_high_valence_collapse() {
        // The top pole of a hexagonal bipyramid has valence 6: six faces go,
        // four come back and three diagonals are added.
        let mut topo = build(&bipyramid(6));
        assert_eq!(counts(&topo), (8, 18, 12));
        let summary = topo.collapse_edge(6, 0).unwrap();

        assert_eq!(counts(&topo), (7, 15, 10));
        assert_eq!(summary.faces_removed, 6);
        assert_eq!(summary.faces_created, 4);
        assert_eq!(summary.edges_created, 3);
        topo.validate().unwrap();
        assert_consistent_winding(&topo);

        let survivor = topo.vertex(summary.survivor).unwrap();
        assert_eq!(survivor.valence(), 6);
        for (_, _, f) in topo.faces().iter() {
            assert!(f.normal.norm() > 0.99);
        }
    }

    #[test]
    fn test_split_then_collapse_round_trip() {
        let mut topo = build(&single_triangle());
        let center = topo.face_center(topo.key(0).unwrap()).unwrap();
        let n = topo.split_face(0, center).unwrap();
        assert_eq!(counts(&topo), (4, 6, 3));

        let v0 = topo.id(n).unwrap();
        let summary = topo.collapse_edge(v0, 0).unwrap();
        assert_eq!(counts(&topo), (3, 3, 1));
        assert_eq!(summary.edges_created, 0);
        assert_eq!(summary.faces_created, 1);
        topo.validate().unwrap();

        let face = topo.faces().get_by_id(0).unwrap();
        let ids: Vec<usize> = face.vertices().iter().map(|&k| topo.id(k).unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn test_round_trip_into_each_corner() {
        for corner in 0..3 {
            let mut topo = build(&octahedron());
            let f = topo.key::<FaceKey>(3).unwrap();
            let corner_key = topo.face(f).unwrap().vertices()[corner];
            let center = topo.face_center(f).unwrap();
            let n = topo.split_face_key(f, center).unwrap();
            topo.refresh_costs_around(n).unwrap();

            topo.collapse_edge_keys(n, corner_key).unwrap();
            assert_eq!(counts(&topo), (6, 12, 8));
            topo.validate().unwrap();
            assert_consistent_winding(&topo);
        }
    }

    #[test]
    fn test_rejects_non_adjacent() {
        let mut topo = build(&octahedron());
        // Vertices 0 and 1 are opposite poles.
        let err = topo.collapse_edge(0, 1).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(matches!(topo.collapse_edge(0, 0), Err(Error::Precondition(_))));
        assert!(matches!(topo.collapse_edge(0, 17), Err(Error::InvalidId { .. })));
        assert_eq!(counts(&topo), (6, 12, 8));
    }

    #[test]
    fn test_rejects_boundary_vertex() {
        let mut topo = build(&single_triangle());
        let err = topo.collapse_edge(0, 1).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert_eq!(counts(&topo), (3, 3, 1));
        topo.validate().unwrap();
    }

    #[test]
    fn test_rejects_tetrahedron_collapse() {
        // Any tetrahedron collapse would fold it into two copies of the
        // same triangle.
        let mut topo = build(&tetrahedron());
        let err = topo.collapse_edge(0, 1).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert_eq!(counts(&topo), (4, 6, 4));
        topo.validate().unwrap();
    }

    #[test]
    fn test_rejects_link_condition_violation() {
        let mut topo = build(&octahedron());
        let key = |topo: &Topology, id| topo.key::<VertexKey>(id).unwrap();
        let (v0, v2, v3) = (key(&topo, 0), key(&topo, 2), key(&topo, 3));
        topo.collapse_edge_keys(v0, v2).unwrap();

        // 2 and 3 are now joined, and share neighbour 1 besides the apexes
        // 4 and 5 of their edge.
        let before = counts(&topo);
        let err = topo.collapse_edge_keys(v3, v2).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert_eq!(counts(&topo), before);
        topo.validate().unwrap();
    }
}
