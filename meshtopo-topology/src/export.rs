//! Conversion of a topology into the renderer's triangle mesh

use crate::topology::Topology;
use meshtopo_core::{ColoringConfig, Error, Result, TriangleMesh};

impl Topology {
    /// Color the faces, then take a snapshot for rendering.
    pub fn to_triangle_mesh(&mut self, coloring: &ColoringConfig) -> Result<TriangleMesh> {
        self.compute_face_coloring(coloring)?;
        self.snapshot()
    }

    /// Copy the current geometry out: points by vertex ID, triangles by face
    /// ID in winding order. Colors are included only if every face has one.
    ///
    /// The result holds plain indices and shares nothing with the topology,
    /// so later mutations do not affect it.
    pub fn snapshot(&self) -> Result<TriangleMesh> {
        let vertices = self
            .vertices
            .iter()
            .map(|(_, _, v)| v.position)
            .collect();

        let mut faces = Vec::with_capacity(self.face_count());
        for (id, _, face) in self.faces.iter() {
            let corners = face
                .corners()
                .ok_or_else(|| Error::InvalidData(format!("face {} is not a triangle", id)))?;
            let mut triangle = [0; 3];
            for (slot, v) in triangle.iter_mut().zip(corners) {
                *slot = self.id(v)?;
            }
            faces.push(triangle);
        }

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if let Some(colors) = self.face_colors().into_iter().collect::<Option<Vec<_>>>() {
            mesh.set_face_colors(colors);
        }
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes::{octahedron, tetrahedron};
    use meshtopo_core::{CostConfig, GRAYSCALE_PALETTE};

    #[test]
    fn test_export_matches_input() {
        let mesh = octahedron();
        let mut topo = Topology::from_polygon_mesh(&mesh, CostConfig::default()).unwrap();
        let out = topo.to_triangle_mesh(&ColoringConfig::default()).unwrap();

        assert_eq!(out.vertices, mesh.vertices);
        let input: Vec<[usize; 3]> = mesh.triangles().into_iter().map(|(t, _)| t).collect();
        assert_eq!(out.faces, input);
        assert_eq!(out.face_colors.as_ref().unwrap().len(), 8);

        let rgb = out.face_palette_colors(&GRAYSCALE_PALETTE).unwrap();
        assert_eq!(rgb[0], GRAYSCALE_PALETTE[0]);
        assert_eq!(rgb[1], GRAYSCALE_PALETTE[1]);
    }

    #[test]
    fn test_export_after_collapse_is_compact() {
        let mut topo = Topology::from_polygon_mesh(&octahedron(), CostConfig::default()).unwrap();
        topo.collapse_edge(0, 2).unwrap();
        let out = topo.to_triangle_mesh(&ColoringConfig::default()).unwrap();

        assert_eq!(out.vertex_count(), 5);
        assert_eq!(out.face_count(), 6);
        assert!(out.faces.iter().flatten().all(|&i| i < 5));
        for n in out.calculate_face_normals() {
            assert!((n.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_snapshot_without_colors() {
        let topo = Topology::from_polygon_mesh(&tetrahedron(), CostConfig::default()).unwrap();
        let out = topo.snapshot().unwrap();
        assert_eq!(out.face_count(), 4);
        assert!(out.face_colors.is_none());
    }

    #[test]
    fn test_failed_coloring_exports_nothing() {
        let mut topo = Topology::from_polygon_mesh(&tetrahedron(), CostConfig::default()).unwrap();
        let config = ColoringConfig::default().with_palette_size(3);
        assert!(matches!(
            topo.to_triangle_mesh(&config),
            Err(Error::PaletteExhausted { face: 3, palette_size: 3 })
        ));
    }
}
