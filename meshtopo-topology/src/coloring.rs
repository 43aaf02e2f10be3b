//! Greedy face coloring for flat-shaded rendering

use crate::entity::FaceKey;
use crate::topology::Topology;
use itertools::Itertools;
use meshtopo_core::{ColoringConfig, Error, PaletteExhaustion, Result};
use tracing::{debug, warn};

impl Topology {
    /// Assign every face a palette index different from the faces it
    /// shares an edge with.
    ///
    /// Faces are visited in ID order and take the lowest free slot in
    /// `0..palette_size`. When every slot is used by a neighbour the
    /// [`PaletteExhaustion`] policy decides: `Reject` fails without touching
    /// the current colors, `Grow` takes the lowest free index past the
    /// palette. Returns the number of distinct indices used.
    pub fn compute_face_coloring(&mut self, config: &ColoringConfig) -> Result<usize> {
        let mut colors: Vec<usize> = Vec::with_capacity(self.face_count());

        for (id, _, face) in self.faces.iter() {
            // Faces with a higher ID have not been colored in this pass.
            let mut taken = Vec::with_capacity(3);
            for &e in face.edges() {
                for &g in self.edge(e)?.faces() {
                    match self.faces.id_of(g) {
                        Some(gid) if gid < id => taken.push(colors[gid]),
                        _ => {}
                    }
                }
            }

            let mut color = lowest_free(&taken, 0);
            if color >= config.palette_size {
                match config.exhaustion {
                    PaletteExhaustion::Reject => {
                        return Err(Error::PaletteExhausted {
                            face: id,
                            palette_size: config.palette_size,
                        })
                    }
                    PaletteExhaustion::Grow => {
                        color = lowest_free(&taken, config.palette_size);
                        warn!(face = id, color, "Palette exhausted, growing");
                    }
                }
            }
            colors.push(color);
        }

        let keys: Vec<FaceKey> = self.faces.keys().collect();
        for (key, &color) in keys.into_iter().zip(&colors) {
            self.entity_mut(key)?.color = Some(color);
        }

        let used = colors.iter().unique().count();
        debug!(faces = colors.len(), colors = used, "Colored faces");
        Ok(used)
    }

    /// Palette index of every face by ID, `None` until colored.
    pub fn face_colors(&self) -> Vec<Option<usize>> {
        self.faces.iter().map(|(_, _, f)| f.color()).collect()
    }

    /// Forget all assigned colors.
    pub fn clear_face_colors(&mut self) {
        let keys: Vec<FaceKey> = self.faces.keys().collect();
        for key in keys {
            if let Some(face) = self.faces.get_mut(key) {
                face.color = None;
            }
        }
    }
}

fn lowest_free(taken: &[usize], from: usize) -> usize {
    let mut color = from;
    while taken.contains(&color) {
        color += 1;
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes::{bipyramid, octahedron, tetrahedron};
    use meshtopo_core::{CostConfig, PolygonMesh, PALETTE_SIZE};

    fn build(mesh: &PolygonMesh) -> Topology {
        Topology::from_polygon_mesh(mesh, CostConfig::default()).unwrap()
    }

    fn assert_proper(topo: &Topology) {
        for (id, _, edge) in topo.edges().iter() {
            if let [f, g] = edge.faces() {
                let (a, b) = (topo.face(*f).unwrap().color(), topo.face(*g).unwrap().color());
                assert!(a.is_some());
                assert_ne!(a, b, "edge {} joins two faces of the same color", id);
            }
        }
    }

    #[test]
    fn test_octahedron_coloring() {
        let mut topo = build(&octahedron());
        let used = topo.compute_face_coloring(&ColoringConfig::default()).unwrap();
        // The octahedron's faces alternate like a checkerboard.
        assert_eq!(used, 2);
        assert!(used <= 3);
        assert_proper(&topo);
        assert_eq!(
            topo.face_colors(),
            vec![Some(0), Some(1), Some(0), Some(1), Some(1), Some(0), Some(1), Some(0)]
        );
    }

    #[test]
    fn test_tetrahedron_needs_four() {
        let mut topo = build(&tetrahedron());
        let used = topo.compute_face_coloring(&ColoringConfig::default()).unwrap();
        assert_eq!(used, 4);
        assert_proper(&topo);
    }

    #[test]
    fn test_reject_leaves_colors_untouched() {
        let mut topo = build(&octahedron());
        topo.compute_face_coloring(&ColoringConfig::default()).unwrap();
        let before = topo.face_colors();

        let config = ColoringConfig::default().with_palette_size(1);
        let err = topo.compute_face_coloring(&config).unwrap_err();
        assert_eq!(err, Error::PaletteExhausted { face: 1, palette_size: 1 });
        assert_eq!(topo.face_colors(), before);
    }

    #[test]
    fn test_grow_goes_past_palette() {
        let mut topo = build(&tetrahedron());
        let config = ColoringConfig::default()
            .with_palette_size(2)
            .with_exhaustion(PaletteExhaustion::Grow);
        let used = topo.compute_face_coloring(&config).unwrap();
        assert_eq!(used, 4);
        assert_proper(&topo);
        assert!(topo.face_colors().iter().any(|c| c.unwrap() >= 2));
    }

    #[test]
    fn test_recolor_after_mutation() {
        let mut topo = build(&bipyramid(6));
        topo.compute_face_coloring(&ColoringConfig::default()).unwrap();
        topo.collapse_edge(6, 0).unwrap();
        let center = topo.face_center(topo.key(0).unwrap()).unwrap();
        topo.split_face(0, center).unwrap();

        let used = topo.compute_face_coloring(&ColoringConfig::default()).unwrap();
        assert!(used <= PALETTE_SIZE);
        assert_proper(&topo);

        topo.clear_face_colors();
        assert!(topo.face_colors().iter().all(Option::is_none));
    }
}
