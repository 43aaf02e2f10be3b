//! Triangle mesh topology with local editing and simplification
//!
//! This crate maintains an explicit vertex/edge/face incidence structure
//! over a closed or open triangle mesh and provides:
//! - Construction from a [`PolygonMesh`] with up-front manifold checks
//! - Face and edge splits for local refinement
//! - Edge collapse with boundary-ring re-triangulation
//! - A curvature-weighted collapse cost and cheapest-vertex selection
//! - Greedy face coloring and export to a [`TriangleMesh`]

pub mod arena;
pub mod entity;
pub mod topology;
pub mod builder;
pub mod cost;
pub mod split;
pub mod collapse;
pub mod coloring;
pub mod export;
pub mod decimate;

pub use arena::Arena;
pub use entity::*;
pub use topology::*;
pub use builder::validate_polygon_mesh;
pub use collapse::CollapseSummary;
pub use decimate::*;

use meshtopo_core::{PolygonMesh, Result, TriangleMesh};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Simplify mesh with target reduction ratio (0.0 = no reduction, 1.0 = maximum reduction)
    fn simplify(&self, mesh: &PolygonMesh, reduction_ratio: f64) -> Result<TriangleMesh>;
}
