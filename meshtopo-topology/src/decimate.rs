//! Greedy decimation driven by the curvature-weighted collapse cost

use crate::entity::VertexKey;
use crate::topology::Topology;
use crate::MeshSimplifier;
use meshtopo_core::{DecimationConfig, Error, PolygonMesh, Result, TriangleMesh};
use std::collections::HashSet;
use tracing::{debug, info};

/// Why a decimation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The face count reached the target
    TargetReached,
    /// The cheapest remaining collapse costs more than the configured limit
    CostLimit,
    /// Every remaining candidate was rejected
    NoCandidates,
}

/// Outcome of [`decimate_topology`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecimationReport {
    pub collapses: usize,
    /// Collapse attempts refused by a precondition
    pub rejected: usize,
    /// Vertices without edges that were dropped outright
    pub isolated_removed: usize,
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub stop: StopReason,
}

/// Collapse the cheapest vertex into its target until `topology` has at
/// most `target_faces` faces.
///
/// A vertex whose collapse is rejected is passed over until a later
/// collapse changes its neighbourhood. Vertices without edges are removed;
/// vertices whose costs were never computed (fresh split vertices) get
/// them computed when first selected.
pub fn decimate_topology(
    topology: &mut Topology,
    config: &DecimationConfig,
    target_faces: usize,
) -> DecimationReport {
    info!(
        faces = topology.face_count(),
        target_faces,
        max_cost = ?config.max_cost,
        "Starting decimation"
    );

    let mut skipped: HashSet<VertexKey> = HashSet::new();
    let mut collapses = 0;
    let mut rejected = 0;
    let mut isolated_removed = 0;

    let stop = loop {
        if topology.face_count() <= target_faces {
            break StopReason::TargetReached;
        }

        let candidate = topology
            .cheapest_vertex(|k| !skipped.contains(&k))
            .and_then(|id| topology.vertices().key_at(id));
        let Some(v0) = candidate else {
            break StopReason::NoCandidates;
        };

        let (cost, target, valence) = match topology.vertex(v0) {
            Ok(vertex) => (vertex.collapse_cost(), vertex.collapse_target(), vertex.valence()),
            Err(_) => break StopReason::NoCandidates,
        };
        if target.is_none() && valence > 0 {
            // Costs left stale by a split: compute them and reconsider.
            let refreshed = topology
                .compute_collapse_cost_at_vertex(v0)
                .and_then(|()| topology.vertex(v0).map(|v| v.collapse_target().is_some()));
            if !matches!(refreshed, Ok(true)) {
                skipped.insert(v0);
            }
            continue;
        }
        if config.max_cost.is_some_and(|limit| cost > limit) {
            break StopReason::CostLimit;
        }

        let Some(v1) = target else {
            if topology.remove_vertex(v0).is_ok() {
                isolated_removed += 1;
            } else {
                skipped.insert(v0);
            }
            continue;
        };

        match topology.collapse_edge_keys(v0, v1) {
            Ok(summary) => {
                collapses += 1;
                release_skipped(topology, &summary.refreshed, &mut skipped);
            }
            Err(err) => {
                debug!(%err, cost, "Collapse rejected");
                rejected += 1;
                skipped.insert(v0);
            }
        }
    };

    let report = DecimationReport {
        collapses,
        rejected,
        isolated_removed,
        vertices: topology.vertex_count(),
        edges: topology.edge_count(),
        faces: topology.face_count(),
        stop,
    };
    info!(
        collapses,
        rejected,
        faces = report.faces,
        stop = ?report.stop,
        "Finished decimation"
    );
    report
}

/// Make the refreshed vertices and their one-rings candidates again.
fn release_skipped(
    topology: &Topology,
    refreshed: &[VertexKey],
    skipped: &mut HashSet<VertexKey>,
) {
    for &v in refreshed {
        skipped.remove(&v);
        if let Ok(neighbours) = topology.neighbors(v) {
            for n in neighbours {
                skipped.remove(&n);
            }
        }
    }
}

/// Simplifier collapsing the cheapest vertices first, with costs from
/// edge length and local crease sharpness.
#[derive(Debug, Clone, Default)]
pub struct CurvatureDecimator {
    pub config: DecimationConfig,
}

impl CurvatureDecimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecimationConfig) -> Self {
        Self { config }
    }
}

impl MeshSimplifier for CurvatureDecimator {
    fn simplify(&self, mesh: &PolygonMesh, reduction_ratio: f64) -> Result<TriangleMesh> {
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&reduction_ratio) {
            return Err(Error::InvalidData(
                "Reduction ratio must be between 0.0 and 1.0".to_string(),
            ));
        }

        let mut topology = Topology::from_polygon_mesh(mesh, self.config.cost)?;
        let target_faces = self
            .config
            .target_faces
            .unwrap_or(((1.0 - reduction_ratio) * topology.face_count() as f64) as usize);

        decimate_topology(&mut topology, &self.config, target_faces);
        topology.to_triangle_mesh(&self.config.coloring)
    }
}
