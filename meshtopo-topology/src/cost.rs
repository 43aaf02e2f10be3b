//! Curvature-weighted collapse costs and cheapest-vertex selection
//!
//! The cost of collapsing `v0` into an edge neighbour `v1` is the edge length
//! times a crease term: for every face around `v0`, take the smallest crease
//! between its normal and the normals of the faces on the edge, then the
//! largest of those. Short edges in flat regions are cheap, edges near sharp
//! creases are expensive. This is a cheap stand-in for a quadric error, not
//! a bound on visual distortion.

use crate::entity::VertexKey;
use crate::topology::Topology;
use meshtopo_core::{CostConfig, Error, Result};
use tracing::trace;

impl Topology {
    pub fn cost_config(&self) -> &CostConfig {
        &self.cost_config
    }

    /// Replace the cost parameters and recompute every vertex.
    pub fn set_cost_config(&mut self, cost_config: CostConfig) -> Result<()> {
        self.cost_config = cost_config;
        self.initialize_collapse_costs()
    }

    /// Cost of merging `v0` into its edge neighbour `v1`.
    pub fn collapse_cost(&self, v0: VertexKey, v1: VertexKey) -> Result<f64> {
        let vertex0 = self.vertex(v0)?;
        let vertex1 = self.vertex(v1)?;
        let edge_key = self.edge_with_vertices(v0, v1).ok_or_else(|| {
            Error::Precondition("collapse cost requested for vertices without an edge".into())
        })?;
        let edge = self.edge(edge_key)?;

        let length = (vertex1.position - vertex0.position).norm();

        let mut curvature = 0.0f64;
        for &f in &vertex0.faces {
            let normal = self.face(f)?.normal;
            let mut min_crease = self.cost_config.max_crease();
            for &g in &edge.faces {
                let dot = normal.dot(&self.face(g)?.normal);
                min_crease = min_crease.min(self.cost_config.crease(dot));
            }
            curvature = curvature.max(min_crease);
        }

        Ok(length * curvature)
    }

    /// Recompute the cached cost and target of one vertex: the cheapest
    /// collapse into any edge neighbour, the earliest neighbour winning ties.
    /// A vertex without edges gets the isolated sentinel and no target.
    pub fn compute_collapse_cost_at_vertex(&mut self, v: VertexKey) -> Result<()> {
        let neighbours = self.neighbors(v)?;

        let (cost, target) = if neighbours.is_empty() {
            (self.cost_config.isolated_vertex_cost, None)
        } else {
            let mut best = (f64::INFINITY, None);
            for n in neighbours {
                let cost = self.collapse_cost(v, n)?;
                if cost < best.0 || best.1.is_none() {
                    best = (cost, Some(n));
                }
            }
            best
        };

        let vertex = self.entity_mut(v)?;
        vertex.collapse_cost = cost;
        vertex.collapse_target = target;
        trace!(cost, "Refreshed collapse cost");
        Ok(())
    }

    /// Compute the collapse cost of every vertex, stopping at the first
    /// vertex whose neighbourhood is inconsistent.
    pub fn initialize_collapse_costs(&mut self) -> Result<()> {
        let keys: Vec<VertexKey> = self.vertices.keys().collect();
        for v in keys {
            self.compute_collapse_cost_at_vertex(v)?;
        }
        Ok(())
    }

    /// Recompute `v` and every vertex sharing an edge with it. Splits leave
    /// costs alone; call this on the new vertex before simplifying further.
    pub fn refresh_costs_around(&mut self, v: VertexKey) -> Result<()> {
        let neighbours = self.neighbors(v)?;
        self.compute_collapse_cost_at_vertex(v)?;
        for n in neighbours {
            self.compute_collapse_cost_at_vertex(n)?;
        }
        Ok(())
    }

    /// ID of the vertex with the smallest cached collapse cost, the lowest
    /// ID winning ties. Selection only; nothing is collapsed.
    pub fn vertex_to_collapse(&self) -> Option<usize> {
        self.cheapest_vertex(|_| true)
    }

    /// Like [`Topology::vertex_to_collapse`], restricted to vertices for
    /// which `eligible` holds.
    pub fn cheapest_vertex<F>(&self, eligible: F) -> Option<usize>
    where
        F: Fn(VertexKey) -> bool,
    {
        let mut best: Option<(usize, f64)> = None;
        for (id, key, vertex) in self.vertices.iter() {
            if vertex.collapse_cost.is_nan() || !eligible(key) {
                continue;
            }
            match best {
                Some((_, cost)) if vertex.collapse_cost >= cost => {}
                _ => best = Some((id, vertex.collapse_cost)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Cached collapse target of the vertex with ID `id`, as an ID.
    pub fn collapse_target(&self, id: usize) -> Result<Option<usize>> {
        let vertex = self.vertex(self.key(id)?)?;
        vertex.collapse_target.map(|t| self.id(t)).transpose()
    }
}
