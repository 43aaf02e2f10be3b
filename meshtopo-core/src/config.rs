//! Tunable parameters for the cost model, the colorizer and decimation

use crate::palette::PALETTE_SIZE;
use serde::{Deserialize, Serialize};

/// Parameters of the curvature-weighted collapse cost.
///
/// The crease term between two face normals is
/// `(crease_offset - dot(n_f, n_g)) * crease_scale`, which with the
/// defaults maps parallel normals to 0 and opposite normals to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub crease_offset: f64,
    pub crease_scale: f64,
    /// Cost given to vertices without edges. Must stay below every real
    /// cost so that isolated vertices are always selected first.
    pub isolated_vertex_cost: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            crease_offset: 1.0,
            crease_scale: 0.5,
            isolated_vertex_cost: -0.01,
        }
    }
}

impl CostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_crease_weights(mut self, offset: f64, scale: f64) -> Self {
        self.crease_offset = offset;
        self.crease_scale = scale;
        self
    }

    #[must_use]
    pub fn with_isolated_vertex_cost(mut self, cost: f64) -> Self {
        self.isolated_vertex_cost = cost;
        self
    }

    /// Crease term for a pair of unit normals given their dot product.
    pub fn crease(&self, dot: f64) -> f64 {
        (self.crease_offset - dot) * self.crease_scale
    }

    /// Largest value [`CostConfig::crease`] takes for unit normals.
    pub fn max_crease(&self) -> f64 {
        self.crease(-1.0).max(self.crease(1.0))
    }
}

/// What the colorizer does when every palette slot is taken by a neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaletteExhaustion {
    /// Fail with [`crate::Error::PaletteExhausted`] and leave colors untouched.
    #[default]
    Reject,
    /// Use the lowest index past the palette that no neighbour uses.
    Grow,
}

/// Parameters of the greedy face colorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColoringConfig {
    pub palette_size: usize,
    pub exhaustion: PaletteExhaustion,
}

impl Default for ColoringConfig {
    fn default() -> Self {
        Self {
            palette_size: PALETTE_SIZE,
            exhaustion: PaletteExhaustion::Reject,
        }
    }
}

impl ColoringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }

    #[must_use]
    pub fn with_exhaustion(mut self, exhaustion: PaletteExhaustion) -> Self {
        self.exhaustion = exhaustion;
        self
    }
}

/// Parameters of a decimation run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimationConfig {
    /// Stop once the face count is at or below this value. Overrides the
    /// reduction ratio passed to the simplifier.
    pub target_faces: Option<usize>,
    /// Stop when the cheapest remaining collapse costs more than this.
    pub max_cost: Option<f64>,
    pub cost: CostConfig,
    pub coloring: ColoringConfig,
}

impl DecimationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decimate down to `count` faces.
    #[must_use]
    pub fn with_target_faces(count: usize) -> Self {
        Self {
            target_faces: Some(count),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.max_cost = Some(max_cost);
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: CostConfig) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_coloring(mut self, coloring: ColoringConfig) -> Self {
        self.coloring = coloring;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_crease_range() {
        let cost = CostConfig::default();
        assert_relative_eq!(cost.crease(1.0), 0.0);
        assert_relative_eq!(cost.crease(-1.0), 1.0);
        assert_relative_eq!(cost.crease(0.0), 0.5);
        assert_relative_eq!(cost.max_crease(), 1.0);
        assert!(cost.isolated_vertex_cost < 0.0);
    }

    #[test]
    fn test_builders() {
        let cost = CostConfig::new()
            .with_crease_weights(2.0, 1.0)
            .with_isolated_vertex_cost(-1.0);
        assert_relative_eq!(cost.crease(1.0), 1.0);
        assert_relative_eq!(cost.max_crease(), 3.0);

        let coloring = ColoringConfig::new()
            .with_palette_size(3)
            .with_exhaustion(PaletteExhaustion::Grow);
        assert_eq!(coloring.palette_size, 3);
        assert_eq!(coloring.exhaustion, PaletteExhaustion::Grow);

        let decimation = DecimationConfig::with_target_faces(10)
            .with_max_cost(0.5)
            .with_cost(cost)
            .with_coloring(coloring);
        assert_eq!(decimation.target_faces, Some(10));
        assert_eq!(decimation.max_cost, Some(0.5));
        assert_eq!(decimation.coloring.palette_size, 3);
    }

    #[test]
    fn test_default_coloring_uses_full_palette() {
        let coloring = ColoringConfig::default();
        assert_eq!(coloring.palette_size, PALETTE_SIZE);
        assert_eq!(coloring.exhaustion, PaletteExhaustion::Reject);
    }
}
