//! Point and vector types

use nalgebra::{Point3, Vector3};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Below this sine of the corner angle at `a`, a triangle counts as flat.
const DEGENERATE_SINE: f64 = 1e-12;

/// Unit normal of the triangle `(a, b, c)` following its winding,
/// or `None` when the triangle has (numerically) zero area.
///
/// Flatness is judged relative to the edge lengths at `a`, so the result
/// does not depend on the scale of the mesh.
pub fn triangle_normal(a: &Point3d, b: &Point3d, c: &Point3d) -> Option<Vector3d> {
    let (ab, ac) = (b - a, c - a);
    let cross = ab.cross(&ac);
    let norm = cross.norm();
    let scale = ab.norm() * ac.norm();
    if scale == 0.0 || norm <= scale * DEGENERATE_SINE {
        return None;
    }
    Some(cross / norm)
}

/// Area of the triangle `(a, b, c)`.
pub fn triangle_area(a: &Point3d, b: &Point3d, c: &Point3d) -> f64 {
    (b - a).cross(&(c - a)).norm() / 2.0
}

/// Arithmetic mean of a set of points, `None` for an empty set.
pub fn centroid<'a, I>(points: I) -> Option<Point3d>
where
    I: IntoIterator<Item = &'a Point3d>,
{
    let mut sum = Vector3d::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p.coords;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(Point3d::from(sum / count as f64))
}
