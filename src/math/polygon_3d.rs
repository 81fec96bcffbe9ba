use super::{unit_normal, Point3, Vector3};

/// Area of a planar 3D polygon.
///
/// Sums the cross products of consecutive position vectors around the loop
/// and projects the total onto the unit normal of the first three vertices.
/// Exact for any planar simple polygon, convex or not. Fewer than 3 points
/// is not a polygon and has zero area.
#[must_use]
pub fn polygon_area(points: &[Point3]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut total = Vector3::zeros();
    for i in 0..n {
        let vi1 = points[i].coords;
        let vi2 = points[(i + 1) % n].coords;
        total += vi1.cross(&vi2);
    }
    let normal = unit_normal(&points[0], &points[1], &points[2]);
    (total.dot(&normal) / 2.0).abs()
}

/// Vertex mean of a polygon. Used as the anchor for sight rays and for
/// shrinking windows toward the middle of a wall.
///
/// # Panics
///
/// Panics on an empty slice.
#[must_use]
pub fn polygon_centroid(points: &[Point3]) -> Point3 {
    assert!(!points.is_empty(), "centroid of an empty polygon");
    let sum: Vector3 = points.iter().map(|p| p.coords).sum();
    Point3::from(sum / points.len() as f64)
}

/// Tilt of a polygon in degrees: the angle between its plane normal and the
/// vertical axis. A vertical wall has a tilt of 90, an upward-facing roof 0.
///
/// Non-finite for degenerate polygons whose first three vertices are
/// collinear.
#[must_use]
pub fn polygon_tilt(points: &[Point3]) -> f64 {
    let normal = unit_normal(&points[0], &points[1], &points[2]);
    super::angle_between_degrees(&normal, &Vector3::z())
}
