use std::f64::consts::PI;

use crate::error::GeometryError;
use crate::math::polygon_3d::{polygon_area, polygon_centroid};
use crate::math::{det3x3, nearly_equal, Point3, Vector3, TOLERANCE};

/// A planar, convex, ordered loop of 3D points.
///
/// The point list is cyclic (the last vertex connects back to the first) and
/// immutable once built. Construction validates that every vertex lies on the
/// plane spanned by the loop; the membership and intersection tests below
/// assume convexity.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point3>,
}

impl Polygon {
    /// Builds a polygon, checking planarity.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::TooFewPoints`] for fewer than 3 points, and
    /// [`GeometryError::NotPlanar`] when any vertex beyond the first three
    /// lies off the common plane: for each sliding triple the parallelepiped
    /// volume spanned with the anchor vertex must vanish.
    pub fn new(points: Vec<Point3>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewPoints(points.len()));
        }
        if points.len() > 3 {
            let x0 = points[0];
            for i in 1..points.len() - 2 {
                let r0 = x0 - points[i];
                let r1 = x0 - points[i + 1];
                let r2 = x0 - points[i + 2];
                let det = det3x3(&[
                    [r0.x, r0.y, r0.z],
                    [r1.x, r1.y, r1.z],
                    [r2.x, r2.y, r2.z],
                ]);
                if !nearly_equal(det, 0.0) {
                    return Err(GeometryError::NotPlanar { vertex: i + 2, det });
                }
            }
        }
        Ok(Self { points })
    }

    /// The vertex loop, in construction order.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Unit normal of the polygon's plane, from its first three vertices.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        let vec1 = self.points[0] - self.points[1];
        let vec2 = self.points[0] - self.points[2];
        let cross = vec1.cross(&vec2);
        cross / cross.norm()
    }

    /// Vertex mean of the loop.
    #[must_use]
    pub fn centroid(&self) -> Point3 {
        polygon_centroid(&self.points)
    }

    /// Area of the loop.
    #[must_use]
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Whether a point (assumed coplanar) lies within the polygon's extent.
    ///
    /// Angle-sum test: the signed angles subtended by the point against each
    /// consecutive vertex pair add up to a full turn exactly when the point
    /// is inside. A point coinciding with a vertex counts as on the surface.
    #[must_use]
    pub fn on_surface(&self, point: &Point3) -> bool {
        let n = self.points.len();
        let mut angle_sum = 0.0;
        for i in 0..n {
            let v1 = self.points[i] - point;
            let v2 = self.points[(i + 1) % n] - point;
            let m1 = v1.norm();
            let m2 = v2.norm();
            if nearly_equal(m1 * m2, 0.0) {
                // point is one of the vertices
                return true;
            }
            let cos = (v1.dot(&v2) / (m1 * m2)).clamp(-1.0, 1.0);
            angle_sum += cos.acos();
        }
        nearly_equal(angle_sum, 2.0 * PI)
    }

    /// Intersection of a ray with the polygon, if any.
    ///
    /// Returns `None` when the ray is parallel to the polygon's plane, when
    /// the plane lies behind the ray origin, or when the plane intersection
    /// falls outside the polygon. Never yields more than one point.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<Point3> {
        let normal = self.normal();
        let denom = ray.direction.dot(&normal);
        if nearly_equal(denom, 0.0) {
            return None;
        }
        let t = (normal.dot(&self.points[0].coords) - normal.dot(&ray.origin.coords)) / denom;
        if t < 0.0 {
            return None;
        }
        let point = ray.origin + ray.direction * t;
        if self.on_surface(&point) {
            Some(point)
        } else {
            None
        }
    }
}

/// A ray in the global Cartesian frame: an origin and a unit direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] for a zero-length direction.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self, GeometryError> {
        let norm = direction.norm();
        if norm < TOLERANCE {
            return Err(GeometryError::ZeroVector);
        }
        Ok(Self {
            origin,
            direction: direction / norm,
        })
    }

    /// Sight ray from one point toward another.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] when the points coincide.
    pub fn between(from: &Point3, to: &Point3) -> Result<Self, GeometryError> {
        Self::new(*from, to - from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ])
        .unwrap()
    }

    // ── construction ──

    #[test]
    fn triangle_always_builds() {
        assert!(Polygon::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 5.0)]).is_ok());
    }

    #[test]
    fn too_few_points_rejected() {
        let err = Polygon::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, GeometryError::TooFewPoints(2)));
    }

    #[test]
    fn off_plane_vertex_rejected() {
        let err = Polygon::new(vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.5),
        ])
        .unwrap_err();
        assert!(matches!(err, GeometryError::NotPlanar { vertex: 3, .. }));
    }

    #[test]
    fn coplanar_pentagon_builds() {
        let poly = Polygon::new(vec![
            p(0.0, 0.0, 2.0),
            p(2.0, 0.0, 2.0),
            p(3.0, 1.0, 2.0),
            p(1.0, 2.0, 2.0),
            p(-1.0, 1.0, 2.0),
        ]);
        assert!(poly.is_ok());
    }

    // ── on_surface ──

    #[test]
    fn interior_point_is_on_surface() {
        assert!(unit_square().on_surface(&p(0.5, 0.5, 0.0)));
    }

    #[test]
    fn exterior_point_is_not_on_surface() {
        assert!(!unit_square().on_surface(&p(2.0, 0.5, 0.0)));
    }

    #[test]
    fn vertex_counts_as_on_surface() {
        let square = unit_square();
        for vertex in square.points().to_vec() {
            assert!(square.on_surface(&vertex));
        }
    }

    // ── intersect ──

    #[test]
    fn ray_through_square_hits() {
        let square = unit_square();
        let ray = Ray::new(p(0.5, 0.5, 3.0), v(0.0, 0.0, -1.0)).unwrap();
        let hit = square.intersect(&ray).unwrap();
        assert!((hit - p(0.5, 0.5, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn ray_parallel_to_plane_misses() {
        let square = unit_square();
        let ray = Ray::new(p(0.5, 0.5, 3.0), v(1.0, 0.0, 0.0)).unwrap();
        assert!(square.intersect(&ray).is_none());
    }

    #[test]
    fn plane_behind_ray_misses() {
        let square = unit_square();
        let ray = Ray::new(p(0.5, 0.5, 3.0), v(0.0, 0.0, 1.0)).unwrap();
        assert!(square.intersect(&ray).is_none());
    }

    #[test]
    fn plane_hit_outside_polygon_misses() {
        let square = unit_square();
        let ray = Ray::new(p(5.0, 5.0, 3.0), v(0.0, 0.0, -1.0)).unwrap();
        assert!(square.intersect(&ray).is_none());
    }

    // ── Ray ──

    #[test]
    fn ray_direction_is_normalized() {
        let ray = Ray::new(p(0.0, 0.0, 0.0), v(0.0, 3.0, 4.0)).unwrap();
        assert!((ray.direction.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_direction_rejected() {
        let err = Ray::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, GeometryError::ZeroVector));
        let err = Ray::between(&p(1.0, 1.0, 1.0), &p(1.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, GeometryError::ZeroVector));
    }
}
