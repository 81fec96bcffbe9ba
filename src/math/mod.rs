pub mod polygon_3d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Absolute tolerance for exact floating-point equality checks.
pub const TOLERANCE: f64 = 1e-12;

/// Exact-equality comparison: `|a - b| < 1e-12`.
#[must_use]
pub fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < TOLERANCE
}

/// Relative/absolute "close enough" comparison for physical quantities.
///
/// `is_close(a, b)` holds when `|a - b| <= atol + rtol * |b|`. The defaults
/// match what building models are typically exported with; widen them for
/// noisier input.
#[derive(Debug, Clone, Copy)]
pub struct CloseTolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for CloseTolerance {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl CloseTolerance {
    #[must_use]
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.atol + self.rtol * b.abs()
    }

    /// True when two points agree component-wise within this tolerance.
    #[must_use]
    pub fn same_point(&self, a: &Point3, b: &Point3) -> bool {
        self.is_close(a.x, b.x) && self.is_close(a.y, b.y) && self.is_close(a.z, b.z)
    }
}

/// Determinant of a 3x3 matrix by cofactor expansion.
#[must_use]
pub fn det3x3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * m[1][1] * m[2][2] + m[0][1] * m[1][2] * m[2][0] + m[0][2] * m[1][0] * m[2][1]
        - m[0][2] * m[1][1] * m[2][0]
        - m[0][1] * m[1][0] * m[2][2]
        - m[0][0] * m[1][2] * m[2][1]
}

/// Unit normal of the plane through three non-collinear points.
///
/// Computed from the three homogeneous-coordinate determinants. Collinear
/// input has zero magnitude and yields non-finite components; callers must
/// not feed collinear triples.
#[must_use]
pub fn unit_normal(a: &Point3, b: &Point3, c: &Point3) -> Vector3 {
    let x = det3x3(&[[1.0, a.y, a.z], [1.0, b.y, b.z], [1.0, c.y, c.z]]);
    let y = det3x3(&[[a.x, 1.0, a.z], [b.x, 1.0, b.z], [c.x, 1.0, c.z]]);
    let z = det3x3(&[[a.x, a.y, 1.0], [b.x, b.y, 1.0], [c.x, c.y, 1.0]]);
    let magnitude = (x * x + y * y + z * z).sqrt();
    Vector3::new(x / magnitude, y / magnitude, z / magnitude)
}

/// Angle between two vectors, in degrees.
///
/// Zero-length input yields a non-finite result rather than an error.
#[must_use]
pub fn angle_between_degrees(a: &Vector3, b: &Vector3) -> f64 {
    let denom = a.norm() * b.norm();
    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}
