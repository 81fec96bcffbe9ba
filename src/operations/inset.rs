use crate::math::polygon_3d::{polygon_area, polygon_centroid};
use crate::math::Point3;

/// Default tolerance on the achieved area ratio.
pub const DEFAULT_AREA_EPSILON: f64 = 0.001;

const MAX_ITERATIONS: u32 = 1000;

/// Shrinks a rectangular wall polygon toward its centroid until the new
/// rectangle's area is `ratio` times the original, within `epsilon`.
///
/// Each candidate moves every vertex toward the centroid by the current
/// shrink step; the step is then nudged by half of itself up or down
/// depending on whether the candidate is still too large or too small.
/// Used to place a centered window of a given glazing ratio inside a wall.
///
/// Returns `None` when no candidate within tolerance is found after the
/// iteration cap — an expected outcome for extreme ratios, not an error.
#[must_use]
pub fn inset_rectangle(points: &[Point3], ratio: f64, epsilon: f64) -> Option<Vec<Point3>> {
    let original_area = polygon_area(points);
    let centroid = polygon_centroid(points);
    let mut step = 0.5; // valid steps: 0..1
    for _ in 0..=MAX_ITERATIONS {
        let candidate: Vec<Point3> = points
            .iter()
            .map(|p| p + step * (centroid - p))
            .collect();
        let current_ratio = polygon_area(&candidate) / original_area;
        if (current_ratio - ratio).abs() < epsilon {
            return Some(candidate);
        }
        if current_ratio > ratio {
            step += step / 2.0; // shrink further
        } else {
            step -= step / 2.0; // shrink less
        }
    }
    None
}
