use tracing::{debug, warn};

use crate::error::{GeometryError, Result};
use crate::geometry::{Polygon, Surface};
use crate::math::polygon_3d::polygon_tilt;
use crate::math::{angle_between_degrees, CloseTolerance, Point3, Vector3};

/// Controls which surfaces the rectangle merger may fuse.
///
/// Shading decimation and envelope simplification run the same algorithm
/// with different eligibility rules, so both live behind this one knob set.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Require equal (and present) zone and construction ids before fusing.
    pub match_zone_and_construction: bool,
    /// Area-weight the glazing attributes of fused pairs.
    pub average_glazing: bool,
    /// Tolerance for vertex identity, z-levels, tilt and right angles.
    pub tolerance: CloseTolerance,
}

impl MergeOptions {
    /// Shading-surface decimation: geometry is all that matters.
    #[must_use]
    pub fn shading() -> Self {
        Self::default()
    }

    /// Envelope wall simplification: fuse only within a zone and
    /// construction, carrying the glazing attributes along.
    #[must_use]
    pub fn envelope() -> Self {
        Self {
            match_zone_and_construction: true,
            average_glazing: true,
            tolerance: CloseTolerance::default(),
        }
    }
}

/// Result of running the merger to its fixed point.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The surviving surfaces, with fused polygons and attributes.
    pub surfaces: Vec<Surface>,
    /// Ids of the surfaces consumed by a merge, in merge order.
    pub deleted: Vec<String>,
}

/// Fuses vertically-stacked, coplanar, rectangular surfaces until no more
/// pairs can be fused.
///
/// Each pass examines every unordered pair of eligible surfaces (exactly 4
/// vertices, vertical, rectangular): a pair sharing exactly two vertices and
/// sitting at different heights is fused into one rectangle spanning both,
/// the upper surface surviving. Passes repeat until one produces no merges.
/// Surfaces failing the eligibility filter are left alone, never deleted.
///
/// The input slice is not touched; on error the caller's surface set is
/// exactly as it was.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateRectangle`] when a candidate pair
/// passes the rectangularity filter but has a malformed z-structure (other
/// than two distinct z-levels, or no canonical vertex rotation) — corrupt
/// input, not a skippable condition.
pub fn simplify_rectangles(surfaces: &[Surface], options: &MergeOptions) -> Result<MergeOutcome> {
    let mut working: Vec<Surface> = surfaces.to_vec();
    let mut deleted: Vec<String> = Vec::new();
    loop {
        let removed = merge_one_pass(&mut working, options)?;
        if removed.is_empty() {
            break;
        }
        working.retain(|s| !removed.contains(&s.id));
        deleted.extend(removed);
    }
    Ok(MergeOutcome {
        surfaces: working,
        deleted,
    })
}

/// One pairwise pass. Fused polygons are visible to later pairs in the same
/// pass, so a survivor can grow through several merges per pass. Returns the
/// ids of the surfaces consumed.
fn merge_one_pass(surfaces: &mut [Surface], options: &MergeOptions) -> Result<Vec<String>> {
    let tol = &options.tolerance;
    let eligible: Vec<usize> = (0..surfaces.len())
        .filter(|&i| is_mergeable_rectangle(&surfaces[i], tol))
        .collect();
    debug!(candidates = eligible.len(), "rectangle merge pass");

    let mut removed: Vec<String> = Vec::new();
    for i in 0..eligible.len() {
        for j in (i + 1)..eligible.len() {
            let (a, b) = (eligible[i], eligible[j]);
            if removed.contains(&surfaces[a].id) || removed.contains(&surfaces[b].id) {
                // one of these has already been merged this pass
                continue;
            }
            if options.match_zone_and_construction
                && !same_zone_and_construction(&surfaces[a], &surfaces[b])
            {
                continue;
            }
            let pa = surfaces[a].polygon.points();
            let pb = surfaces[b].polygon.points();
            if points_in_common(pa, pb, tol) != 2 {
                // cannot possibly share an edge
                continue;
            }
            let ca = canonical_rotation(pa, tol)?;
            let cb = canonical_rotation(pb, tol)?;
            if tol.is_close(ca[0].z, cb[0].z) {
                // side by side, not stacked
                continue;
            }
            // Index so `upper` sits on top of `lower`:
            //   u1 ----- u2
            //   |        |
            //   u0 ----- u3   (u0 == l1, u3 == l2)
            //   |        |
            //   l0 ----- l3
            let (upper, lower, cu, cl) = if ca[0].z < cb[0].z {
                (b, a, cb, ca)
            } else {
                (a, b, ca, cb)
            };
            let fused = Polygon::new(vec![cl[0], cu[1], cu[2], cl[3]])?;
            if options.average_glazing {
                let area_upper = surfaces[upper].polygon.area();
                let area_lower = surfaces[lower].polygon.area();
                let upper_glazing = surfaces[upper].glazing.unwrap_or_default();
                let lower_glazing = surfaces[lower].glazing.unwrap_or_default();
                surfaces[upper].glazing =
                    Some(upper_glazing.weighted_average(&lower_glazing, area_upper, area_lower));
            }
            surfaces[upper].polygon = fused;
            debug!(
                kept = %surfaces[upper].id,
                merged = %surfaces[lower].id,
                "fused stacked rectangles"
            );
            removed.push(surfaces[lower].id.clone());
        }
    }
    Ok(removed)
}

/// Precondition filter: exactly 4 vertices, vertical (tilt within tolerance
/// of 90 degrees) and rectangular (adjacent edges meet at right angles).
/// Polygons whose tilt cannot be computed are skipped with a diagnostic.
fn is_mergeable_rectangle(surface: &Surface, tol: &CloseTolerance) -> bool {
    let points = surface.polygon.points();
    if points.len() != 4 {
        return false;
    }
    let tilt = polygon_tilt(points);
    if !tilt.is_finite() {
        warn!(surface = %surface.id, "bad polygon, tilt is undefined");
        return false;
    }
    if !tol.is_close(90.0, tilt) {
        return false;
    }
    let edges: Vec<Vector3> = (0..4).map(|k| points[k] - points[(k + 1) % 4]).collect();
    (0..4).all(|k| tol.is_close(90.0, angle_between_degrees(&edges[k], &edges[(k + 1) % 4])))
}

fn same_zone_and_construction(a: &Surface, b: &Surface) -> bool {
    a.zone_id.is_some()
        && a.zone_id == b.zone_id
        && a.construction_id.is_some()
        && a.construction_id == b.construction_id
}

/// Number of vertices of `a` that also appear in `b`.
fn points_in_common(a: &[Point3], b: &[Point3], tol: &CloseTolerance) -> usize {
    a.iter()
        .filter(|va| b.iter().any(|vb| tol.same_point(va, vb)))
        .count()
}

/// Rotates a rectangle's vertices so traversal starts at a lower-z corner
/// and proceeds to the diagonal upper-z corner:
/// `[a, b, c, d]` with `a.z < b.z`, `a.z == d.z`, `b.z == c.z`, `c.z > d.z`.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateRectangle`] when the quadrilateral has
/// other than two distinct z-levels, or no rotation is canonical.
fn canonical_rotation(
    points: &[Point3],
    tol: &CloseTolerance,
) -> std::result::Result<[Point3; 4], GeometryError> {
    let mut quad: [Point3; 4] = points.try_into().map_err(|_| {
        GeometryError::DegenerateRectangle(format!("expected 4 vertices, got {}", points.len()))
    })?;

    let mut levels: Vec<f64> = Vec::new();
    for point in &quad {
        if !levels.iter().any(|&level| tol.is_close(level, point.z)) {
            levels.push(point.z);
        }
    }
    if levels.len() != 2 {
        return Err(GeometryError::DegenerateRectangle(format!(
            "expected exactly two z-levels, found {levels:?}"
        )));
    }

    for _ in 0..4 {
        if is_canonical(&quad, tol) {
            return Ok(quad);
        }
        quad.rotate_left(1);
    }
    Err(GeometryError::DegenerateRectangle(format!(
        "no canonical rotation for {quad:?}"
    )))
}

fn is_canonical(quad: &[Point3; 4], tol: &CloseTolerance) -> bool {
    quad[0].z < quad[1].z
        && tol.is_close(quad[0].z, quad[3].z)
        && tol.is_close(quad[1].z, quad[2].z)
        && quad[2].z > quad[3].z
}
