use tracing::{debug, warn};

use crate::geometry::{Ray, Surface};
use crate::math::Point3;

/// Determines which shading surfaces a building actually "sees".
///
/// For every building surface, a sight ray is cast from its centroid toward
/// the centroid of each shading candidate. The ray is intersected against
/// every other surface (building and shading alike); whichever surface it
/// hits first — nearest by Euclidean distance from the building centroid —
/// is the one the facade sees. A shading surface is kept only if it is the
/// first hit of at least one such ray.
///
/// Returns the ids of the shading surfaces to retain; the caller deletes the
/// rest from its own store. When two hits are equidistant the surface
/// encountered first in input order wins.
#[must_use]
pub fn cull_shading(building: &[Surface], shading: &[Surface]) -> Vec<String> {
    let all: Vec<&Surface> = building.iter().chain(shading.iter()).collect();
    let mut keep: Vec<&str> = Vec::new();

    for bsurf in building {
        let origin = bsurf.polygon.centroid();
        debug!(surface = %bsurf.id, "culling pass for building surface");
        for ssurf in shading {
            let target = ssurf.polygon.centroid();
            let ray = match Ray::between(&origin, &target) {
                Ok(ray) => ray,
                Err(err) => {
                    warn!(
                        building = %bsurf.id,
                        shading = %ssurf.id,
                        %err,
                        "skipping degenerate sight ray"
                    );
                    continue;
                }
            };
            if let Some(first) = first_intersection(&ray, &origin, &all, &bsurf.id) {
                if first.kind.is_shading() && !keep.contains(&first.id.as_str()) {
                    debug!(building = %bsurf.id, kept = %first.id, "shading surface is seen");
                    keep.push(&first.id);
                }
            }
        }
    }

    shading
        .iter()
        .filter(|s| keep.contains(&s.id.as_str()))
        .map(|s| s.id.clone())
        .collect()
}

/// The surface a ray hits first: the intersected surface whose hit point is
/// nearest to `origin`. The surface with id `exclude_id` (the ray's own
/// source) is never considered.
fn first_intersection<'a>(
    ray: &Ray,
    origin: &Point3,
    surfaces: &[&'a Surface],
    exclude_id: &str,
) -> Option<&'a Surface> {
    let mut nearest: Option<(&Surface, f64)> = None;
    for &surface in surfaces {
        if surface.id == exclude_id {
            continue;
        }
        if let Some(point) = surface.polygon.intersect(ray) {
            let distance = (point - origin).norm();
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((surface, distance)),
            }
        }
    }
    nearest.map(|(surface, _)| surface)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Polygon, SurfaceKind};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// A unit square in the plane y = `depth`, facing along y.
    fn square_at(kind: SurfaceKind, id: &str, depth: f64) -> Surface {
        Surface {
            kind,
            id: id.to_owned(),
            polygon: Polygon::new(vec![
                p(0.0, depth, 0.0),
                p(1.0, depth, 0.0),
                p(1.0, depth, 1.0),
                p(0.0, depth, 1.0),
            ])
            .unwrap(),
            zone_id: None,
            construction_id: None,
            glazing: None,
        }
    }

    #[test]
    fn no_candidates_keeps_nothing() {
        let building = vec![square_at(SurfaceKind::Wall, "facade", 0.0)];
        assert!(cull_shading(&building, &[]).is_empty());
    }

    #[test]
    fn unobstructed_shading_is_kept() {
        let building = vec![square_at(SurfaceKind::Wall, "facade", 0.0)];
        let shading = vec![square_at(SurfaceKind::Shading, "front", 2.0)];
        assert_eq!(cull_shading(&building, &shading), vec!["front".to_owned()]);
    }

    #[test]
    fn occluded_shading_is_discarded() {
        // Two obstructions along the same sight line: only the nearer one is
        // ever the first hit, so the farther one is culled.
        let building = vec![square_at(SurfaceKind::Wall, "facade", 0.0)];
        let shading = vec![
            square_at(SurfaceKind::Shading, "front", 2.0),
            square_at(SurfaceKind::Shading, "behind", 4.0),
        ];
        assert_eq!(cull_shading(&building, &shading), vec!["front".to_owned()]);
    }

    #[test]
    fn nearest_hit_wins_and_source_is_excluded() {
        let facade = square_at(SurfaceKind::Wall, "facade", 0.0);
        let wall = square_at(SurfaceKind::Wall, "other-wall", 1.0);
        let obstruction = square_at(SurfaceKind::Shading, "obstruction", 3.0);
        let all = vec![&facade, &wall, &obstruction];

        let origin = facade.polygon.centroid();
        let ray = Ray::between(&origin, &obstruction.polygon.centroid()).unwrap();
        // The building's own back wall is the first thing this ray hits,
        // so the ray contributes no kept shading surface.
        let first = first_intersection(&ray, &origin, &all, "facade").unwrap();
        assert_eq!(first.id, "other-wall");
        assert!(!first.kind.is_shading());
    }

    #[test]
    fn edge_on_obstruction_is_never_seen() {
        // Horizontal obstruction whose plane contains the sight ray: the
        // ray is parallel to it, hits nothing, and the surface is culled.
        let building = vec![square_at(SurfaceKind::Wall, "facade", 0.0)];
        let slab = Surface {
            kind: SurfaceKind::Shading,
            id: "slab".to_owned(),
            polygon: Polygon::new(vec![
                p(0.0, 1.0, 0.5),
                p(1.0, 1.0, 0.5),
                p(1.0, 2.0, 0.5),
                p(0.0, 2.0, 0.5),
            ])
            .unwrap(),
            zone_id: None,
            construction_id: None,
            glazing: None,
        };
        assert!(cull_shading(&building, &[slab]).is_empty());
    }

    #[test]
    fn each_facade_contributes_kept_surfaces() {
        // Obstructions on opposite sides of the building, one per facade.
        let south = square_at(SurfaceKind::Wall, "south", 0.0);
        let north = square_at(SurfaceKind::Wall, "north", 1.0);
        let shading = vec![
            square_at(SurfaceKind::Shading, "south-block", -2.0),
            square_at(SurfaceKind::Shading, "north-block", 3.0),
        ];
        let kept = cull_shading(&[south, north], &shading);
        assert!(kept.contains(&"south-block".to_owned()));
        assert!(kept.contains(&"north-block".to_owned()));
    }
}
