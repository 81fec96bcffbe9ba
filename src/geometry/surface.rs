use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RecordError, Result};
use crate::math::Point3;

use super::Polygon;

/// Category of a surface, deciding whether it belongs to the simulated
/// building envelope or is only an external obstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    Wall,
    Roof,
    Floor,
    Shading,
}

impl SurfaceKind {
    /// True for obstruction surfaces that only matter for solar shading.
    #[must_use]
    pub fn is_shading(self) -> bool {
        matches!(self, Self::Shading)
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wall => "wall",
            Self::Roof => "roof",
            Self::Floor => "floor",
            Self::Shading => "shading",
        };
        f.write_str(name)
    }
}

impl FromStr for SurfaceKind {
    type Err = RecordError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "wall" => Ok(Self::Wall),
            "roof" => Ok(Self::Roof),
            "floor" => Ok(Self::Floor),
            "shading" => Ok(Self::Shading),
            other => Err(RecordError::UnknownKind(other.to_owned())),
        }
    }
}

/// Glazing and envelope attributes carried alongside a wall surface.
///
/// The field set is fixed by the exchange schema; see [`Self::FIELDS`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlazingAttributes {
    pub ratio: f64,
    pub g_value: f64,
    pub u_value: f64,
    pub short_wave_reflectance: f64,
    pub wall_u_value: f64,
}

impl GlazingAttributes {
    /// The schema's attribute names, in schema order.
    pub const FIELDS: [&'static str; 5] = [
        "GlazingRatio",
        "GlazingGValue",
        "GlazingUValue",
        "ShortWaveReflectance",
        "Uvalue",
    ];

    /// Builds attributes from a field-name map, validating names against the
    /// schema. Missing fields default to 0.0.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownGlazingAttribute`] for a field name
    /// outside the schema.
    pub fn from_fields(fields: &BTreeMap<String, f64>) -> std::result::Result<Self, RecordError> {
        for name in fields.keys() {
            if !Self::FIELDS.contains(&name.as_str()) {
                return Err(RecordError::UnknownGlazingAttribute(name.clone()));
            }
        }
        let get = |name: &str| fields.get(name).copied().unwrap_or(0.0);
        Ok(Self {
            ratio: get("GlazingRatio"),
            g_value: get("GlazingGValue"),
            u_value: get("GlazingUValue"),
            short_wave_reflectance: get("ShortWaveReflectance"),
            wall_u_value: get("Uvalue"),
        })
    }

    /// Area-weighted average of two attribute sets, used when fusing two
    /// wall surfaces into one.
    #[must_use]
    pub fn weighted_average(&self, other: &Self, area_self: f64, area_other: f64) -> Self {
        let avg = |a: f64, b: f64| (area_self * a + area_other * b) / (area_self + area_other);
        Self {
            ratio: avg(self.ratio, other.ratio),
            g_value: avg(self.g_value, other.g_value),
            u_value: avg(self.u_value, other.u_value),
            short_wave_reflectance: avg(self.short_wave_reflectance, other.short_wave_reflectance),
            wall_u_value: avg(self.wall_u_value, other.wall_u_value),
        }
    }
}

/// A building or obstruction surface: a validated polygon plus the
/// provenance metadata the merge eligibility test consults.
#[derive(Debug, Clone)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub id: String,
    pub polygon: Polygon,
    pub zone_id: Option<String>,
    pub construction_id: Option<String>,
    pub glazing: Option<GlazingAttributes>,
}

impl Surface {
    /// Builds a surface from a boundary record, validating the polygon and
    /// the glazing field names.
    ///
    /// # Errors
    ///
    /// Returns the polygon's [`GeometryError`](crate::error::GeometryError)
    /// or a [`RecordError`] for schema violations.
    pub fn from_record(record: SurfaceRecord) -> Result<Self> {
        let points = record
            .points
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect();
        let polygon = Polygon::new(points)?;
        let glazing = record
            .glazing
            .as_ref()
            .map(GlazingAttributes::from_fields)
            .transpose()?;
        Ok(Self {
            kind: record.kind,
            id: record.id,
            polygon,
            zone_id: record.zone_id,
            construction_id: record.construction_id,
            glazing,
        })
    }
}

/// The flat exchange shape produced by the IDF/XML glue layer: one surface
/// as a kind, an id, raw vertex triples and optional metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceRecord {
    pub kind: SurfaceKind,
    pub id: String,
    pub points: Vec<[f64; 3]>,
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub construction_id: Option<String>,
    #[serde(default)]
    pub glazing: Option<BTreeMap<String, f64>>,
}

/// Builds surfaces from a batch of records, skipping invalid ones.
///
/// A record whose polygon is not planar (or whose metadata violates the
/// schema) is dropped with a diagnostic; the rest of the batch is unaffected.
#[must_use]
pub fn build_surfaces(records: Vec<SurfaceRecord>) -> Vec<Surface> {
    let mut surfaces = Vec::with_capacity(records.len());
    for record in records {
        let id = record.id.clone();
        match Surface::from_record(record) {
            Ok(surface) => surfaces.push(surface),
            Err(err) => warn!(surface = %id, %err, "skipping invalid surface record"),
        }
    }
    surfaces
}

/// Allocates stable synthetic identifiers for external keys.
///
/// The first id handed out for a key is returned for every later lookup of
/// that key, for the lifetime of the allocator. Replaces ad-hoc global
/// counters in format converters.
#[derive(Debug, Default)]
pub struct IdentifierAllocator {
    prefix: String,
    ids: HashMap<String, String>,
    next: u64,
}

impl IdentifierAllocator {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ids: HashMap::new(),
            next: 0,
        }
    }

    /// The id for `key`, allocating a fresh one on first sight.
    pub fn id_for(&mut self, key: &str) -> String {
        if let Some(id) = self.ids.get(key) {
            return id.clone();
        }
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        self.ids.insert(key.to_owned(), id.clone());
        id
    }

    /// Number of distinct keys seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
