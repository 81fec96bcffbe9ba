use thiserror::Error;

/// Top-level error type for the envelope3d toolkit.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("polygon is not planar: vertex {vertex} lies off the plane (det = {det:e})")]
    NotPlanar { vertex: usize, det: f64 },

    #[error("degenerate rectangle: {0}")]
    DegenerateRectangle(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to boundary surface records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("unknown surface kind: {0}")]
    UnknownKind(String),

    #[error("unknown glazing attribute: {0}")]
    UnknownGlazingAttribute(String),
}

/// Convenience type alias for results using [`EnvelopeError`].
pub type Result<T> = std::result::Result<T, EnvelopeError>;
