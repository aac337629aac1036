use thiserror::Error;

/// Top-level error type for the brush geometry kernel.
///
/// Degenerate outcomes of valid input (a brush that becomes null, a redundant
/// face) are not errors; they are reported through
/// [`AddFaceResult`](crate::polyhedron::AddFaceResult).
#[derive(Debug, Error)]
pub enum BrushError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

impl BrushError {
    /// Returns `true` if this error signals a broken boundary graph, i.e. a
    /// kernel bug rather than bad caller input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Topology(_))
    }
}

/// Errors related to geometric input.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Internal-consistency errors of the vertex/edge/side stores.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("entity still referenced: {0}")]
    StillReferenced(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Convenience type alias for results using [`BrushError`].
pub type Result<T> = std::result::Result<T, BrushError>;
