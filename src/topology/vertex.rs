use crate::math::Point3;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the brush topology.
    pub struct VertexId;
}

/// Data associated with a brush vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub point: Point3,
    /// One incident edge, the entry point for walking the vertex fan.
    pub edge: Option<EdgeId>,
}

impl VertexData {
    /// Creates a new, not yet connected vertex at the given point.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self { point, edge: None }
    }
}
