use crate::geometry::Plane;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a side in the brush topology.
    pub struct SideId;
}

/// Data associated with a brush side.
///
/// A side is the polygon a half-space contributes to the brush boundary:
/// a closed cycle of edges, counter-clockwise as seen from outside.
#[derive(Debug, Clone)]
pub struct SideData<F> {
    /// The plane the polygon lies on.
    pub plane: Plane,
    /// Caller's face handle; `None` for sides of the initial working region.
    pub face: Option<F>,
    /// The edges of the polygon in counter-clockwise order.
    pub edges: Vec<EdgeId>,
}

impl<F> SideData<F> {
    /// Creates a side with an empty edge cycle.
    #[must_use]
    pub fn new(plane: Plane, face: Option<F>) -> Self {
        Self {
            plane,
            face,
            edges: Vec::new(),
        }
    }
}
