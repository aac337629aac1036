use super::side::SideId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the brush topology.
    pub struct EdgeId;
}

/// Data associated with a brush edge.
///
/// The `left` side walks the edge `start -> end` in its counter-clockwise
/// cycle, the `right` side walks it `end -> start`. Both are set once an
/// operation has completed; they are only `None` while an edge is being
/// linked.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
    /// Side traversing the edge in its natural direction.
    pub left: Option<SideId>,
    /// Side traversing the edge in reverse.
    pub right: Option<SideId>,
}

impl EdgeData {
    /// Creates an unlinked edge.
    #[must_use]
    pub fn new(start: VertexId, end: VertexId) -> Self {
        Self {
            start,
            end,
            left: None,
            right: None,
        }
    }

    /// Returns `true` if `vertex` is one of the endpoints.
    #[must_use]
    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.start == vertex || self.end == vertex
    }

    /// Returns `true` if `side` borders this edge.
    #[must_use]
    pub fn borders(&self, side: SideId) -> bool {
        self.left == Some(side) || self.right == Some(side)
    }

    /// Vertex at which `side` enters this edge, or `None` if `side` does not
    /// border it.
    #[must_use]
    pub fn origin_for(&self, side: SideId) -> Option<VertexId> {
        if self.left == Some(side) {
            Some(self.start)
        } else if self.right == Some(side) {
            Some(self.end)
        } else {
            None
        }
    }

    /// Vertex at which `side` leaves this edge.
    #[must_use]
    pub fn destination_for(&self, side: SideId) -> Option<VertexId> {
        if self.left == Some(side) {
            Some(self.end)
        } else if self.right == Some(side) {
            Some(self.start)
        } else {
            None
        }
    }

    /// The side across the edge from `side`.
    #[must_use]
    pub fn other_side(&self, side: SideId) -> Option<SideId> {
        if self.left == Some(side) {
            self.right
        } else if self.right == Some(side) {
            self.left
        } else {
            None
        }
    }

}
