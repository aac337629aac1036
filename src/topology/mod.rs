pub mod edge;
pub mod side;
pub mod vertex;

pub use edge::{EdgeData, EdgeId};
pub use side::{SideData, SideId};
pub use vertex::{VertexData, VertexId};

use crate::error::TopologyError;
use slotmap::SlotMap;

/// Central arena that owns the vertices, edges and sides of one brush.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
#[derive(Debug, Clone)]
pub struct BrushTopology<F> {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    sides: SlotMap<SideId, SideData<F>>,
}

impl<F> Default for BrushTopology<F> {
    fn default() -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            sides: SlotMap::with_key(),
        }
    }
}

impl<F> BrushTopology<F> {
    /// Creates a new, empty topology.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the topology holds no entities at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.sides.is_empty()
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.sides.clear();
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("vertex {id:?}")))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("vertex {id:?}")))
    }

    /// Removes a vertex that no edge references any more.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is missing or still an edge endpoint.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<VertexData, TopologyError> {
        if let Some((edge, _)) = self.edges.iter().find(|(_, e)| e.has_vertex(id)) {
            return Err(TopologyError::StillReferenced(format!(
                "vertex {id:?} is an endpoint of edge {edge:?}"
            )));
        }
        self.vertices
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("vertex {id:?}")))
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Iterates over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    // --- Edge operations ---

    /// Inserts an edge and returns its ID.
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("edge {id:?}")))
    }

    /// Returns a mutable reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData, TopologyError> {
        self.edges
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("edge {id:?}")))
    }

    /// Removes an edge that no side cycle references any more.
    ///
    /// Vertices whose fan entry pointed at the edge lose that entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing or still part of a side cycle.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeData, TopologyError> {
        if let Some((side, _)) = self.sides.iter().find(|(_, s)| s.edges.contains(&id)) {
            return Err(TopologyError::StillReferenced(format!(
                "edge {id:?} is in the cycle of side {side:?}"
            )));
        }
        let data = self
            .edges
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("edge {id:?}")))?;
        for vertex in [data.start, data.end] {
            if let Some(v) = self.vertices.get_mut(vertex) {
                if v.edge == Some(id) {
                    v.edge = None;
                }
            }
        }
        Ok(data)
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    /// Edges having `vertex` as an endpoint.
    #[must_use]
    pub fn incident_edges(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, e)| e.has_vertex(vertex))
            .map(|(id, _)| id)
            .collect()
    }

    // --- Side operations ---

    /// Inserts a side and returns its ID.
    pub fn add_side(&mut self, data: SideData<F>) -> SideId {
        self.sides.insert(data)
    }

    /// Returns a reference to the side data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn side(&self, id: SideId) -> Result<&SideData<F>, TopologyError> {
        self.sides
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("side {id:?}")))
    }

    /// Returns a mutable reference to the side data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn side_mut(&mut self, id: SideId) -> Result<&mut SideData<F>, TopologyError> {
        self.sides
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("side {id:?}")))
    }

    /// Removes a side that no edge borders any more.
    ///
    /// # Errors
    ///
    /// Returns an error if the side is missing or an edge still borders it.
    pub fn remove_side(&mut self, id: SideId) -> Result<SideData<F>, TopologyError> {
        if let Some((edge, _)) = self.edges.iter().find(|(_, e)| e.borders(id)) {
            return Err(TopologyError::StillReferenced(format!(
                "side {id:?} borders edge {edge:?}"
            )));
        }
        self.sides
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("side {id:?}")))
    }

    /// Number of sides.
    #[must_use]
    pub fn side_count(&self) -> usize {
        self.sides.len()
    }

    /// Iterates over all sides.
    pub fn sides(&self) -> impl Iterator<Item = (SideId, &SideData<F>)> {
        self.sides.iter()
    }

    /// The vertices of a side in counter-clockwise order.
    ///
    /// # Errors
    ///
    /// Returns an error if the side or one of its edges is missing, or an edge
    /// of the cycle does not name the side as a neighbour.
    pub fn side_vertices(&self, id: SideId) -> Result<Vec<VertexId>, TopologyError> {
        let side = self.side(id)?;
        side.edges
            .iter()
            .map(|&e| {
                self.edge(e)?.origin_for(id).ok_or_else(|| {
                    TopologyError::InvalidTopology(format!(
                        "edge {e:?} in cycle of side {id:?} does not border it"
                    ))
                })
            })
            .collect()
    }

    /// The edge following `edge` in the cycle of `side`.
    ///
    /// # Errors
    ///
    /// Returns an error if the side is missing or `edge` is not in its cycle.
    pub fn next_edge(&self, side: SideId, edge: EdgeId) -> Result<EdgeId, TopologyError> {
        let edges = &self.side(side)?.edges;
        let pos = Self::cycle_position(edges, side, edge)?;
        Ok(edges[(pos + 1) % edges.len()])
    }

    fn cycle_position(
        edges: &[EdgeId],
        side: SideId,
        edge: EdgeId,
    ) -> Result<usize, TopologyError> {
        edges.iter().position(|&e| e == edge).ok_or_else(|| {
            TopologyError::InvalidTopology(format!(
                "edge {edge:?} is not in the cycle of side {side:?}"
            ))
        })
    }
}
