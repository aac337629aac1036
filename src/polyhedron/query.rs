use std::fmt::Debug;

use crate::error::TopologyError;
use crate::math::{Point3, PointStatus};
use crate::topology::{EdgeId, SideId, VertexId};

use super::BrushGeometry;

impl<F: Clone + PartialEq + Debug> BrushGeometry<F> {
    /// The sides meeting at `vertex`, in fan order around it.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is missing or its fan is broken.
    pub fn incident_sides(&self, vertex: VertexId) -> Result<Vec<SideId>, TopologyError> {
        let topo = &self.topology;
        let first_edge = topo.vertex(vertex)?.edge.ok_or_else(|| {
            TopologyError::InvalidTopology(format!("vertex {vertex:?} has no incident edge"))
        })?;
        let first = topo.edge(first_edge)?;
        let entering_side = if first.end == vertex {
            first.left
        } else {
            first.right
        };
        let start_side = entering_side.ok_or_else(|| {
            TopologyError::InvalidTopology(format!("edge {first_edge:?} is not linked"))
        })?;

        // In `side` the current edge enters `vertex`; the edge after it leaves
        // `vertex`, and across that edge lies the next side of the fan.
        let mut sides = vec![start_side];
        let mut side = start_side;
        let mut edge = first_edge;
        loop {
            let next = topo.next_edge(side, edge)?;
            let next_side = topo.edge(next)?.other_side(side).ok_or_else(|| {
                TopologyError::InvalidTopology(format!("edge {next:?} is not linked"))
            })?;
            if next_side == start_side {
                return Ok(sides);
            }
            if sides.len() > topo.side_count() {
                return Err(TopologyError::InvalidTopology(format!(
                    "fan around vertex {vertex:?} does not close"
                )));
            }
            sides.push(next_side);
            side = next_side;
            edge = next;
        }
    }

    /// Positions of the vertices of `side` in counter-clockwise order.
    ///
    /// # Errors
    ///
    /// Returns an error if the side is missing or its cycle is broken.
    pub fn face_vertices(&self, side: SideId) -> Result<Vec<Point3>, TopologyError> {
        self.topology
            .side_vertices(side)?
            .into_iter()
            .map(|v| self.topology.vertex(v).map(|data| data.point))
            .collect()
    }

    /// The faces on the left and right of `edge`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its sides is missing.
    pub fn edge_faces(&self, edge: EdgeId) -> Result<(Option<&F>, Option<&F>), TopologyError> {
        let data = self.topology.edge(edge)?;
        Ok((self.face_of(data.left)?, self.face_of(data.right)?))
    }

    fn face_of(&self, side: Option<SideId>) -> Result<Option<&F>, TopologyError> {
        match side {
            Some(id) => Ok(self.topology.side(id)?.face.as_ref()),
            None => Ok(None),
        }
    }

    /// Average of all vertex positions, or `None` for a null brush.
    #[must_use]
    pub fn centroid(&self) -> Option<Point3> {
        let count = self.topology.vertex_count();
        if count == 0 {
            return None;
        }
        let sum = self
            .topology
            .vertices()
            .fold(nalgebra::Vector3::zeros(), |acc, (_, v)| acc + v.point.coords);
        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / count as f64;
        Some(Point3::from(sum * scale))
    }

    /// Enclosed volume, from the divergence theorem over fan triangles.
    ///
    /// # Errors
    ///
    /// Returns an error if a side cycle is broken.
    pub fn volume(&self) -> Result<f64, TopologyError> {
        let mut six_volume = 0.0;
        for (side, _) in self.topology.sides() {
            let points = self.face_vertices(side)?;
            let Some((first, rest)) = points.split_first() else {
                continue;
            };
            for pair in rest.windows(2) {
                six_volume += first.coords.dot(&pair[0].coords.cross(&pair[1].coords));
            }
        }
        Ok(six_volume / 6.0)
    }

    /// Returns `true` if `point` lies inside or on the brush.
    #[must_use]
    pub fn contains_point(&self, point: &Point3) -> bool {
        let epsilon = self.tolerance.plane_epsilon();
        self.bounds.as_ref().is_some_and(|bounds| bounds.contains(point, epsilon))
            && self.topology.sides().all(|(_, side)| {
                self.tolerance.classify_point(point, &side.plane) != PointStatus::Outside
            })
    }
}
