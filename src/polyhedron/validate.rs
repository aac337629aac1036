use std::collections::HashMap;

use crate::error::TopologyError;
use crate::math::intersect_3d::newell_normal;
use crate::math::{Point3, PointStatus, Tolerance};
use crate::topology::{BrushTopology, EdgeId, SideId};

fn invalid(message: String) -> TopologyError {
    TopologyError::InvalidTopology(message)
}

/// Checks the structural and geometric invariants of a brush topology.
///
/// An empty topology is valid. Otherwise the brush must be a closed convex
/// manifold: every edge borders two distinct sides, every side cycle is closed,
/// planar, convex and counter-clockwise seen from outside, every vertex lies
/// inside or on every side plane and the Euler characteristic is 2.
///
/// # Errors
///
/// Returns the first violated invariant as [`TopologyError::InvalidTopology`].
pub(super) fn check_topology<F>(
    topo: &BrushTopology<F>,
    tolerance: &Tolerance,
) -> Result<(), TopologyError> {
    if topo.is_empty() {
        return Ok(());
    }

    check_edges(topo)?;
    for (side, _) in topo.sides() {
        check_side(topo, side, tolerance)?;
    }
    check_vertices(topo, tolerance)?;

    if topo.vertex_count() + topo.side_count() != topo.edge_count() + 2 {
        return Err(invalid(format!(
            "Euler characteristic is not 2 (V={}, E={}, F={})",
            topo.vertex_count(),
            topo.edge_count(),
            topo.side_count()
        )));
    }
    Ok(())
}

fn check_edges<F>(topo: &BrushTopology<F>) -> Result<(), TopologyError> {
    let mut occurrences: HashMap<EdgeId, usize> = HashMap::new();
    for (_, side) in topo.sides() {
        for &edge in &side.edges {
            *occurrences.entry(edge).or_default() += 1;
        }
    }

    for (id, edge) in topo.edges() {
        topo.vertex(edge.start)?;
        topo.vertex(edge.end)?;
        if edge.start == edge.end {
            return Err(invalid(format!("edge {id:?} has zero length")));
        }
        let (Some(left), Some(right)) = (edge.left, edge.right) else {
            return Err(invalid(format!("edge {id:?} does not border two sides")));
        };
        if left == right {
            return Err(invalid(format!("edge {id:?} borders side {left:?} twice")));
        }
        for side in [left, right] {
            if !topo.side(side)?.edges.contains(&id) {
                return Err(invalid(format!(
                    "edge {id:?} names side {side:?} which does not contain it"
                )));
            }
        }
        if occurrences.get(&id).copied().unwrap_or(0) != 2 {
            return Err(invalid(format!(
                "edge {id:?} appears in {} side cycles",
                occurrences.get(&id).copied().unwrap_or(0)
            )));
        }
    }
    Ok(())
}

fn check_side<F>(
    topo: &BrushTopology<F>,
    id: SideId,
    tolerance: &Tolerance,
) -> Result<(), TopologyError> {
    let side = topo.side(id)?;
    if side.edges.len() < 3 {
        return Err(invalid(format!(
            "side {id:?} has only {} edges",
            side.edges.len()
        )));
    }

    let n = side.edges.len();
    for i in 0..n {
        let here = topo.edge(side.edges[i])?;
        let next = topo.edge(side.edges[(i + 1) % n])?;
        if here.destination_for(id) != next.origin_for(id) {
            return Err(invalid(format!("cycle of side {id:?} is not closed")));
        }
    }

    let points: Vec<Point3> = topo
        .side_vertices(id)?
        .into_iter()
        .map(|v| topo.vertex(v).map(|data| data.point))
        .collect::<Result<_, _>>()?;

    if let Some(p) = points
        .iter()
        .find(|p| !tolerance.point_on_plane(p, &side.plane))
    {
        return Err(invalid(format!("vertex {p:?} of side {id:?} is off its plane")));
    }

    let normal = side.plane.normal();
    if newell_normal(&points).dot(normal) <= 0.0 {
        return Err(invalid(format!("side {id:?} is not counter-clockwise")));
    }

    // A convex loop bulges out past the chord between the two neighbours of
    // every vertex.
    for i in 0..n {
        let a = points[(i + n - 1) % n];
        let p = points[i];
        let c = points[(i + 1) % n];
        if tolerance.points_equal(&a, &p) {
            return Err(invalid(format!("side {id:?} has a degenerate edge")));
        }
        let outward = (c - a).cross(normal);
        let len = outward.norm();
        if len <= tolerance.point_epsilon() {
            continue;
        }
        if (p - a).dot(&(outward / len)) < -tolerance.plane_epsilon() {
            return Err(invalid(format!("side {id:?} is not convex")));
        }
    }
    Ok(())
}

fn check_vertices<F>(topo: &BrushTopology<F>, tolerance: &Tolerance) -> Result<(), TopologyError> {
    for (id, vertex) in topo.vertices() {
        let Some(edge) = vertex.edge else {
            return Err(invalid(format!("vertex {id:?} has no incident edge")));
        };
        if !topo.edge(edge)?.has_vertex(id) {
            return Err(invalid(format!(
                "vertex {id:?} points at edge {edge:?} which does not touch it"
            )));
        }
        let degree = topo.incident_edges(id).len();
        if degree < 3 {
            return Err(invalid(format!("vertex {id:?} has only {degree} edges")));
        }
        for (side_id, side) in topo.sides() {
            if tolerance.classify_point(&vertex.point, &side.plane) == PointStatus::Outside {
                return Err(invalid(format!(
                    "vertex {id:?} lies outside side {side_id:?}"
                )));
            }
        }
    }
    Ok(())
}
