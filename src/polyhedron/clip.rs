use std::collections::{HashMap, HashSet};

use slotmap::SecondaryMap;
use tracing::trace;

use crate::error::TopologyError;
use crate::geometry::{Aabb, HalfSpace, Plane};
use crate::math::intersect_3d::{newell_normal, segment_plane_intersect, SegmentPlaneRelation};
use crate::math::{PointStatus, Tolerance, Vector3};
use crate::topology::{BrushTopology, EdgeData, EdgeId, SideData, SideId, VertexData, VertexId};

use super::result::FaceDelta;

/// Outcome of adding a single half-space.
#[derive(Debug)]
pub(super) enum StepOutcome<F> {
    Split(FaceDelta<F>),
    Null,
    Redundant,
}

/// A side together with its counter-clockwise vertex loop.
type SideLoop = (SideId, Vec<VertexId>);

/// Unordered key of the edge between two vertices.
fn pair_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Fills an empty topology with the box `bounds`, its sides carrying no face.
pub(super) fn initialize_with_bounds<F>(
    topo: &mut BrushTopology<F>,
    bounds: &Aabb,
) -> crate::error::Result<()> {
    topo.clear();
    let corners = bounds.corners().map(|p| topo.add_vertex(VertexData::new(p)));

    let faces: [(Vector3, f64, [usize; 4]); 6] = [
        (-Vector3::x(), -bounds.min.x, [0, 4, 6, 2]),
        (Vector3::x(), bounds.max.x, [1, 3, 7, 5]),
        (-Vector3::y(), -bounds.min.y, [0, 1, 5, 4]),
        (Vector3::y(), bounds.max.y, [2, 6, 7, 3]),
        (-Vector3::z(), -bounds.min.z, [0, 2, 3, 1]),
        (Vector3::z(), bounds.max.z, [4, 5, 7, 6]),
    ];

    let mut loops: Vec<SideLoop> = Vec::with_capacity(faces.len());
    for (normal, distance, corner_loop) in faces {
        let side = topo.add_side(SideData::new(Plane::new(normal, distance)?, None));
        loops.push((side, corner_loop.iter().map(|&i| corners[i]).collect()));
    }
    relink(topo, &loops)?;
    Ok(())
}

/// Intersects `topo` with `half_space` in place.
///
/// On `Null` and `Redundant` the topology may have been partially edited and
/// must be discarded by the caller; on `Split` it holds the new brush.
pub(super) fn clip<F: Clone + PartialEq>(
    topo: &mut BrushTopology<F>,
    half_space: &HalfSpace<F>,
    tolerance: &Tolerance,
) -> Result<StepOutcome<F>, TopologyError> {
    if topo.vertex_count() == 0 {
        return Ok(StepOutcome::Null);
    }

    let plane = &half_space.plane;
    let status: SecondaryMap<VertexId, PointStatus> = topo
        .vertices()
        .map(|(id, v)| (id, tolerance.classify_point(&v.point, plane)))
        .collect();

    // Nothing is cut off: the half-space is either a duplicate of an existing
    // side or does not touch the brush at all.
    if !status.values().any(|s| *s == PointStatus::Outside) {
        return match coincident_side(topo, &status, plane, tolerance)? {
            Some(side) => replace_face(topo, side, half_space),
            None => Ok(StepOutcome::Redundant),
        };
    }
    if !status.values().any(|s| *s == PointStatus::Inside) {
        return Ok(StepOutcome::Null);
    }

    let side_ids: Vec<SideId> = topo.sides().map(|(id, _)| id).collect();
    let mut loops: Vec<SideLoop> = Vec::with_capacity(side_ids.len());
    for &id in &side_ids {
        let vertices = topo.side_vertices(id)?;
        if vertices.len() < 3 {
            return Err(TopologyError::InvalidTopology(format!(
                "side {id:?} has only {} vertices",
                vertices.len()
            )));
        }
        loops.push((id, vertices));
    }

    let mut cutter = Cutter {
        plane,
        status,
        cuts: HashMap::new(),
    };
    let mut kept: Vec<SideLoop> = Vec::with_capacity(loops.len() + 1);
    let mut seams: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
    for (side, vertices) in loops {
        let path = match clip_side(topo, &mut cutter, &vertices)? {
            SideCut::Untouched => {
                kept.push((side, vertices));
                continue;
            }
            SideCut::Removed => continue,
            SideCut::Clipped { kept: clipped, path } => {
                if let Some(clipped) = clipped {
                    kept.push((side, clipped));
                }
                path
            }
        };

        let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
            continue;
        };
        if first == last {
            if path.iter().any(|v| *v != first) {
                return Err(TopologyError::InvalidTopology(format!(
                    "seam of side {side:?} closes on itself"
                )));
            }
            continue;
        }
        if seams.insert(first, path).is_some() {
            return Err(TopologyError::InvalidTopology(format!(
                "vertex {first:?} starts two boundary segments on the new side"
            )));
        }
    }

    let Some(boundary) = chain_boundary(&seams)? else {
        trace!("half-space only grazes the brush");
        return Ok(StepOutcome::Redundant);
    };
    let (boundary, mut kept) = weld_boundary(topo, &cutter, tolerance, boundary, kept)?;
    if is_degenerate_loop(topo, &boundary, plane, tolerance)? {
        trace!("new side has no area");
        return Ok(StepOutcome::Redundant);
    }

    let new_side = topo.add_side(SideData::new(*plane, Some(half_space.face.clone())));
    kept.push((new_side, boundary));
    remove_colinear_vertices(&mut kept);
    if !kept.iter().any(|(side, _)| *side == new_side) {
        trace!("new side collapsed while merging colinear edges");
        return Ok(StepOutcome::Redundant);
    }

    let live: HashSet<SideId> = kept.iter().map(|(side, _)| *side).collect();
    let mut delta = FaceDelta::new();
    let mut dropped_sides = 0_usize;
    for side in side_ids.into_iter().filter(|id| !live.contains(id)) {
        dropped_sides += 1;
        if let Some(face) = topo.side(side)?.face.clone() {
            delta.push_dropped(face);
        }
    }
    delta.push_added(half_space.face.clone());

    trace!(
        cuts = cutter.cuts.len(),
        dropped_sides,
        "clipped brush against half-space"
    );

    relink(topo, &kept)?;
    Ok(StepOutcome::Split(delta))
}

/// Finds an existing side lying on `plane`, facing the same way and with
/// area in it.
fn coincident_side<F>(
    topo: &BrushTopology<F>,
    status: &SecondaryMap<VertexId, PointStatus>,
    plane: &Plane,
    tolerance: &Tolerance,
) -> Result<Option<SideId>, TopologyError> {
    for (id, side) in topo.sides() {
        if side.plane.normal().dot(plane.normal()) <= 0.0 {
            continue;
        }
        let vertices = topo.side_vertices(id)?;
        if vertices
            .iter()
            .all(|v| status.get(*v) == Some(&PointStatus::On))
            && !is_degenerate_loop(topo, &vertices, plane, tolerance)?
        {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

/// Hands an existing side over to a coincident half-space, keeping its
/// geometry.
fn replace_face<F: Clone + PartialEq>(
    topo: &mut BrushTopology<F>,
    side: SideId,
    half_space: &HalfSpace<F>,
) -> Result<StepOutcome<F>, TopologyError> {
    let data = topo.side_mut(side)?;
    if data.face.as_ref() == Some(&half_space.face) {
        return Ok(StepOutcome::Redundant);
    }

    let mut delta = FaceDelta::new();
    if let Some(old) = data.face.replace(half_space.face.clone()) {
        delta.push_dropped(old);
    }
    data.plane = half_space.plane;
    delta.push_added(half_space.face.clone());
    trace!(?side, "replaced face of coincident side");
    Ok(StepOutcome::Split(delta))
}

/// Vertex classification plus the cut vertices created so far, one per
/// kept/removed vertex pair.
struct Cutter<'a> {
    plane: &'a Plane,
    status: SecondaryMap<VertexId, PointStatus>,
    cuts: HashMap<(VertexId, VertexId), VertexId>,
}

impl Cutter<'_> {
    fn status(&self, vertex: VertexId) -> Result<PointStatus, TopologyError> {
        self.status
            .get(vertex)
            .copied()
            .ok_or_else(|| TopologyError::EntityNotFound(format!("vertex {vertex:?}")))
    }

    fn is_cut(&self, vertex: VertexId) -> bool {
        self.cuts.values().any(|v| *v == vertex)
    }

    /// The point where the boundary leaves `kept` towards `removed`.
    ///
    /// A kept vertex already on the plane is its own cut point.
    fn cut<F>(
        &mut self,
        topo: &mut BrushTopology<F>,
        kept: VertexId,
        removed: VertexId,
    ) -> Result<VertexId, TopologyError> {
        if self.status(kept)? == PointStatus::On {
            return Ok(kept);
        }
        let key = pair_key(kept, removed);
        if let Some(&cut) = self.cuts.get(&key) {
            return Ok(cut);
        }

        let start = topo.vertex(kept)?.point;
        let end = topo.vertex(removed)?.point;
        let SegmentPlaneRelation::Point { point, .. } =
            segment_plane_intersect(&start, &end, self.plane)
        else {
            return Err(TopologyError::InvalidTopology(format!(
                "edge {kept:?} -> {removed:?} straddles the plane but does not intersect it"
            )));
        };
        let id = topo.add_vertex(VertexData::new(point));
        self.status.insert(id, PointStatus::On);
        self.cuts.insert(key, id);
        Ok(id)
    }
}

/// What clipping did to one side.
enum SideCut {
    /// No vertex is cut off.
    Untouched,
    /// Every vertex is cut off.
    Removed,
    /// The side crosses the plane. `kept` is its remaining loop, or `None` if
    /// nothing with area is left; `path` is the seam it leaves on the plane,
    /// walked in the direction of the new side.
    Clipped {
        kept: Option<Vec<VertexId>>,
        path: Vec<VertexId>,
    },
}

fn clip_side<F>(
    topo: &mut BrushTopology<F>,
    cutter: &mut Cutter<'_>,
    vertices: &[VertexId],
) -> Result<SideCut, TopologyError> {
    let n = vertices.len();
    let statuses = vertices
        .iter()
        .map(|v| cutter.status(*v))
        .collect::<Result<Vec<_>, _>>()?;
    let outside: Vec<bool> = statuses.iter().map(|s| *s == PointStatus::Outside).collect();
    if !outside.iter().any(|o| *o) {
        return Ok(SideCut::Untouched);
    }
    if outside.iter().all(|o| *o) {
        return Ok(SideCut::Removed);
    }

    // Runs made only of on-plane vertices touch the plane without enclosing
    // area; they are cut off together with the outside vertices.
    let mut runs = kept_runs(&outside);
    if runs.len() > 1 {
        runs.retain(|run| run.iter().any(|&i| statuses[i] == PointStatus::Inside));
    }
    let [run] = runs.as_slice() else {
        return Err(TopologyError::InvalidTopology(format!(
            "side crosses the plane {} times",
            runs.len()
        )));
    };
    let (Some(&first), Some(&last)) = (run.first(), run.last()) else {
        return Err(TopologyError::InvalidTopology("empty run of kept vertices".into()));
    };

    let inner: Vec<VertexId> = run.iter().map(|&i| vertices[i]).collect();
    let entry = cutter.cut(topo, vertices[first], vertices[(first + n - 1) % n])?;
    let exit = cutter.cut(topo, vertices[last], vertices[(last + 1) % n])?;

    let mut path = Vec::with_capacity(inner.len() + 2);
    path.push(entry);
    path.extend_from_slice(&inner);
    path.push(exit);
    path.dedup();

    let mut clipped = path.clone();
    while clipped.len() > 1 && clipped.first() == clipped.last() {
        clipped.pop();
    }
    let mut flat = true;
    for v in &clipped {
        if cutter.status(*v)? != PointStatus::On {
            flat = false;
            break;
        }
    }

    if clipped.len() < 3 || flat {
        Ok(SideCut::Clipped { kept: None, path })
    } else {
        Ok(SideCut::Clipped {
            kept: Some(clipped),
            path: vec![entry, exit],
        })
    }
}

/// Index runs of consecutive vertices that are not outside, each starting
/// right after an outside vertex. At least one vertex must be outside.
fn kept_runs(outside: &[bool]) -> Vec<Vec<usize>> {
    let n = outside.len();
    (0..n)
        .filter(|&i| outside[(i + n - 1) % n] && !outside[i])
        .map(|start| {
            (start..start + n)
                .map(|i| i % n)
                .take_while(|&i| !outside[i])
                .collect()
        })
        .collect()
}

/// Chains the seams left by the clipped sides into the loop of the new side.
///
/// Returns `None` if there is no seam at all.
fn chain_boundary(
    seams: &HashMap<VertexId, Vec<VertexId>>,
) -> Result<Option<Vec<VertexId>>, TopologyError> {
    let Some(&start) = seams.keys().min() else {
        return Ok(None);
    };

    let mut boundary = Vec::new();
    let mut current = start;
    let mut used = 0;
    loop {
        let seam = seams.get(&current).ok_or_else(|| {
            TopologyError::InvalidTopology(format!(
                "boundary of new side is open at vertex {current:?}"
            ))
        })?;
        let Some((&end, body)) = seam.split_last() else {
            return Err(TopologyError::InvalidTopology("empty seam".into()));
        };
        boundary.extend_from_slice(body);
        used += 1;
        current = end;
        if current == start {
            break;
        }
        if used > seams.len() {
            return Err(TopologyError::InvalidTopology(
                "boundary of new side does not close".into(),
            ));
        }
    }

    if used != seams.len() {
        return Err(TopologyError::InvalidTopology(format!(
            "boundary of new side splits into several loops ({used} of {} seams chained)",
            seams.len()
        )));
    }
    let distinct: HashSet<VertexId> = boundary.iter().copied().collect();
    if distinct.len() != boundary.len() {
        return Err(TopologyError::InvalidTopology(
            "boundary of new side passes a vertex twice".into(),
        ));
    }
    Ok(Some(boundary))
}

/// Merges neighbouring vertices of the new side closer than the point
/// epsilon, in the new side and in every kept loop.
///
/// An existing vertex survives over a fresh cut vertex. Kept loops falling
/// below three vertices are dropped.
fn weld_boundary<F>(
    topo: &BrushTopology<F>,
    cutter: &Cutter<'_>,
    tolerance: &Tolerance,
    mut boundary: Vec<VertexId>,
    mut kept: Vec<SideLoop>,
) -> Result<(Vec<VertexId>, Vec<SideLoop>), TopologyError> {
    loop {
        let n = boundary.len();
        if n < 3 {
            return Ok((boundary, kept));
        }
        let mut pair = None;
        for i in 0..n {
            let (a, b) = (boundary[i], boundary[(i + 1) % n]);
            if tolerance.points_equal(&topo.vertex(a)?.point, &topo.vertex(b)?.point) {
                pair = Some((a, b));
                break;
            }
        }
        let Some((a, b)) = pair else {
            return Ok((boundary, kept));
        };

        let (survivor, merged) = if cutter.is_cut(a) && !cutter.is_cut(b) {
            (b, a)
        } else {
            (a, b)
        };
        trace!(?survivor, ?merged, "welding vertices of new side");
        let rename = |vertices: &mut Vec<VertexId>| {
            for v in vertices.iter_mut() {
                if *v == merged {
                    *v = survivor;
                }
            }
            vertices.dedup();
            while vertices.len() > 1 && vertices.first() == vertices.last() {
                vertices.pop();
            }
        };
        rename(&mut boundary);
        for (_, vertices) in &mut kept {
            rename(vertices);
        }
        kept.retain(|(_, vertices)| vertices.len() >= 3);
    }
}

/// Returns `true` if `vertices` enclose no area facing along `plane`: fewer
/// than three of them, wound the wrong way, or all on one line.
fn is_degenerate_loop<F>(
    topo: &BrushTopology<F>,
    vertices: &[VertexId],
    plane: &Plane,
    tolerance: &Tolerance,
) -> Result<bool, TopologyError> {
    if vertices.len() < 3 {
        return Ok(true);
    }
    let points = vertices
        .iter()
        .map(|v| topo.vertex(*v).map(|data| data.point))
        .collect::<Result<Vec<_>, _>>()?;
    if newell_normal(&points).dot(plane.normal()) <= 0.0 {
        return Ok(true);
    }

    let origin = points[0];
    let farthest = points
        .iter()
        .copied()
        .max_by(|p, q| (p - origin).norm().total_cmp(&(q - origin).norm()))
        .unwrap_or(origin);
    Ok(points
        .iter()
        .all(|p| tolerance.are_colinear(&origin, p, &farthest)))
}

/// Removes vertices where only two edges meet: such a vertex joins two
/// colinear edges and belongs to exactly two sides. Loops left with fewer
/// than three vertices are dropped.
fn remove_colinear_vertices(loops: &mut Vec<SideLoop>) {
    loop {
        let mut neighbours: HashMap<VertexId, HashSet<VertexId>> = HashMap::new();
        for (_, vertices) in loops.iter() {
            let n = vertices.len();
            for i in 0..n {
                let (a, b) = (vertices[i], vertices[(i + 1) % n]);
                neighbours.entry(a).or_default().insert(b);
                neighbours.entry(b).or_default().insert(a);
            }
        }

        let colinear: HashSet<VertexId> = neighbours
            .into_iter()
            .filter(|(_, adjacent)| adjacent.len() == 2)
            .map(|(v, _)| v)
            .collect();
        if colinear.is_empty() {
            return;
        }

        trace!(count = colinear.len(), "merging edges at colinear vertices");
        for (_, vertices) in loops.iter_mut() {
            vertices.retain(|v| !colinear.contains(v));
        }
        loops.retain(|(side, vertices)| {
            let keep = vertices.len() >= 3;
            if !keep {
                trace!(?side, "side collapsed while merging colinear edges");
            }
            keep
        });
    }
}

/// Rebuilds the edge cycles of all sides from their vertex loops.
///
/// Existing edges are reused by endpoint pair; missing ones are created.
/// Sides not named in `loops` are removed, as are edges and vertices nothing
/// references afterwards.
pub(super) fn relink<F>(
    topo: &mut BrushTopology<F>,
    loops: &[SideLoop],
) -> Result<(), TopologyError> {
    let edge_ids: Vec<EdgeId> = topo.edges().map(|(id, _)| id).collect();
    let mut by_pair: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
    for &id in &edge_ids {
        let edge = topo.edge_mut(id)?;
        edge.left = None;
        edge.right = None;
        if edge.start != edge.end {
            by_pair.entry(pair_key(edge.start, edge.end)).or_insert(id);
        }
    }

    for (side, vertices) in loops {
        let n = vertices.len();
        let mut cycle = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (vertices[i], vertices[(i + 1) % n]);
            let id = *by_pair
                .entry(pair_key(a, b))
                .or_insert_with(|| topo.add_edge(EdgeData::new(a, b)));
            let edge = topo.edge_mut(id)?;
            let slot = if edge.start == a {
                &mut edge.left
            } else {
                &mut edge.right
            };
            if slot.is_some() {
                return Err(TopologyError::InvalidTopology(format!(
                    "edge {a:?} -> {b:?} is walked in the same direction by two sides"
                )));
            }
            *slot = Some(*side);
            cycle.push(id);
        }
        topo.side_mut(*side)?.edges = cycle;
    }

    let live: HashSet<SideId> = loops.iter().map(|(side, _)| *side).collect();
    let stale_sides: Vec<SideId> = topo
        .sides()
        .map(|(id, _)| id)
        .filter(|id| !live.contains(id))
        .collect();
    for side in stale_sides {
        topo.side_mut(side)?.edges.clear();
        topo.remove_side(side)?;
    }

    let edge_ids: Vec<EdgeId> = topo.edges().map(|(id, _)| id).collect();
    for id in edge_ids {
        let edge = topo.edge(id)?;
        match (edge.left, edge.right) {
            (None, None) => {
                topo.remove_edge(id)?;
            }
            (Some(_), Some(_)) => {}
            _ => {
                return Err(TopologyError::InvalidTopology(format!(
                    "edge {id:?} borders only one side"
                )));
            }
        }
    }

    let vertex_ids: Vec<VertexId> = topo.vertices().map(|(id, _)| id).collect();
    for &id in &vertex_ids {
        topo.vertex_mut(id)?.edge = None;
    }
    let endpoints: Vec<(EdgeId, VertexId, VertexId)> = topo
        .edges()
        .map(|(id, e)| (id, e.start, e.end))
        .collect();
    for (edge, start, end) in endpoints {
        for vertex in [start, end] {
            let data = topo.vertex_mut(vertex)?;
            if data.edge.is_none() {
                data.edge = Some(edge);
            }
        }
    }
    for id in vertex_ids {
        if topo.vertex(id)?.edge.is_none() {
            topo.remove_vertex(id)?;
        }
    }
    Ok(())
}
