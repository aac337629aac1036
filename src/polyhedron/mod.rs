//! Incremental half-space intersection for convex brushes.
//!
//! A [`BrushGeometry`] starts out as the box of the editor's world bounds and
//! is cut down by every half-space added to it. Each cut updates the vertex,
//! edge and side stores in place and reports which caller faces entered or
//! left the boundary.

mod clip;
mod query;
mod result;
mod validate;

pub use result::{AddFaceResult, FaceDelta};

use std::fmt::Debug;

use tracing::{debug, error};

use crate::error::{Result, TopologyError};
use crate::geometry::{Aabb, HalfSpace};
use crate::math::Tolerance;
use crate::topology::{BrushTopology, EdgeData, EdgeId, SideData, SideId, VertexData, VertexId};

use clip::StepOutcome;

/// Boundary representation of a convex brush.
///
/// `F` is the caller's face handle. The kernel stores one per side and hands
/// it back in [`FaceDelta`]s; it is never inspected beyond equality.
#[derive(Debug, Clone)]
pub struct BrushGeometry<F> {
    topology: BrushTopology<F>,
    bounds: Option<Aabb>,
    tolerance: Tolerance,
}

impl<F: Clone + PartialEq + Debug> BrushGeometry<F> {
    /// Creates a brush filling `world_bounds`, ready to be cut by half-spaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial box cannot be built.
    pub fn new(world_bounds: Aabb, tolerance: Tolerance) -> Result<Self> {
        let mut topology = BrushTopology::new();
        clip::initialize_with_bounds(&mut topology, &world_bounds)?;
        Ok(Self {
            topology,
            bounds: Some(world_bounds),
            tolerance,
        })
    }

    /// Creates a brush filling `world_bounds` with the default tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial box cannot be built.
    pub fn with_defaults(world_bounds: Aabb) -> Result<Self> {
        Self::new(world_bounds, Tolerance::default())
    }

    /// Intersects the brush with each half-space in order.
    ///
    /// Stops at the first half-space that leaves no volume. On an internal
    /// consistency failure the brush is restored to its state before the call.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::Topology`](crate::BrushError::Topology) if the
    /// boundary graph became inconsistent; this indicates a kernel bug.
    pub fn add_faces(&mut self, half_spaces: &[HalfSpace<F>]) -> Result<AddFaceResult<F>> {
        let snapshot = self.topology.clone();
        let faces_before: Vec<F> = self.faces().cloned().collect();
        let mut delta = FaceDelta::new();
        let mut split = false;

        for half_space in half_spaces {
            match self.add_half_space(half_space) {
                Ok(StepOutcome::Split(step)) => {
                    split = true;
                    delta = delta.merge(step);
                }
                Ok(StepOutcome::Redundant) => {
                    debug!(face = ?half_space.face, "half-space is redundant");
                }
                Ok(StepOutcome::Null) => {
                    debug!(face = ?half_space.face, "half-space leaves no volume");
                    self.topology.clear();
                    self.bounds = None;
                    return Ok(AddFaceResult::BrushIsNull(FaceDelta::dropping(faces_before)));
                }
                Err(err) => {
                    error!(
                        %err,
                        face = ?half_space.face,
                        "brush geometry is inconsistent, restoring"
                    );
                    self.topology = snapshot;
                    self.update_bounds();
                    return Err(err.into());
                }
            }
        }

        Ok(if split {
            AddFaceResult::Split(delta)
        } else {
            AddFaceResult::FaceIsRedundant
        })
    }

    /// Intersects the brush with a single half-space.
    ///
    /// # Errors
    ///
    /// See [`BrushGeometry::add_faces`].
    pub fn add_face(&mut self, half_space: HalfSpace<F>) -> Result<AddFaceResult<F>> {
        self.add_faces(std::slice::from_ref(&half_space))
    }

    /// Clips a working copy and swaps it in if the brush was split.
    fn add_half_space(
        &mut self,
        half_space: &HalfSpace<F>,
    ) -> std::result::Result<StepOutcome<F>, TopologyError> {
        let mut working = self.topology.clone();
        let outcome = clip::clip(&mut working, half_space, &self.tolerance)?;
        if let StepOutcome::Split(step) = &outcome {
            if cfg!(debug_assertions) {
                validate::check_topology(&working, &self.tolerance)?;
            }
            self.topology = working;
            self.update_bounds();
            debug!(
                face = ?half_space.face,
                added = step.added().len(),
                dropped = step.dropped().len(),
                vertices = self.topology.vertex_count(),
                edges = self.topology.edge_count(),
                sides = self.topology.side_count(),
                "half-space split brush"
            );
        }
        Ok(outcome)
    }

    fn update_bounds(&mut self) {
        self.bounds = Aabb::from_points(self.topology.vertices().map(|(_, v)| &v.point));
    }

    /// Checks every structural and geometric invariant, including tight bounds.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn check_invariants(&self) -> std::result::Result<(), TopologyError> {
        validate::check_topology(&self.topology, &self.tolerance)?;
        let tight = Aabb::from_points(self.topology.vertices().map(|(_, v)| &v.point));
        if tight != self.bounds {
            return Err(TopologyError::InvalidTopology(format!(
                "bounds {:?} do not match vertices {tight:?}",
                self.bounds
            )));
        }
        Ok(())
    }

    /// Returns `true` if the brush has no volume left.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.topology.vertex_count() == 0
    }

    /// Tight bounds of the vertices, or `None` for a null brush.
    #[must_use]
    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    /// The tolerance policy this brush was created with.
    #[must_use]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Read access to the underlying vertex, edge and side stores.
    #[must_use]
    pub fn topology(&self) -> &BrushTopology<F> {
        &self.topology
    }

    /// All vertices with their ids.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.topology.vertices()
    }

    /// All edges with their ids.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.topology.edges()
    }

    /// All sides with their ids, including world sides without a face.
    pub fn sides(&self) -> impl Iterator<Item = (SideId, &SideData<F>)> {
        self.topology.sides()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.topology.vertex_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.topology.edge_count()
    }

    #[must_use]
    pub fn side_count(&self) -> usize {
        self.topology.side_count()
    }

    /// The caller faces currently forming part of the boundary.
    pub fn faces(&self) -> impl Iterator<Item = &F> {
        self.topology.sides().filter_map(|(_, side)| side.face.as_ref())
    }

    /// The side carrying `face`, if it is part of the boundary.
    #[must_use]
    pub fn side_for_face(&self, face: &F) -> Option<SideId> {
        self.topology
            .sides()
            .find(|(_, side)| side.face.as_ref() == Some(face))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Plane;
    use crate::math::{Point3, Vector3};
    use approx::assert_relative_eq;

    const WORLD: f64 = 4096.0;

    /// Routes kernel logs to the test output; filter with `RUST_LOG`.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn world() -> Aabb {
        init_tracing();
        Aabb::cube(WORLD).unwrap()
    }

    fn small_world() -> BrushGeometry<u32> {
        init_tracing();
        BrushGeometry::with_defaults(Aabb::cube(32.0).unwrap()).unwrap()
    }

    /// Adds `planes` one by one with faces `1..`, checking every invariant
    /// after each step.
    fn cut_in_sequence(
        brush: &mut BrushGeometry<u32>,
        planes: &[([f64; 3], f64)],
    ) -> Vec<AddFaceResult<u32>> {
        let mut results = Vec::new();
        for (face, (normal, distance)) in (1..).zip(planes) {
            let normal = Vector3::new(normal[0], normal[1], normal[2]);
            let result = brush.add_face(hs(normal, *distance, face)).unwrap();
            brush.check_invariants().unwrap();
            results.push(result);
        }
        results
    }

    fn hs(normal: Vector3, distance: f64, face: u32) -> HalfSpace<u32> {
        HalfSpace::new(Plane::new(normal, distance).unwrap(), face)
    }

    /// `x >= 0, x <= 1, y >= 0, y <= 1, z >= 0, z <= 1` with faces 1..=6.
    fn cube_half_spaces() -> Vec<HalfSpace<u32>> {
        vec![
            hs(-Vector3::x(), 0.0, 1),
            hs(Vector3::x(), 1.0, 2),
            hs(-Vector3::y(), 0.0, 3),
            hs(Vector3::y(), 1.0, 4),
            hs(-Vector3::z(), 0.0, 5),
            hs(Vector3::z(), 1.0, 6),
        ]
    }

    fn unit_cube() -> BrushGeometry<u32> {
        let mut brush = BrushGeometry::with_defaults(world()).unwrap();
        brush.add_faces(&cube_half_spaces()).unwrap();
        brush
    }

    fn sorted_faces(brush: &BrushGeometry<u32>) -> Vec<u32> {
        let mut faces: Vec<u32> = brush.faces().copied().collect();
        faces.sort_unstable();
        faces
    }

    fn sorted_points(brush: &BrushGeometry<u32>) -> Vec<Point3> {
        let mut points: Vec<Point3> = brush.vertices().map(|(_, v)| v.point).collect();
        points.sort_by(|a, b| {
            a.x.total_cmp(&b.x)
                .then(a.y.total_cmp(&b.y))
                .then(a.z.total_cmp(&b.z))
        });
        points
    }

    fn assert_delta(before: &[u32], result: &AddFaceResult<u32>, after: &[u32]) {
        let mut expected: Vec<u32> = before.to_vec();
        if let Some(delta) = result.delta() {
            expected.retain(|f| !delta.dropped().contains(f));
            expected.extend_from_slice(delta.added());
        }
        expected.sort_unstable();
        assert_eq!(expected, after, "delta does not explain face set change");
    }

    #[test]
    fn starts_as_world_box() {
        let brush: BrushGeometry<u32> = BrushGeometry::with_defaults(world()).unwrap();
        assert_eq!(brush.vertex_count(), 8);
        assert_eq!(brush.edge_count(), 12);
        assert_eq!(brush.side_count(), 6);
        assert_eq!(brush.faces().count(), 0);
        assert_eq!(brush.bounds(), Some(&world()));
        brush.check_invariants().unwrap();
    }

    #[test]
    fn six_half_spaces_make_unit_cube() {
        let mut brush = BrushGeometry::with_defaults(world()).unwrap();
        let result = brush.add_faces(&cube_half_spaces()).unwrap();

        let AddFaceResult::Split(delta) = &result else {
            panic!("expected Split, got {result:?}");
        };
        let mut added = delta.added().to_vec();
        added.sort_unstable();
        assert_eq!(added, vec![1, 2, 3, 4, 5, 6]);
        assert!(delta.dropped().is_empty());

        assert_eq!(brush.vertex_count(), 8);
        assert_eq!(brush.edge_count(), 12);
        assert_eq!(brush.side_count(), 6);
        brush.check_invariants().unwrap();

        let bounds = brush.bounds().unwrap();
        assert_relative_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(brush.volume().unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn loose_half_space_is_redundant() {
        let mut brush = unit_cube();
        let before = brush.clone();

        let result = brush.add_face(hs(Vector3::x(), 2.0, 7)).unwrap();

        assert!(result.is_redundant(), "got {result:?}");
        assert_eq!(sorted_points(&brush), sorted_points(&before));
        assert_eq!(sorted_faces(&brush), sorted_faces(&before));
        assert_eq!(brush.edge_count(), before.edge_count());
    }

    #[test]
    fn redundant_half_space_is_idempotent() {
        let mut brush = unit_cube();
        let loose = hs(Vector3::new(1.0, 1.0, 1.0), 10.0, 7);
        assert!(brush.add_face(loose.clone()).unwrap().is_redundant());
        let snapshot = sorted_points(&brush);
        assert!(brush.add_face(loose).unwrap().is_redundant());
        assert_eq!(sorted_points(&brush), snapshot);
        assert_eq!(brush.side_count(), 6);
    }

    #[test]
    fn disjoint_half_space_nulls_brush() {
        let mut brush = unit_cube();
        let result = brush.add_face(hs(-Vector3::x(), -2.0, 7)).unwrap();

        let AddFaceResult::BrushIsNull(delta) = &result else {
            panic!("expected BrushIsNull, got {result:?}");
        };
        let mut dropped = delta.dropped().to_vec();
        dropped.sort_unstable();
        assert_eq!(dropped, vec![1, 2, 3, 4, 5, 6]);
        assert!(delta.added().is_empty());

        assert!(brush.is_null());
        assert_eq!(brush.vertex_count(), 0);
        assert_eq!(brush.edge_count(), 0);
        assert_eq!(brush.side_count(), 0);
        assert!(brush.bounds().is_none());
        brush.check_invariants().unwrap();
    }

    #[test]
    fn null_brush_stays_null() {
        let mut brush = unit_cube();
        assert!(brush.add_face(hs(-Vector3::x(), -2.0, 7)).unwrap().is_null());

        // Even a half-space containing everything cannot resurrect it.
        let result = brush.add_face(hs(Vector3::x(), 100.0, 8)).unwrap();
        assert!(result.is_null(), "got {result:?}");
        assert!(brush.is_null());
    }

    #[test]
    fn touching_opposite_half_space_nulls_brush() {
        // x >= 1 meets the cube only in its +X side.
        let mut brush = unit_cube();
        assert!(brush.add_face(hs(-Vector3::x(), -1.0, 7)).unwrap().is_null());
    }

    #[test]
    fn coincident_half_space_replaces_face() {
        let mut brush = unit_cube();
        let before = sorted_points(&brush);
        let side = brush.side_for_face(&2).unwrap();

        let result = brush.add_face(hs(Vector3::x(), 1.0, 42)).unwrap();

        let AddFaceResult::Split(delta) = &result else {
            panic!("expected Split, got {result:?}");
        };
        assert_eq!(delta.added(), &[42]);
        assert_eq!(delta.dropped(), &[2]);
        assert_eq!(brush.side_for_face(&42), Some(side));
        assert!(brush.side_for_face(&2).is_none());
        assert_eq!(sorted_points(&brush), before);
        assert_eq!(brush.edge_count(), 12);
        assert_eq!(brush.side_count(), 6);
        brush.check_invariants().unwrap();
    }

    #[test]
    fn coincident_half_space_with_same_face_is_redundant() {
        let mut brush = unit_cube();
        assert!(brush.add_face(hs(Vector3::x(), 1.0, 2)).unwrap().is_redundant());
    }

    #[test]
    fn near_coincident_half_space_is_treated_as_coincident() {
        let mut brush = unit_cube();
        let result = brush.add_face(hs(Vector3::x(), 1.004, 42)).unwrap();
        assert!(result.is_split());
        assert_eq!(brush.vertex_count(), 8);
        assert!(brush.side_for_face(&42).is_some());
    }

    #[test]
    fn corner_cut_adds_triangle() {
        let mut brush = unit_cube();
        let result = brush
            .add_face(hs(Vector3::new(1.0, 1.0, 1.0), 2.5, 7))
            .unwrap();

        assert!(result.is_split());
        assert_eq!(result.delta().unwrap().added(), &[7]);
        assert!(result.delta().unwrap().dropped().is_empty());
        assert_eq!(brush.vertex_count(), 10);
        assert_eq!(brush.edge_count(), 15);
        assert_eq!(brush.side_count(), 7);
        brush.check_invariants().unwrap();

        let triangle = brush.face_vertices(brush.side_for_face(&7).unwrap()).unwrap();
        assert_eq!(triangle.len(), 3);
        for p in &triangle {
            assert_relative_eq!(p.x + p.y + p.z, 2.5, epsilon = 1e-9);
        }
        assert_relative_eq!(brush.volume().unwrap(), 1.0 - 1.0 / 48.0, epsilon = 1e-9);
    }

    #[test]
    fn cut_through_vertices_makes_prism() {
        let mut brush = unit_cube();
        let result = brush
            .add_face(hs(Vector3::new(1.0, 1.0, 0.0), 1.0, 7))
            .unwrap();

        let AddFaceResult::Split(delta) = &result else {
            panic!("expected Split, got {result:?}");
        };
        assert_eq!(delta.added(), &[7]);
        let mut dropped = delta.dropped().to_vec();
        dropped.sort_unstable();
        assert_eq!(dropped, vec![2, 4]);

        assert_eq!(brush.vertex_count(), 6);
        assert_eq!(brush.edge_count(), 9);
        assert_eq!(brush.side_count(), 5);
        brush.check_invariants().unwrap();
        assert_relative_eq!(brush.volume().unwrap(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn cut_within_plane_tolerance_is_redundant() {
        let mut brush = unit_cube();
        let result = brush
            .add_face(hs(Vector3::new(1.0, 1.0, 1.0), 2.995, 7))
            .unwrap();
        assert!(result.is_redundant(), "got {result:?}");
        assert_eq!(brush.vertex_count(), 8);
    }

    #[test]
    fn tightened_tolerance_resolves_small_cut() {
        let tolerance = Tolerance::default().with_plane_epsilon(1e-6);
        let mut brush = BrushGeometry::new(world(), tolerance).unwrap();
        brush.add_faces(&cube_half_spaces()).unwrap();

        let result = brush
            .add_face(hs(Vector3::new(1.0, 1.0, 1.0), 2.995, 7))
            .unwrap();
        assert!(result.is_split(), "got {result:?}");
        assert_eq!(brush.vertex_count(), 10);
        brush.check_invariants().unwrap();
    }

    #[test]
    fn cut_smaller_than_point_tolerance_is_redundant() {
        let tolerance = Tolerance::default()
            .with_plane_epsilon(1e-6)
            .with_point_epsilon(0.01);
        let mut brush = BrushGeometry::new(world(), tolerance).unwrap();
        brush.add_faces(&cube_half_spaces()).unwrap();

        let result = brush
            .add_face(hs(Vector3::new(1.0, 1.0, 1.0), 2.995, 7))
            .unwrap();
        assert!(result.is_redundant(), "got {result:?}");
        assert_eq!(brush.vertex_count(), 8);
        brush.check_invariants().unwrap();
    }

    #[test]
    fn face_clipped_away_is_dropped() {
        let mut brush = unit_cube();
        // Tighter than x <= 1, so the old +X side disappears.
        let result = brush.add_face(hs(Vector3::x(), 0.5, 7)).unwrap();

        let AddFaceResult::Split(delta) = &result else {
            panic!("expected Split, got {result:?}");
        };
        assert_eq!(delta.added(), &[7]);
        assert_eq!(delta.dropped(), &[2]);
        assert_eq!(brush.vertex_count(), 8);
        assert_relative_eq!(brush.bounds().unwrap().max.x, 0.5, epsilon = 1e-12);
        brush.check_invariants().unwrap();
    }

    #[test]
    fn batch_reports_net_delta() {
        let mut brush = unit_cube();
        let before = sorted_faces(&brush);

        // 7 replaces 2, then 8 replaces 7: only 8 is new, only 2 is gone.
        let result = brush
            .add_faces(&[hs(Vector3::x(), 0.75, 7), hs(Vector3::x(), 0.5, 8)])
            .unwrap();

        let AddFaceResult::Split(delta) = &result else {
            panic!("expected Split, got {result:?}");
        };
        assert_eq!(delta.added(), &[8]);
        assert_eq!(delta.dropped(), &[2]);
        assert_delta(&before, &result, &sorted_faces(&brush));
    }

    #[test]
    fn batch_stops_at_null() {
        let mut brush = unit_cube();
        let result = brush
            .add_faces(&[
                hs(Vector3::x(), 0.5, 7),
                hs(-Vector3::x(), -2.0, 8),
                hs(Vector3::y(), 0.5, 9),
            ])
            .unwrap();

        let AddFaceResult::BrushIsNull(delta) = &result else {
            panic!("expected BrushIsNull, got {result:?}");
        };
        let mut dropped = delta.dropped().to_vec();
        dropped.sort_unstable();
        assert_eq!(dropped, vec![1, 2, 3, 4, 5, 6]);
        assert!(brush.is_null());
    }

    #[test]
    fn all_redundant_batch_is_redundant() {
        let mut brush = unit_cube();
        let result = brush
            .add_faces(&[hs(Vector3::x(), 3.0, 7), hs(Vector3::y(), 3.0, 8)])
            .unwrap();
        assert!(result.is_redundant());
    }

    #[test]
    fn delta_explains_every_step() {
        let mut brush = BrushGeometry::with_defaults(world()).unwrap();
        let steps = [
            hs(Vector3::new(1.0, 0.0, 0.0), 10.0, 1),
            hs(Vector3::new(-1.0, 0.0, 0.0), 10.0, 2),
            hs(Vector3::new(0.0, 1.0, 0.0), 10.0, 3),
            hs(Vector3::new(0.0, -1.0, 0.0), 10.0, 4),
            hs(Vector3::new(0.0, 0.0, 1.0), 10.0, 5),
            hs(Vector3::new(0.0, 0.0, -1.0), 10.0, 6),
            hs(Vector3::new(1.0, 1.0, 0.0), 12.0, 7),
            hs(Vector3::new(1.0, 1.0, 1.0), 20.0, 8),
            hs(Vector3::new(-1.0, 2.0, 0.5), 15.0, 9),
            hs(Vector3::new(1.0, 0.0, 0.0), 5.0, 10),
            hs(Vector3::new(1.0, 0.0, 0.0), 5.0, 11),
            hs(Vector3::new(0.0, 0.0, 1.0), 50.0, 12),
        ];

        let mut applied: Vec<HalfSpace<u32>> = Vec::new();
        for step in steps {
            let before = sorted_faces(&brush);
            let result = brush.add_face(step.clone()).unwrap();
            assert_delta(&before, &result, &sorted_faces(&brush));
            brush.check_invariants().unwrap();

            applied.push(step);
            for (_, vertex) in brush.vertices() {
                for half_space in &applied {
                    assert!(
                        half_space.plane.signed_distance(&vertex.point)
                            <= brush.tolerance().plane_epsilon(),
                        "vertex {:?} outside {:?}",
                        vertex.point,
                        half_space.plane
                    );
                }
            }
        }
        assert!(!brush.is_null());
    }

    #[test]
    fn independent_cuts_commute() {
        let corner_a = hs(Vector3::new(1.0, 1.0, 1.0), 2.5, 7);
        let corner_b = hs(Vector3::new(-1.0, -1.0, -1.0), -0.5, 8);

        let mut ab = unit_cube();
        ab.add_faces(&[corner_a.clone(), corner_b.clone()]).unwrap();
        let mut ba = unit_cube();
        ba.add_faces(&[corner_b, corner_a]).unwrap();

        assert_eq!(ab.side_count(), ba.side_count());
        let (pa, pb) = (sorted_points(&ab), sorted_points(&ba));
        assert_eq!(pa.len(), pb.len());
        for (a, b) in pa.iter().zip(&pb) {
            assert!(ab.tolerance().points_equal(a, b), "{a:?} != {b:?}");
        }
    }

    #[test]
    fn incident_sides_of_cube_corner() {
        let brush = unit_cube();
        let (corner, _) = brush
            .vertices()
            .find(|(_, v)| {
                brush
                    .tolerance()
                    .points_equal(&v.point, &Point3::new(1.0, 1.0, 1.0))
            })
            .unwrap();

        let sides = brush.incident_sides(corner).unwrap();
        let mut faces: Vec<u32> = sides
            .iter()
            .map(|s| *brush.topology().side(*s).unwrap().face.as_ref().unwrap())
            .collect();
        faces.sort_unstable();
        assert_eq!(faces, vec![2, 4, 6]);
    }

    #[test]
    fn edge_faces_name_both_neighbours() {
        let brush = unit_cube();
        for (edge, _) in brush.edges() {
            let (left, right) = brush.edge_faces(edge).unwrap();
            let (left, right) = (left.unwrap(), right.unwrap());
            assert_ne!(left, right);
        }
    }

    #[test]
    fn face_vertices_are_counter_clockwise() {
        let brush = unit_cube();
        let side = brush.side_for_face(&6).unwrap();
        let points = brush.face_vertices(side).unwrap();
        assert_eq!(points.len(), 4);
        let normal = crate::math::intersect_3d::newell_normal(&points);
        assert!(normal.z > 0.0, "top face winds clockwise: {normal:?}");
    }

    #[test]
    fn centroid_and_containment() {
        let brush = unit_cube();
        assert_relative_eq!(brush.centroid().unwrap(), Point3::new(0.5, 0.5, 0.5));
        assert!(brush.contains_point(&Point3::new(0.5, 0.5, 0.5)));
        assert!(brush.contains_point(&Point3::new(1.0, 1.0, 1.0)));
        assert!(!brush.contains_point(&Point3::new(1.5, 0.5, 0.5)));

        let mut null = unit_cube();
        null.add_face(hs(-Vector3::x(), -2.0, 7)).unwrap();
        assert!(null.centroid().is_none());
        assert!(!null.contains_point(&Point3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn world_side_can_be_claimed_by_coincident_half_space() {
        let mut brush: BrushGeometry<u32> = BrushGeometry::with_defaults(world()).unwrap();
        let result = brush.add_face(hs(Vector3::x(), WORLD, 1)).unwrap();
        let AddFaceResult::Split(delta) = &result else {
            panic!("expected Split, got {result:?}");
        };
        assert_eq!(delta.added(), &[1]);
        assert!(delta.dropped().is_empty());
        assert_eq!(brush.vertex_count(), 8);
    }

    #[test]
    fn three_point_planes_build_a_wedge() {
        let p = Point3::new;
        let mut brush = unit_cube();
        // Slope through the bottom-front and top-back edges: keeps z <= y.
        let plane =
            Plane::from_points(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 1.0)).unwrap();
        assert!(plane.normal().z > 0.0 && plane.normal().y < 0.0);

        let result = brush.add_face(HalfSpace::new(plane, 9)).unwrap();
        assert!(result.is_split(), "got {result:?}");
        assert_eq!(brush.vertex_count(), 6);
        assert_eq!(brush.side_count(), 5);
        assert_relative_eq!(brush.volume().unwrap(), 0.5, epsilon = 1e-9);
        brush.check_invariants().unwrap();
    }

    #[test]
    fn nearly_parallel_cuts_share_a_world_side() {
        let mut brush = small_world();
        let results = cut_in_sequence(
            &mut brush,
            &[
                (
                    [-0.057743457580473286, 0.9960142729624699, 0.06797985850010609],
                    -32.18857376986391,
                ),
                ([-0.040940650219937036, 0.999161580105825, 0.0], -30.657655762802452),
            ],
        );
        assert!(results.iter().all(AddFaceResult::is_split), "{results:?}");
        assert_eq!(brush.vertex_count(), 7);
        assert_eq!(brush.edge_count(), 11);
        assert_eq!(brush.side_count(), 6);
        assert_eq!(sorted_faces(&brush), vec![1, 2]);
    }

    #[test]
    fn steep_cuts_near_a_world_corner() {
        let mut brush = small_world();
        let results = cut_in_sequence(
            &mut brush,
            &[
                ([0.35454, 0.61644, -0.70306], 53.5595),
                ([0.59543, -0.04279, -0.80227], 43.3498),
            ],
        );
        // The first plane clears the box by less than the plane epsilon.
        assert!(results[0].is_redundant(), "{results:?}");
        assert!(results[1].is_split(), "{results:?}");
        assert_eq!(brush.vertex_count(), 9);
        assert_eq!(brush.edge_count(), 14);
        assert_eq!(brush.side_count(), 7);
    }

    #[test]
    fn cut_vertices_close_to_existing_ones_stay_consistent() {
        let sequences: [&[([f64; 3], f64)]; 2] = [
            &[
                (
                    [-0.13485813262191187, 0.1348581326219121, -0.9816448278942141],
                    31.41522522196806,
                ),
                (
                    [0.5444747934014846, -0.7782163335679969, 0.3129321612081363],
                    -2.5238820024015545,
                ),
                (
                    [0.4443065091356634, -0.7942062915819891, 0.41452152218101435],
                    -2.0611744720864764,
                ),
            ],
            &[
                (
                    [0.4734284886182995, 0.3169501304357601, 0.8218321489095856],
                    -21.291671403694334,
                ),
                (
                    [-0.17514639546261818, 0.9324997195484609, -0.31586074969596006],
                    45.54684842839509,
                ),
                (
                    [-0.43092734517441666, 0.5531417945398639, 0.7129767025044705],
                    -0.42901249164672095,
                ),
                (
                    [0.489564282422677, -0.32286053539505555, -0.809992523459561],
                    10.273482665108121,
                ),
            ],
        ];
        for planes in sequences {
            let mut brush = small_world();
            let results = cut_in_sequence(&mut brush, planes);
            assert!(!results.iter().any(AddFaceResult::is_null), "{results:?}");
            assert!(results.last().unwrap().is_split(), "{results:?}");
        }
    }

    #[test]
    fn sliver_within_colinear_tolerance_is_redundant() {
        let loose = Tolerance::default().with_colinear_epsilon(0.2);
        let mut brush = BrushGeometry::new(world(), loose).unwrap();
        brush.add_faces(&cube_half_spaces()).unwrap();

        // Cuts a 0.1 wide bevel off the `x = y = 1` edge.
        let result = brush.add_face(hs(Vector3::new(1.0, 1.0, 0.0), 1.9, 7)).unwrap();
        assert!(result.is_redundant(), "{result:?}");
        assert_eq!(brush.vertex_count(), 8);
        brush.check_invariants().unwrap();

        let mut strict = unit_cube();
        let result = strict.add_face(hs(Vector3::new(1.0, 1.0, 0.0), 1.9, 7)).unwrap();
        assert!(result.is_split(), "{result:?}");
        assert_eq!(strict.vertex_count(), 10);
        assert_eq!(strict.edge_count(), 15);
        assert_eq!(strict.side_count(), 7);
    }

    #[test]
    fn corrupted_topology_is_reported_and_rolled_back() {
        let mut brush = unit_cube();
        let side = brush.side_for_face(&1).unwrap();
        brush.topology.side_mut(side).unwrap().edges.clear();
        let points = sorted_points(&brush);
        let bounds = brush.bounds().copied();
        let counts = (brush.vertex_count(), brush.edge_count(), brush.side_count());

        let err = brush
            .add_face(hs(Vector3::new(1.0, 1.0, 1.0), 2.5, 7))
            .unwrap_err();
        assert!(err.is_internal(), "{err}");
        assert_eq!(sorted_points(&brush), points);
        assert_eq!(brush.bounds().copied(), bounds);
        assert_eq!(
            (brush.vertex_count(), brush.edge_count(), brush.side_count()),
            counts
        );
        assert_eq!(sorted_faces(&brush), vec![1, 2, 3, 4, 5, 6]);
        assert!(brush.topology().side(side).unwrap().edges.is_empty());
    }
}
