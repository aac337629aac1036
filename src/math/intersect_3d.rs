use crate::geometry::Plane;

use super::{Point3, Vector3};

/// Relationship of a line segment with a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentPlaneRelation {
    /// The segment crosses the plane at `point`, `t` being the parameter along
    /// the segment in `[0, 1]`.
    Point { point: Point3, t: f64 },
    /// Both endpoints are on the same side of the plane.
    Disjoint,
    /// The segment is parallel to the plane (including lying on it).
    Parallel,
}

/// Intersects the segment `start -> end` with a plane.
///
/// Interpolates between the signed endpoint distances, so a segment whose
/// endpoints straddle the plane always yields a point between them.
#[must_use]
pub fn segment_plane_intersect(
    start: &Point3,
    end: &Point3,
    plane: &Plane,
) -> SegmentPlaneRelation {
    let d_start = plane.signed_distance(start);
    let d_end = plane.signed_distance(end);
    let denom = d_start - d_end;

    if denom == 0.0 {
        return SegmentPlaneRelation::Parallel;
    }
    if (d_start > 0.0 && d_end > 0.0) || (d_start < 0.0 && d_end < 0.0) {
        return SegmentPlaneRelation::Disjoint;
    }

    let t = (d_start / denom).clamp(0.0, 1.0);
    let point = start + (end - start) * t;
    SegmentPlaneRelation::Point { point, t }
}

/// Newell normal of a closed polygon, scaled by twice its area.
///
/// Counter-clockwise loops yield a normal pointing toward the viewer.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}
