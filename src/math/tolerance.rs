use crate::geometry::Plane;

use super::{Point3, Vector3};

/// Position of a point relative to a half-space boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    /// Strictly behind the plane, inside the half-space.
    Inside,
    /// Strictly in front of the plane, outside the half-space.
    Outside,
    /// On the plane within tolerance.
    On,
}

/// Numeric comparison rules shared by every part of the kernel.
///
/// Every comparison is a closed interval test, so values exactly at an
/// epsilon boundary resolve toward equality / `On`. Classifying the same
/// point against the same plane always yields the same answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    point_epsilon: f64,
    plane_epsilon: f64,
    colinear_epsilon: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            point_epsilon: 0.001,
            plane_epsilon: 0.01,
            colinear_epsilon: 0.000_01,
        }
    }
}

impl Tolerance {
    /// Creates a tolerance policy with explicit epsilons.
    ///
    /// Negative values are clamped to zero.
    #[must_use]
    pub fn new(point_epsilon: f64, plane_epsilon: f64, colinear_epsilon: f64) -> Self {
        Self {
            point_epsilon: point_epsilon.max(0.0),
            plane_epsilon: plane_epsilon.max(0.0),
            colinear_epsilon: colinear_epsilon.max(0.0),
        }
    }

    /// Sets the maximum distance at which two points are considered equal.
    #[must_use]
    pub fn with_point_epsilon(mut self, epsilon: f64) -> Self {
        self.point_epsilon = epsilon.max(0.0);
        self
    }

    /// Sets the maximum distance at which a point is considered on a plane.
    #[must_use]
    pub fn with_plane_epsilon(mut self, epsilon: f64) -> Self {
        self.plane_epsilon = epsilon.max(0.0);
        self
    }

    /// Sets the area threshold below which three points are colinear.
    #[must_use]
    pub fn with_colinear_epsilon(mut self, epsilon: f64) -> Self {
        self.colinear_epsilon = epsilon.max(0.0);
        self
    }

    #[must_use]
    pub fn point_epsilon(&self) -> f64 {
        self.point_epsilon
    }

    #[must_use]
    pub fn plane_epsilon(&self) -> f64 {
        self.plane_epsilon
    }

    #[must_use]
    pub fn colinear_epsilon(&self) -> f64 {
        self.colinear_epsilon
    }

    /// Returns `true` if `p` and `q` are within the point epsilon.
    #[must_use]
    pub fn points_equal(&self, p: &Point3, q: &Point3) -> bool {
        (p - q).norm() <= self.point_epsilon
    }

    /// Returns `true` if `p` lies on `plane` within the plane epsilon.
    #[must_use]
    pub fn point_on_plane(&self, p: &Point3, plane: &Plane) -> bool {
        plane.signed_distance(p).abs() <= self.plane_epsilon
    }

    /// Classifies `p` against the half-space bounded by `plane`.
    #[must_use]
    pub fn classify_point(&self, p: &Point3, plane: &Plane) -> PointStatus {
        let dist = plane.signed_distance(p);
        if dist > self.plane_epsilon {
            PointStatus::Outside
        } else if dist < -self.plane_epsilon {
            PointStatus::Inside
        } else {
            PointStatus::On
        }
    }

    /// Returns `true` if `b` lies on the line through `a` and `c`.
    ///
    /// Uses the parallelogram area spanned by the two legs, normalised by the
    /// longer leg so the test does not depend on edge length.
    #[must_use]
    pub fn are_colinear(&self, a: &Point3, b: &Point3, c: &Point3) -> bool {
        let ab: Vector3 = b - a;
        let ac: Vector3 = c - a;
        let scale = ab.norm().max(ac.norm());
        if scale <= self.point_epsilon {
            return true;
        }
        ab.cross(&ac).norm() / scale <= self.colinear_epsilon
    }
}
