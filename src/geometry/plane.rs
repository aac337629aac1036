use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

/// Norms below this are treated as zero-length when building planes.
const MIN_NORM: f64 = 1e-12;

/// An oriented infinite plane in 3D space.
///
/// Points `p` on the plane satisfy `normal · p = distance`. The unit normal
/// points out of the half-space it bounds, so `normal · p < distance` is the
/// inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3,
    distance: f64,
}

impl Plane {
    /// Creates a plane from a normal and the distance along it from the origin.
    ///
    /// The normal does not need to be unit length; both values are rescaled.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn new(normal: Vector3, distance: f64) -> Result<Self> {
        let len = normal.norm();
        if len < MIN_NORM {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            normal: normal / len,
            distance: distance / len,
        })
    }

    /// Creates a plane through `point` with the given outward normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_point_normal(point: &Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < MIN_NORM {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        Ok(Self {
            normal,
            distance: normal.dot(&point.coords),
        })
    }

    /// Creates a plane through three points given counter-clockwise as seen
    /// from outside the half-space.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are colinear.
    pub fn from_points(p0: &Point3, p1: &Point3, p2: &Point3) -> Result<Self> {
        let normal = (p1 - p0).cross(&(p2 - p0));
        if normal.norm() < MIN_NORM {
            return Err(GeometryError::Degenerate("plane points are colinear".into()).into());
        }
        Self::from_point_normal(p0, normal)
    }

    /// Returns the unit outward normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the signed distance of the plane from the origin along its normal.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Signed distance from a point to the plane.
    /// Positive = outside (normal side), negative = inside.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.distance
    }
}

/// A plane together with the caller's face handle.
///
/// The handle is opaque to the kernel: it is stored on the side the plane
/// produces and reported back in face deltas, nothing more.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfSpace<F> {
    /// The bounding plane; the half-space lies behind its normal.
    pub plane: Plane,
    /// Caller-owned face metadata handle.
    pub face: F,
}

impl<F> HalfSpace<F> {
    /// Creates a new half-space.
    #[must_use]
    pub fn new(plane: Plane, face: F) -> Self {
        Self { plane, face }
    }
}
