use crate::error::{GeometryError, Result};
use crate::math::Point3;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two corners.
    ///
    /// # Errors
    ///
    /// Returns an error if `min` exceeds `max` on any axis or the box has no
    /// volume.
    pub fn new(min: Point3, max: Point3) -> Result<Self> {
        if (0..3).any(|i| min[i] >= max[i]) {
            return Err(GeometryError::Degenerate(format!(
                "bounding box corners {min:?} / {max:?} do not span a volume"
            ))
            .into());
        }
        Ok(Self { min, max })
    }

    /// Creates a cube centred on the origin with the given half extent.
    ///
    /// # Errors
    ///
    /// Returns an error if `half_extent` is not positive.
    pub fn cube(half_extent: f64) -> Result<Self> {
        Self::new(
            Point3::new(-half_extent, -half_extent, -half_extent),
            Point3::new(half_extent, half_extent, half_extent),
        )
    }

    /// Computes the tight bounds of a point set, or `None` if it is empty.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.merge_point(p);
        }
        Some(bounds)
    }

    /// Grows the box to include `p`.
    pub fn merge_point(&mut self, p: &Point3) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    /// Returns the eight corners, indexed by `x + 2y + 4z` with 0 = min and
    /// 1 = max on each axis.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Returns `true` if `p` lies inside or on the box, expanded by `epsilon`.
    #[must_use]
    pub fn contains(&self, p: &Point3, epsilon: f64) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - epsilon && p[i] <= self.max[i] + epsilon)
    }
}
