//! Convex brush geometry for level editors.
//!
//! A brush is the intersection of half-spaces. [`BrushGeometry`] keeps its
//! boundary representation (vertices, edges, sides) up to date as half-spaces
//! are added, and reports which caller faces each change added or dropped.

pub mod error;
pub mod geometry;
pub mod math;
pub mod polyhedron;
pub mod topology;

pub use error::{BrushError, Result};
pub use geometry::{Aabb, HalfSpace, Plane};
pub use math::{PointStatus, Tolerance};
pub use polyhedron::{AddFaceResult, BrushGeometry, FaceDelta};
