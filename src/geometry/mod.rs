//! Geometric primitives.
//!
//! This module provides the geometry types the infill generator is built on:
//! - [`Point`] / [`PointF`] / [`Point3F`] - 2D scaled, 2D float, and 3D float points
//! - [`Line`] - an oriented segment of emitted infill
//! - [`Polyline`] - an open path of stitched segments
//! - [`BoundingBox`] / [`BoundingBox3F`] - 2D and 3D extents
//! - [`Matrix3`] and the corner-standing cube frame rotations

mod bounding_box;
mod line;
mod point;
mod polyline;
mod transform;

pub use bounding_box::{BoundingBox, BoundingBox3F};
pub use line::{Line, Lines};
pub use point::{Point, Point3F, PointF, Points};
pub use polyline::{Polyline, Polylines};
pub use transform::{cube_frame_to_world, world_to_cube_frame, Matrix3};
