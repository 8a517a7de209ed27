//! Triangle meshes and surface distance queries.
//!
//! This module provides the input side of infill generation:
//! - [`TriangleMesh`] - The indexed triangle mesh data structure
//! - [`Triangle`] - A single triangle
//! - [`MeshDistanceField`] - AABB-tree nearest-surface and inside queries
//! - [`DistanceOracle`] - the query trait the octree builder consumes

mod distance;
mod triangle_mesh;

pub use distance::{DistanceOracle, MeshDistanceField, NearestSurfacePoint};
pub use triangle_mesh::{Triangle, TriangleMesh};
