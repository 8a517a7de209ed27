//! Corner-standing cube measurements.
//!
//! Octree cubes stand on one corner: the space diagonal is vertical, so a
//! cube of edge `e` spans `e·√3` in Z and presents a hexagonal plan-view
//! silhouette. All per-depth measurements the builder and the layer
//! generator need are derived here, once per depth level, from the edge
//! length alone.

use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Derived measurements of a corner-standing cube at one octree depth.
///
/// Shared read-only by every cube of that depth through the octree's
/// per-depth table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeProperties {
    /// Edge length of the cube (mm).
    pub edge_length: CoordF,

    /// Vertical extent of the corner-standing cube (`edge·√3`).
    pub height: CoordF,

    /// Face diagonal (`edge·√2`), the longest chord a layer can cut.
    pub diagonal_length: CoordF,

    /// Max |z - center.z| at which the cube still yields a line.
    pub line_z_distance: CoordF,

    /// Max plan-view distance from the cube center to a line midpoint.
    pub line_xy_distance: CoordF,
}

impl CubeProperties {
    /// Derive the measurements for a given edge length.
    pub fn new(edge_length: CoordF) -> Self {
        Self {
            edge_length,
            height: edge_length * 3.0_f64.sqrt(),
            diagonal_length: edge_length * 2.0_f64.sqrt(),
            line_z_distance: edge_length / 3.0_f64.sqrt(),
            line_xy_distance: edge_length / 6.0_f64.sqrt(),
        }
    }
}

/// Build the per-depth properties table for a line spacing and mesh extent.
///
/// The finest cube edge is twice the line spacing; edges double per level
/// until one corner-standing root covers `max_extent` (callers pass the
/// Euclidean norm of the mesh bounding-box size, so the rotated root always
/// encloses the mesh). The table is indexed by depth: element 0 is the
/// root, the last element the finest level. Empty for non-positive inputs.
pub fn cube_properties_for_spacing(
    line_spacing: CoordF,
    max_extent: CoordF,
) -> Vec<CubeProperties> {
    if line_spacing <= 0.0 || max_extent <= 0.0 {
        return Vec::new();
    }

    let mut edges = Vec::new();
    let mut edge_length = line_spacing * 2.0;
    loop {
        edges.push(edge_length);
        if edge_length >= max_extent {
            break;
        }
        edge_length *= 2.0;
    }

    edges.reverse();
    edges.into_iter().map(CubeProperties::new).collect()
}
