//! Layer line generation: cutting the octree with a horizontal plane.
//!
//! # Algorithm
//!
//! A depth-first walk in fixed octant order visits every cube whose
//! vertical extent contains the slicing plane. Filled leaves close enough
//! to the plane (within `line_z_distance` of the cube center) emit one
//! chord of the corner-standing cube's hexagonal cross-section. The chord
//! is computed in the cube-local plan frame, where the cut runs parallel
//! to the X axis and drifts across the hexagon as the plane rises, then
//! rotated into one of three lattice directions and translated to the
//! cube's plan-view center.
//!
//! The direction family is `(depth + octant) % 3`, so sibling cubes and
//! consecutive depths alternate directions and the stacked layers weave an
//! isotropic lattice instead of parallel sheets.
//!
//! Output is raw unordered segments in scaled coordinates; stitching them
//! into printable polylines is the connect step's job.
//!
//! # BambuStudio Reference
//!
//! - `src/libslic3r/Fill/FillAdaptive.cpp` -
//!   `FillAdaptive::generate_infill_lines_recursive`. The chord geometry is
//!   identical; the reference merges collinear pieces during the walk,
//!   here merging is deferred to the stitcher.

use std::f64::consts::{FRAC_PI_4, PI, SQRT_2};

use crate::geometry::{Line, Lines, PointF};
use crate::CoordF;

use super::cube::CubeProperties;
use super::octree::{Cube, Octree};

/// Lattice direction angles, indexed by `(depth + octant) % 3`.
const DIRECTION_ANGLES: [CoordF; 3] = [-FRAC_PI_4, FRAC_PI_4, 0.75 * PI];

/// Cut the octree with the horizontal plane at height `z` (mm).
///
/// Returns the raw chord segments of every filled leaf the plane passes
/// through, in deterministic depth-first order. A refused (root-only)
/// octree yields no segments.
pub fn generate_for_layer(octree: &Octree, z: CoordF) -> Lines {
    let properties = octree.properties();
    if properties.is_empty() {
        return Lines::new();
    }

    let mut cut = LayerCut {
        z,
        properties,
        rotations: DIRECTION_ANGLES.map(|angle| (angle.cos(), angle.sin())),
        lines: Lines::new(),
    };
    cut.descend(octree.root(), 0);
    cut.lines
}

/// Traversal state for one layer cut.
struct LayerCut<'a> {
    z: CoordF,
    properties: &'a [CubeProperties],
    /// Precomputed (cos, sin) per direction family.
    rotations: [(CoordF, CoordF); 3],
    lines: Lines,
}

impl LayerCut<'_> {
    /// Visit `cube` (sitting in `octant` of its parent) and its subtree.
    fn descend(&mut self, cube: &Cube, octant: usize) {
        debug_assert!(cube.depth < self.properties.len());
        let props = &self.properties[cube.depth];

        // Children never extend past the parent's vertical span, so a miss
        // here prunes the whole subtree.
        let z_diff = self.z - cube.center.z;
        if z_diff.abs() > props.height / 2.0 {
            return;
        }

        if !cube.is_leaf() {
            for (child_octant, child) in cube.children.iter().enumerate() {
                self.descend(child, child_octant);
            }
            return;
        }

        if !cube.filled || z_diff.abs() >= props.line_z_distance {
            return;
        }

        // Chord endpoints in the cube-local plan frame. The chord runs
        // parallel to local X; it is longest when the plane passes through
        // the center and shrinks to a point at +-line_z_distance, while
        // drifting across the hexagon in local Y.
        let zdist = props.line_z_distance;
        let from_x = 0.5 * props.diagonal_length * (zdist - z_diff.abs()) / zdist;
        let from_y = props.line_xy_distance - (zdist + z_diff) / SQRT_2;

        // The chord midpoint is (0, from_y); discard cuts that wander off
        // the cube's own plan-view cell.
        if from_y.abs() > props.line_xy_distance {
            return;
        }

        let (cos_a, sin_a) = self.rotations[(cube.depth + octant) % 3];
        let plan_center = cube.center.to_2d();
        let from = PointF::new(from_x, from_y).rotated(cos_a, sin_a) + plan_center;
        let to = PointF::new(-from_x, from_y).rotated(cos_a, sin_a) + plan_center;

        self.lines.push(Line::new(from.to_scaled(), to.to_scaled()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3F;
    use crate::infill::build_octree;
    use crate::mesh::TriangleMesh;
    use crate::unscale;

    fn make_test_octree() -> Octree {
        build_octree(&TriangleMesh::cube(2.0), 0.5, Point3F::zero()).unwrap()
    }

    #[test]
    fn test_center_layer_has_lines() {
        let octree = make_test_octree();
        let lines = generate_for_layer(&octree, 0.0);
        assert!(!lines.is_empty());
    }

    #[test]
    fn test_layer_outside_extent_is_empty() {
        let octree = make_test_octree();
        assert!(generate_for_layer(&octree, 100.0).is_empty());
        assert!(generate_for_layer(&octree, -100.0).is_empty());
    }

    #[test]
    fn test_refused_octree_yields_no_lines() {
        let octree = build_octree(&TriangleMesh::new(), 2.0, Point3F::zero()).unwrap();
        assert!(generate_for_layer(&octree, 0.0).is_empty());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let octree = make_test_octree();
        let first = generate_for_layer(&octree, 0.15);
        let second = generate_for_layer(&octree, 0.15);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_lines_follow_the_three_direction_families() {
        let octree = make_test_octree();
        for z in [-0.4, 0.0, 0.3] {
            for line in generate_for_layer(&octree, z) {
                if line.is_point() {
                    continue;
                }
                let angle = line.direction_angle();
                // Undirected, the three families collapse onto pi/4 and
                // 3*pi/4.
                let near_quarter = (angle - FRAC_PI_4).abs() < 1e-6;
                let near_three_quarters = (angle - 3.0 * FRAC_PI_4).abs() < 1e-6;
                assert!(
                    near_quarter || near_three_quarters,
                    "unexpected line angle {angle}"
                );
            }
        }
    }

    #[test]
    fn test_lines_stay_near_the_mesh_footprint() {
        let octree = make_test_octree();
        let finest_height = octree.properties().last().unwrap().height;
        // Mesh footprint is [-1, 1]^2; segments may overhang by at most one
        // finest cube height.
        let limit = 1.0 + finest_height;

        for z in [-0.8, -0.2, 0.0, 0.5] {
            for line in generate_for_layer(&octree, z) {
                for point in [line.a, line.b] {
                    assert!(unscale(point.x).abs() <= limit);
                    assert!(unscale(point.y).abs() <= limit);
                }
            }
        }
    }

    #[test]
    fn test_chord_shrinks_away_from_cube_center() {
        // Distance-one oracle: the root never subdivides but stays filled,
        // leaving a single cube whose chords we can inspect directly.
        struct SolidOracle;
        impl crate::mesh::DistanceOracle for SolidOracle {
            fn nearest_distance(&self, _point: &Point3F) -> Option<CoordF> {
                Some(0.0)
            }
            fn contains(&self, _point: &Point3F) -> Option<bool> {
                Some(true)
            }
        }

        let bounds = crate::geometry::BoundingBox3F::from_points_minmax(
            Point3F::new(-1.0, -1.0, -1.0),
            Point3F::new(1.0, 1.0, 1.0),
        );
        // Spacing large enough that the table has a single level.
        let octree =
            crate::infill::build_octree_with_oracle(&SolidOracle, &bounds, 2.0, Point3F::zero())
                .unwrap();
        assert_eq!(octree.cube_count(), 1);

        let zdist = octree.properties()[0].line_z_distance;
        let center_cut = generate_for_layer(&octree, 0.0);
        let offset_cut = generate_for_layer(&octree, zdist * 0.8);
        assert_eq!(center_cut.len(), 1);
        assert_eq!(offset_cut.len(), 1);
        assert!(center_cut[0].length() > offset_cut[0].length());

        // At the z extent of line emission the chord has vanished.
        assert!(generate_for_layer(&octree, zdist).is_empty());
    }
}
