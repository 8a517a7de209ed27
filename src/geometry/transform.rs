//! Rotation matrices and the corner-standing cube frame.
//!
//! The adaptive infill octree lives in a rotated frame where every cube
//! stands on one of its corners: the cube's space diagonal is aligned with
//! the world Z axis, so a cube of edge `e` spans `e·√3` vertically. The two
//! functions at the bottom of this module give the fixed rotation between
//! that frame and the world frame.

use super::Point3F;
use crate::CoordF;
use std::f64::consts::PI;

/// Rotation angles (X, Y, Z order) taking the cube frame to the world frame.
/// The Y component is arctan(1/√2) + 180°, which stands the cube on a corner.
const CUBE_FRAME_ROT: [CoordF; 3] = [
    5.0 * PI / 4.0,
    215.264_f64.to_radians(),
    PI / 6.0,
];

/// A 3x3 rotation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    pub m: [[CoordF; 3]; 3],
}

impl Matrix3 {
    /// The identity matrix.
    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Rotation around the X axis.
    pub fn rotation_x(angle: CoordF) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]],
        }
    }

    /// Rotation around the Y axis.
    pub fn rotation_y(angle: CoordF) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            m: [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]],
        }
    }

    /// Rotation around the Z axis.
    pub fn rotation_z(angle: CoordF) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            m: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Matrix product `self * other`.
    pub fn mul_matrix(&self, other: &Self) -> Self {
        let mut result = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    result[i][j] += self.m[i][k] * other.m[k][j];
                }
            }
        }
        Self { m: result }
    }

    /// Apply the matrix to a vector.
    pub fn mul_vec(&self, v: &Point3F) -> Point3F {
        Point3F::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        )
    }
}

/// Rotation taking cube-frame coordinates to world coordinates.
///
/// Maps the cube axis direction (1,1,1)/√3 onto the world Z axis: offsets
/// expressed along cube edges come out corner-standing in the world.
pub fn cube_frame_to_world() -> Matrix3 {
    Matrix3::rotation_z(CUBE_FRAME_ROT[2])
        .mul_matrix(&Matrix3::rotation_y(CUBE_FRAME_ROT[1]))
        .mul_matrix(&Matrix3::rotation_x(CUBE_FRAME_ROT[0]))
}

/// Rotation taking world coordinates back to the cube frame.
pub fn world_to_cube_frame() -> Matrix3 {
    Matrix3::rotation_x(-CUBE_FRAME_ROT[0])
        .mul_matrix(&Matrix3::rotation_y(-CUBE_FRAME_ROT[1]))
        .mul_matrix(&Matrix3::rotation_z(-CUBE_FRAME_ROT[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: CoordF, b: CoordF, eps: CoordF) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_identity_mul_vec() {
        let v = Point3F::new(1.0, -2.0, 3.0);
        assert!(Matrix3::identity().mul_vec(&v).approx_eq(&v, 1e-12));
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let r = Matrix3::rotation_z(std::f64::consts::FRAC_PI_2);
        let v = r.mul_vec(&Point3F::new(1.0, 0.0, 0.0));
        assert!(v.approx_eq(&Point3F::new(0.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn test_space_diagonal_becomes_vertical() {
        let d = 1.0 / 3.0_f64.sqrt();
        let world = cube_frame_to_world().mul_vec(&Point3F::new(d, d, d));
        // The Y angle constant is truncated to 3 decimals, so allow 1e-4.
        assert!(approx_eq(world.x, 0.0, 1e-4));
        assert!(approx_eq(world.y, 0.0, 1e-4));
        assert!(approx_eq(world.z, 1.0, 1e-4));
    }

    #[test]
    fn test_corner_standing_vertical_extent() {
        // A unit cube standing on a corner spans ±√3/2 vertically.
        let to_world = cube_frame_to_world();
        let mut z_min = CoordF::MAX;
        let mut z_max = CoordF::MIN;
        for sx in [-0.5, 0.5] {
            for sy in [-0.5, 0.5] {
                for sz in [-0.5, 0.5] {
                    let w = to_world.mul_vec(&Point3F::new(sx, sy, sz));
                    z_min = z_min.min(w.z);
                    z_max = z_max.max(w.z);
                }
            }
        }
        let half_diagonal = 3.0_f64.sqrt() / 2.0;
        assert!(approx_eq(z_min, -half_diagonal, 1e-4));
        assert!(approx_eq(z_max, half_diagonal, 1e-4));
    }

    #[test]
    fn test_frame_round_trip() {
        let to_world = cube_frame_to_world();
        let to_cube = world_to_cube_frame();
        for v in [
            Point3F::new(1.0, 0.0, 0.0),
            Point3F::new(0.3, -0.7, 2.5),
            Point3F::new(-4.0, 1.0, -1.0),
        ] {
            let round = to_cube.mul_vec(&to_world.mul_vec(&v));
            assert!(round.approx_eq(&v, 1e-9));
        }
    }

    #[test]
    fn test_rotation_preserves_length() {
        let v = Point3F::new(1.5, -2.5, 0.5);
        let rotated = cube_frame_to_world().mul_vec(&v);
        assert!(approx_eq(rotated.length(), v.length(), 1e-9));
    }
}
