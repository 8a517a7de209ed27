//! Axis-aligned bounding box types.
//!
//! [`BoundingBox`] (scaled 2D) bounds emitted infill geometry;
//! [`BoundingBox3F`] (floating-point 3D) bounds meshes and octree cubes.
//! Both carry a `defined` flag so an empty box merges cleanly.

use super::{Point, Point3F};
use crate::{unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D axis-aligned bounding box with scaled integer coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
    defined: bool,
}

impl BoundingBox {
    /// Create a new empty (undefined) bounding box.
    #[inline]
    pub fn new() -> Self {
        Self {
            min: Point::new(Coord::MAX, Coord::MAX),
            max: Point::new(Coord::MIN, Coord::MIN),
            defined: false,
        }
    }

    /// Create a bounding box from min and max points.
    #[inline]
    pub fn from_points_minmax(min: Point, max: Point) -> Self {
        Self {
            min,
            max,
            defined: true,
        }
    }

    /// Create a bounding box covering a slice of points.
    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    /// Check if the bounding box has absorbed at least one point.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Merge a point into the bounding box.
    pub fn merge_point(&mut self, p: Point) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    /// Merge another bounding box into this one.
    pub fn merge(&mut self, other: &BoundingBox) {
        if other.defined {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    /// Width (0 when undefined).
    #[inline]
    pub fn width(&self) -> Coord {
        if self.defined {
            self.max.x - self.min.x
        } else {
            0
        }
    }

    /// Height (0 when undefined).
    #[inline]
    pub fn height(&self) -> Coord {
        if self.defined {
            self.max.y - self.min.y
        } else {
            0
        }
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2, (self.min.y + self.max.y) / 2)
    }

    /// Check if a point is inside (boundary inclusive).
    #[inline]
    pub fn contains_point(&self, p: &Point) -> bool {
        self.defined
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    /// Check if this bounding box fully contains another.
    #[inline]
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.defined
            && other.defined
            && self.contains_point(&other.min)
            && self.contains_point(&other.max)
    }

    /// Expand by a margin on all sides.
    pub fn expand(&mut self, margin: Coord) {
        if self.defined {
            self.min.x -= margin;
            self.min.y -= margin;
            self.max.x += margin;
            self.max.y += margin;
        }
    }

    /// Return an expanded copy.
    pub fn expanded(&self, margin: Coord) -> Self {
        let mut result = *self;
        result.expand(margin);
        result
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "BoundingBox({:?} - {:?})", self.min, self.max)
        } else {
            write!(f, "BoundingBox(undefined)")
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(
                f,
                "[({:.6}, {:.6}) - ({:.6}, {:.6})]",
                unscale(self.min.x),
                unscale(self.min.y),
                unscale(self.max.x),
                unscale(self.max.y)
            )
        } else {
            write!(f, "[undefined]")
        }
    }
}

/// A 3D axis-aligned bounding box with floating-point coordinates (mm).
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3F {
    pub min: Point3F,
    pub max: Point3F,
    defined: bool,
}

impl BoundingBox3F {
    /// Create a new empty bounding box.
    #[inline]
    pub fn new() -> Self {
        Self {
            min: Point3F::new(CoordF::MAX, CoordF::MAX, CoordF::MAX),
            max: Point3F::new(CoordF::MIN, CoordF::MIN, CoordF::MIN),
            defined: false,
        }
    }

    /// Create a bounding box from min and max points.
    #[inline]
    pub fn from_points_minmax(min: Point3F, max: Point3F) -> Self {
        Self {
            min,
            max,
            defined: true,
        }
    }

    /// Create a bounding box covering a slice of points.
    pub fn from_points(points: &[Point3F]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    /// Check if the bounding box has absorbed at least one point.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Merge a point into the bounding box.
    pub fn merge_point(&mut self, p: Point3F) {
        if self.defined {
            self.min = self.min.cwise_min(&p);
            self.max = self.max.cwise_max(&p);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    /// Merge another bounding box into this one.
    pub fn merge(&mut self, other: &BoundingBox3F) {
        if other.defined {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    /// Size along each axis (zero vector when undefined).
    #[inline]
    pub fn size(&self) -> Point3F {
        if self.defined {
            self.max - self.min
        } else {
            Point3F::zero()
        }
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point3F {
        Point3F::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Volume (0 when undefined or flat).
    #[inline]
    pub fn volume(&self) -> CoordF {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Check if a point is inside (boundary inclusive).
    #[inline]
    pub fn contains_point(&self, p: &Point3F) -> bool {
        self.defined
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn longest_axis(&self) -> usize {
        let s = self.size();
        if s.x >= s.y && s.x >= s.z {
            0
        } else if s.y >= s.z {
            1
        } else {
            2
        }
    }

    /// Squared distance from a point to the box exterior, 0 when inside.
    #[inline]
    pub fn squared_exterior_distance(&self, p: &Point3F) -> CoordF {
        let mut dist_sq = 0.0;
        for i in 0..3 {
            let v = p.axis(i);
            let lo = self.min.axis(i);
            let hi = self.max.axis(i);
            if v < lo {
                dist_sq += (lo - v) * (lo - v);
            } else if v > hi {
                dist_sq += (v - hi) * (v - hi);
            }
        }
        dist_sq
    }

    /// Expand by a margin on all sides.
    pub fn expand(&mut self, margin: CoordF) {
        if self.defined {
            self.min.x -= margin;
            self.min.y -= margin;
            self.min.z -= margin;
            self.max.x += margin;
            self.max.y += margin;
            self.max.z += margin;
        }
    }

    /// Return an expanded copy.
    pub fn inflated(&self, margin: CoordF) -> Self {
        let mut result = *self;
        result.expand(margin);
        result
    }
}

impl fmt::Debug for BoundingBox3F {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "BoundingBox3F({:?} - {:?})", self.min, self.max)
        } else {
            write!(f, "BoundingBox3F(undefined)")
        }
    }
}

impl fmt::Display for BoundingBox3F {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(
                f,
                "[({:.6}, {:.6}, {:.6}) - ({:.6}, {:.6}, {:.6})]",
                self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
            )
        } else {
            write!(f, "[undefined]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_starts_undefined() {
        let bb = BoundingBox::new();
        assert!(!bb.is_defined());
        assert_eq!(bb.width(), 0);
        assert_eq!(bb.height(), 0);
    }

    #[test]
    fn test_bounding_box_from_points() {
        let points = vec![Point::new(10, 20), Point::new(50, 30), Point::new(30, 100)];
        let bb = BoundingBox::from_points(&points);
        assert!(bb.is_defined());
        assert_eq!(bb.min, Point::new(10, 20));
        assert_eq!(bb.max, Point::new(50, 100));
    }

    #[test]
    fn test_bounding_box_contains() {
        let outer = BoundingBox::from_points_minmax(Point::new(0, 0), Point::new(100, 100));
        let inner = BoundingBox::from_points_minmax(Point::new(10, 10), Point::new(90, 90));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains_point(&Point::new(100, 100)));
        assert!(!outer.contains_point(&Point::new(101, 50)));
    }

    #[test]
    fn test_bounding_box_expanded() {
        let bb = BoundingBox::from_points_minmax(Point::new(10, 10), Point::new(90, 90));
        let grown = bb.expanded(10);
        assert_eq!(grown.min, Point::new(0, 0));
        assert_eq!(grown.max, Point::new(100, 100));
        // original untouched
        assert_eq!(bb.min, Point::new(10, 10));
    }

    #[test]
    fn test_bounding_box3f_merge_point() {
        let mut bb = BoundingBox3F::new();
        assert!(!bb.is_defined());
        bb.merge_point(Point3F::new(1.0, 2.0, 3.0));
        bb.merge_point(Point3F::new(-1.0, 5.0, 0.0));
        assert!(bb.is_defined());
        assert!(bb.min.approx_eq(&Point3F::new(-1.0, 2.0, 0.0), 1e-12));
        assert!(bb.max.approx_eq(&Point3F::new(1.0, 5.0, 3.0), 1e-12));
    }

    #[test]
    fn test_bounding_box3f_volume_flat_is_zero() {
        let bb = BoundingBox3F::from_points_minmax(
            Point3F::new(0.0, 0.0, 1.0),
            Point3F::new(2.0, 3.0, 1.0),
        );
        assert_eq!(bb.volume(), 0.0);
    }

    #[test]
    fn test_bounding_box3f_center_and_size() {
        let bb = BoundingBox3F::from_points_minmax(
            Point3F::new(-1.0, -2.0, -3.0),
            Point3F::new(1.0, 2.0, 3.0),
        );
        assert!(bb.center().approx_eq(&Point3F::zero(), 1e-12));
        assert!(bb.size().approx_eq(&Point3F::new(2.0, 4.0, 6.0), 1e-12));
        assert!((bb.size().length() - (4.0 + 16.0 + 36.0f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box3f_inflated() {
        let bb = BoundingBox3F::from_points_minmax(Point3F::zero(), Point3F::new(1.0, 1.0, 1.0));
        let grown = bb.inflated(0.5);
        assert!(grown.contains_point(&Point3F::new(-0.4, 1.4, 0.5)));
        assert!(!grown.contains_point(&Point3F::new(-0.6, 0.5, 0.5)));
    }

    #[test]
    fn test_bounding_box3f_longest_axis() {
        let bb = BoundingBox3F::from_points_minmax(Point3F::zero(), Point3F::new(1.0, 3.0, 2.0));
        assert_eq!(bb.longest_axis(), 1);

        let bb = BoundingBox3F::from_points_minmax(Point3F::zero(), Point3F::new(5.0, 3.0, 2.0));
        assert_eq!(bb.longest_axis(), 0);
    }

    #[test]
    fn test_bounding_box3f_squared_exterior_distance() {
        let bb = BoundingBox3F::from_points_minmax(Point3F::zero(), Point3F::new(1.0, 1.0, 1.0));

        assert!(bb.squared_exterior_distance(&Point3F::new(0.5, 0.5, 0.5)) < 1e-12);
        assert!((bb.squared_exterior_distance(&Point3F::new(2.0, 0.5, 0.5)) - 1.0).abs() < 1e-12);
        assert!((bb.squared_exterior_distance(&Point3F::new(2.0, 2.0, 2.0)) - 3.0).abs() < 1e-12);
    }
}
