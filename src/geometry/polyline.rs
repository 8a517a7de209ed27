//! Polyline type for open infill paths.
//!
//! The stitcher grows polylines at both ends, so this type supports cheap
//! back extension plus front insertion and whole-polyline appends.

use super::{BoundingBox, Line, Point};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// An open polyline defined by a sequence of points.
///
/// Not implicitly closed: the path runs from the first point to the last.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    /// Create a new empty polyline.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polyline from a vector of points.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Create a two-point polyline from a line segment.
    #[inline]
    pub fn from_line(line: &Line) -> Self {
        Self {
            points: vec![line.a, line.b],
        }
    }

    /// Create a polyline with the given capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Points of this polyline.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Consume the polyline and return its points.
    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polyline has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point at the back.
    #[inline]
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Insert a point at the front.
    #[inline]
    pub fn prepend(&mut self, point: Point) {
        self.points.insert(0, point);
    }

    /// Append all points of another polyline at the back.
    #[inline]
    pub fn append(&mut self, other: Polyline) {
        self.points.extend(other.points);
    }

    /// First point. Panics on an empty polyline.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    /// Last point. Panics on an empty polyline.
    #[inline]
    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Line segment from point i to point i+1.
    #[inline]
    pub fn edge(&self, index: usize) -> Line {
        Line::new(self.points[index], self.points[index + 1])
    }

    /// Number of edges (0 for fewer than 2 points).
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// All edges of the polyline.
    pub fn edges(&self) -> Vec<Line> {
        (0..self.edge_count()).map(|i| self.edge(i)).collect()
    }

    /// Total length in scaled units.
    pub fn length(&self) -> CoordF {
        let mut total = 0.0;
        for i in 0..self.edge_count() {
            total += self.points[i].distance(&self.points[i + 1]);
        }
        total
    }

    /// Reverse the point order in place.
    #[inline]
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Return a reversed copy.
    pub fn reversed(&self) -> Self {
        let mut result = self.clone();
        result.reverse();
        result
    }

    /// Bounding box of all points.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }
}

impl fmt::Debug for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polyline({} points)", self.points.len())
    }
}

impl Index<usize> for Polyline {
    type Output = Point;

    #[inline]
    fn index(&self, index: usize) -> &Point {
        &self.points[index]
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Polyline {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// A collection of polylines, the per-layer output of the infill generator.
pub type Polylines = Vec<Polyline>;
