//! Distance queries against the mesh surface.
//!
//! [`MeshDistanceField`] answers the two questions octree construction asks
//! at every cube: how far is this point from the nearest triangle, and does
//! the point lie inside the solid. Both run against a balanced AABB tree
//! built once over the mesh triangles.
//!
//! # Algorithm
//!
//! The tree is a balanced binary tree over triangle bounding boxes, split at
//! each level along the longest axis of the combined box with a QuickSelect
//! median partition. Storage uses an implicit indexing scheme: children of
//! node `i` sit at `2*i + 1` and `2*i + 2`, so no child pointers are stored.
//! Nearest-surface queries walk the tree branch-and-bound, visiting the
//! closer child first and pruning subtrees whose box lies farther than the
//! best hit so far. Inside tests cast a fixed skew ray and count triangle
//! crossings (odd = inside).
//!
//! # BambuStudio Reference
//!
//! This corresponds to:
//! - `src/libslic3r/AABBTreeIndirect.hpp`
//!
//! The closest-point-on-triangle routine follows "Real-Time Collision
//! Detection" by Christer Ericson; the ray-triangle test is Möller-Trumbore.

use crate::geometry::{BoundingBox3F, Point3F};
use crate::mesh::TriangleMesh;
use crate::{CoordF, Error, Result};

/// Nearest-surface distance and inside queries over a solid.
///
/// The octree builder only sees this trait; [`MeshDistanceField`] is the
/// default implementation. `Sync` so a prepared oracle can serve concurrent
/// read-only queries.
pub trait DistanceOracle: Sync {
    /// Unsigned distance from `point` to the nearest surface, in mm.
    ///
    /// `None` signals a failed query; the octree builder aborts on it.
    fn nearest_distance(&self, point: &Point3F) -> Option<CoordF>;

    /// Whether `point` lies inside the solid.
    fn contains(&self, point: &Point3F) -> Option<bool>;
}

/// Sentinel for an unused tree slot.
const NPOS: usize = usize::MAX;
/// Sentinel marking an internal (non-leaf) tree node.
const INNER: usize = usize::MAX - 1;

/// Inflation applied to triangle boxes at build time.
const BOX_EPSILON: CoordF = 1e-6;
/// Squared cross-product length below which a triangle counts as zero-area.
const AREA_EPSILON: CoordF = 1e-16;
/// Determinant threshold for ray-parallel-to-triangle rejection.
const DET_EPSILON: CoordF = 1e-12;
/// Minimum ray parameter for a hit to count as a crossing.
const RAY_EPSILON: CoordF = 1e-9;
/// Hits closer than this along the ray collapse into one crossing.
const HIT_MERGE_EPSILON: CoordF = 1e-9;

/// Fixed direction for parity rays. Skewed against all three world axes so
/// axis-aligned facets are never hit edge-on.
const PARITY_RAY_DIR: Point3F = Point3F::new(0.4068, 0.8149, 0.4128);

/// Closest surface point found by [`MeshDistanceField::nearest_point`].
#[derive(Debug, Clone, Copy)]
pub struct NearestSurfacePoint {
    /// Index into the field's triangle list (degenerates filtered out).
    pub triangle: usize,
    /// The closest point on that triangle.
    pub point: Point3F,
    /// Squared distance from the query point.
    pub squared_distance: CoordF,
}

impl NearestSurfacePoint {
    /// Distance from the query point.
    #[inline]
    pub fn distance(&self) -> CoordF {
        self.squared_distance.sqrt()
    }
}

/// A single slot in the implicit tree array.
#[derive(Debug, Clone)]
struct TreeNode {
    /// Triangle index for leaves, `INNER` for split nodes, `NPOS` if unused.
    idx: usize,
    bounds: BoundingBox3F,
}

impl TreeNode {
    fn unused() -> Self {
        Self {
            idx: NPOS,
            bounds: BoundingBox3F::new(),
        }
    }
}

/// Per-triangle input while the tree is being balanced.
struct BuildItem {
    idx: usize,
    bounds: BoundingBox3F,
    centroid: Point3F,
}

/// AABB-tree-backed implementation of [`DistanceOracle`].
///
/// Owns a filtered copy of the mesh (vertices plus non-degenerate triangle
/// indices), so the source mesh may be dropped after [`build`](Self::build).
#[derive(Debug)]
pub struct MeshDistanceField {
    vertices: Vec<Point3F>,
    triangles: Vec<[u32; 3]>,
    nodes: Vec<TreeNode>,
    bounds: BoundingBox3F,
}

impl MeshDistanceField {
    /// Build the distance field for a mesh.
    ///
    /// Triangles with repeated vertex indices or near-zero area are skipped.
    /// Fails with [`Error::DegenerateInput`] when no usable triangle remains
    /// and with [`Error::Mesh`] when the mesh indices are out of range.
    pub fn build(mesh: &TriangleMesh) -> Result<Self> {
        mesh.validate()?;

        let vertices: Vec<Point3F> = mesh.vertices().to_vec();
        let mut triangles: Vec<[u32; 3]> = Vec::with_capacity(mesh.triangle_count());
        for (idx, tri) in mesh.indices().iter().enumerate() {
            if tri.is_degenerate() {
                continue;
            }
            let [a, b, c] = mesh.triangle_vertices(idx);
            if (b - a).cross(&(c - a)).length_squared() <= AREA_EPSILON {
                continue;
            }
            triangles.push(tri.indices);
        }

        if triangles.is_empty() {
            return Err(Error::DegenerateInput(format!(
                "no usable triangles among {} in the mesh",
                mesh.triangle_count()
            )));
        }

        let mut input: Vec<BuildItem> = triangles
            .iter()
            .enumerate()
            .map(|(idx, tri)| {
                let v0 = vertices[tri[0] as usize];
                let v1 = vertices[tri[1] as usize];
                let v2 = vertices[tri[2] as usize];

                let mut bounds = BoundingBox3F::from_points(&[v0, v1, v2]);
                bounds.expand(BOX_EPSILON);

                BuildItem {
                    idx,
                    bounds,
                    centroid: (v0 + v1 + v2) * (1.0 / 3.0),
                }
            })
            .collect();

        let mut bounds = BoundingBox3F::new();
        for item in &input {
            bounds.merge(&item.bounds);
        }

        let last = input.len() - 1;
        let mut field = Self {
            vertices,
            triangles,
            nodes: vec![TreeNode::unused(); input.len().next_power_of_two() * 2 - 1],
            bounds,
        };
        field.build_node(&mut input, 0, 0, last);
        Ok(field)
    }

    /// Number of usable triangles indexed by the field.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Bounding box of the indexed triangles.
    #[inline]
    pub fn bounds(&self) -> BoundingBox3F {
        self.bounds
    }

    /// Find the closest surface point to `point`.
    pub fn nearest_point(&self, point: &Point3F) -> Option<NearestSurfacePoint> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best = NearestSurfacePoint {
            triangle: NPOS,
            point: Point3F::zero(),
            squared_distance: CoordF::MAX,
        };
        self.nearest_recursive(point, 0, &mut best);

        (best.triangle != NPOS).then_some(best)
    }

    #[inline]
    fn triangle_vertices(&self, idx: usize) -> [Point3F; 3] {
        let tri = self.triangles[idx];
        [
            self.vertices[tri[0] as usize],
            self.vertices[tri[1] as usize],
            self.vertices[tri[2] as usize],
        ]
    }

    fn build_node(&mut self, input: &mut [BuildItem], node_idx: usize, left: usize, right: usize) {
        debug_assert!(node_idx < self.nodes.len());
        debug_assert!(left <= right);

        if left == right {
            self.nodes[node_idx].idx = input[left].idx;
            self.nodes[node_idx].bounds = input[left].bounds;
            return;
        }

        let mut bounds = input[left].bounds;
        for item in &input[left + 1..=right] {
            bounds.merge(&item.bounds);
        }
        let axis = bounds.longest_axis();

        let center = (left + right) / 2;
        partition_items(input, axis, left, right, center);

        self.nodes[node_idx].idx = INNER;
        self.nodes[node_idx].bounds = bounds;

        self.build_node(input, left_child(node_idx), left, center);
        self.build_node(input, right_child(node_idx), center + 1, right);
    }

    fn nearest_recursive(
        &self,
        point: &Point3F,
        node_idx: usize,
        best: &mut NearestSurfacePoint,
    ) {
        let node = match self.nodes.get(node_idx) {
            Some(n) if n.idx != NPOS => n,
            _ => return,
        };

        if node.idx != INNER {
            let [v0, v1, v2] = self.triangle_vertices(node.idx);
            let closest = closest_point_on_triangle(point, &v0, &v1, &v2);
            let sqr_dist = point.distance_squared(&closest);
            if sqr_dist < best.squared_distance {
                *best = NearestSurfacePoint {
                    triangle: node.idx,
                    point: closest,
                    squared_distance: sqr_dist,
                };
            }
            return;
        }

        let left = left_child(node_idx);
        let right = right_child(node_idx);
        let left_dist = self.subtree_distance(left, point);
        let right_dist = self.subtree_distance(right, point);

        // Closer child first so the far subtree usually prunes away.
        let (first, first_dist, second, second_dist) = if left_dist <= right_dist {
            (left, left_dist, right, right_dist)
        } else {
            (right, right_dist, left, left_dist)
        };

        if first_dist < best.squared_distance {
            self.nearest_recursive(point, first, best);
        }
        if second_dist < best.squared_distance {
            self.nearest_recursive(point, second, best);
        }
    }

    #[inline]
    fn subtree_distance(&self, node_idx: usize, point: &Point3F) -> CoordF {
        match self.nodes.get(node_idx) {
            Some(n) if n.idx != NPOS => n.bounds.squared_exterior_distance(point),
            _ => CoordF::MAX,
        }
    }

    /// Count surface crossings along the fixed parity ray from `point`.
    fn crossing_count(&self, point: &Point3F) -> usize {
        let dir = PARITY_RAY_DIR;
        let inv_dir = Point3F::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);

        let mut hits: Vec<CoordF> = Vec::new();
        self.ray_hits_recursive(point, &dir, &inv_dir, 0, &mut hits);
        hits.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // A ray through a shared edge reports one hit per adjacent triangle;
        // near-identical hit distances collapse into a single crossing.
        let mut count = 0;
        let mut last_t = CoordF::MIN;
        for &t in &hits {
            if t - last_t > HIT_MERGE_EPSILON {
                count += 1;
            }
            last_t = t;
        }
        count
    }

    fn ray_hits_recursive(
        &self,
        origin: &Point3F,
        dir: &Point3F,
        inv_dir: &Point3F,
        node_idx: usize,
        hits: &mut Vec<CoordF>,
    ) {
        let node = match self.nodes.get(node_idx) {
            Some(n) if n.idx != NPOS => n,
            _ => return,
        };

        if !ray_box_intersect(origin, inv_dir, &node.bounds) {
            return;
        }

        if node.idx != INNER {
            let [v0, v1, v2] = self.triangle_vertices(node.idx);
            if let Some(t) = ray_triangle_intersect(origin, dir, &v0, &v1, &v2) {
                hits.push(t);
            }
            return;
        }

        self.ray_hits_recursive(origin, dir, inv_dir, left_child(node_idx), hits);
        self.ray_hits_recursive(origin, dir, inv_dir, right_child(node_idx), hits);
    }
}

impl DistanceOracle for MeshDistanceField {
    fn nearest_distance(&self, point: &Point3F) -> Option<CoordF> {
        self.nearest_point(point).map(|hit| hit.distance())
    }

    fn contains(&self, point: &Point3F) -> Option<bool> {
        if self.nodes.is_empty() {
            return None;
        }
        if !self.bounds.contains_point(point) {
            return Some(false);
        }
        Some(self.crossing_count(point) % 2 == 1)
    }
}

#[inline]
fn left_child(idx: usize) -> usize {
    idx * 2 + 1
}

#[inline]
fn right_child(idx: usize) -> usize {
    idx * 2 + 2
}

/// Partition `items[left..=right]` so the item at `k` is the median along
/// `axis` and everything before it sorts no higher (QuickSelect with
/// median-of-three pivots).
fn partition_items(
    items: &mut [BuildItem],
    axis: usize,
    mut left: usize,
    mut right: usize,
    k: usize,
) {
    while left < right {
        let center = (left + right) / 2;

        // Order left, center, right so the pivot is their median.
        if items[left].centroid.axis(axis) > items[center].centroid.axis(axis) {
            items.swap(left, center);
        }
        if items[left].centroid.axis(axis) > items[right].centroid.axis(axis) {
            items.swap(left, right);
        }
        if items[center].centroid.axis(axis) > items[right].centroid.axis(axis) {
            items.swap(center, right);
        }

        if right <= left + 2 {
            break;
        }

        let pivot = items[center].centroid.axis(axis);
        let mut i = left;
        let mut j = right - 1;
        items.swap(center, j);

        loop {
            loop {
                i += 1;
                if items[i].centroid.axis(axis) >= pivot {
                    break;
                }
            }
            loop {
                j -= 1;
                if items[j].centroid.axis(axis) <= pivot || i >= j {
                    break;
                }
            }
            if i >= j {
                break;
            }
            items.swap(i, j);
        }

        items.swap(i, right - 1);

        if k < i {
            right = i - 1;
        } else if k == i {
            break;
        } else {
            left = i + 1;
        }
    }
}

/// Slab test of the parity ray against a node box, range `[0, inf)`.
fn ray_box_intersect(origin: &Point3F, inv_dir: &Point3F, bounds: &BoundingBox3F) -> bool {
    let mut tmin: CoordF = 0.0;
    let mut tmax: CoordF = CoordF::MAX;

    for i in 0..3 {
        let inv = inv_dir.axis(i);
        let lo = (bounds.min.axis(i) - origin.axis(i)) * inv;
        let hi = (bounds.max.axis(i) - origin.axis(i)) * inv;
        let (near, far) = if inv >= 0.0 { (lo, hi) } else { (hi, lo) };

        tmin = tmin.max(near);
        tmax = tmax.min(far);
        if tmin > tmax {
            return false;
        }
    }
    true
}

/// Möller-Trumbore ray-triangle intersection. Returns the ray parameter of
/// the hit, if any.
fn ray_triangle_intersect(
    origin: &Point3F,
    dir: &Point3F,
    v0: &Point3F,
    v1: &Point3F,
    v2: &Point3F,
) -> Option<CoordF> {
    let edge1 = *v1 - *v0;
    let edge2 = *v2 - *v0;

    let pvec = dir.cross(&edge2);
    let det = edge1.dot(&pvec);
    if det.abs() < DET_EPSILON {
        // Ray is parallel to the triangle plane.
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = *origin - *v0;

    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(&edge1);
    let v = dir.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(&qvec) * inv_det;
    (t > RAY_EPSILON).then_some(t)
}

/// Closest point on triangle `abc` to point `p` (Ericson, "Real-Time
/// Collision Detection", ch. 5.1.5).
fn closest_point_on_triangle(p: &Point3F, a: &Point3F, b: &Point3F, c: &Point3F) -> Point3F {
    let ab = *b - *a;
    let ac = *c - *a;
    let ap = *p - *a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = *p - *b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return *a + ab * v;
    }

    let cp = *p - *c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return *a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return *b + (*c - *b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    *a + ab * v + ac * w
}
