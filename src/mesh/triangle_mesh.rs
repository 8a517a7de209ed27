//! Triangle mesh input for infill generation.
//!
//! Meshes are indexed triangle sets: a vertex array in floating-point
//! millimeters plus index triples, the same layout as BambuStudio's
//! `indexed_triangle_set`. The mesh is query-only input here; slicing,
//! repair and boolean operations live upstream.

use crate::geometry::{BoundingBox3F, Point3F};
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single triangle defined by three vertex indices.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    /// Indices into the vertex array for the three corners.
    pub indices: [u32; 3],
}

impl Triangle {
    /// Create a new triangle from vertex indices.
    #[inline]
    pub const fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self {
            indices: [v0, v1, v2],
        }
    }

    /// Get the vertex index at position i (0, 1, or 2).
    #[inline]
    pub fn vertex(&self, i: usize) -> u32 {
        self.indices[i]
    }

    /// Check if this triangle repeats a vertex index.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.indices[0] == self.indices[1]
            || self.indices[1] == self.indices[2]
            || self.indices[2] == self.indices[0]
    }
}

impl fmt::Debug for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Triangle({}, {}, {})",
            self.indices[0], self.indices[1], self.indices[2]
        )
    }
}

impl From<[u32; 3]> for Triangle {
    #[inline]
    fn from(indices: [u32; 3]) -> Self {
        Self { indices }
    }
}

/// A 3D triangle mesh represented as an indexed triangle set.
///
/// The mesh surface drives octree refinement: cubes near triangles get
/// subdivided, cubes deep inside stay coarse. Vertices are expected in
/// world coordinates (mm).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions (in mm, floating-point).
    vertices: Vec<Point3F>,
    /// Triangle indices into the vertex array.
    indices: Vec<Triangle>,
    /// Cached bounding box (lazily computed).
    #[serde(skip)]
    bounding_box: Option<BoundingBox3F>,
}

impl TriangleMesh {
    /// Create a new empty mesh.
    #[inline]
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            bounding_box: None,
        }
    }

    /// Create a mesh from vertices and indices.
    pub fn from_parts(vertices: Vec<Point3F>, indices: Vec<Triangle>) -> Self {
        Self {
            vertices,
            indices,
            bounding_box: None,
        }
    }

    /// Get the vertices of the mesh.
    #[inline]
    pub fn vertices(&self) -> &[Point3F] {
        &self.vertices
    }

    /// Get the triangle indices.
    #[inline]
    pub fn indices(&self) -> &[Triangle] {
        &self.indices
    }

    /// Get the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Check if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, v: Point3F) -> u32 {
        let idx = self.vertices.len() as u32;
        self.vertices.push(v);
        self.bounding_box = None;
        idx
    }

    /// Add a triangle from vertex indices.
    pub fn add_triangle_indices(&mut self, v0: u32, v1: u32, v2: u32) {
        self.indices.push(Triangle::new(v0, v1, v2));
    }

    /// Get a vertex by index.
    #[inline]
    pub fn vertex(&self, idx: u32) -> Point3F {
        self.vertices[idx as usize]
    }

    /// Get the three vertices of a triangle.
    #[inline]
    pub fn triangle_vertices(&self, tri_idx: usize) -> [Point3F; 3] {
        let tri = &self.indices[tri_idx];
        [
            self.vertices[tri.indices[0] as usize],
            self.vertices[tri.indices[1] as usize],
            self.vertices[tri.indices[2] as usize],
        ]
    }

    /// Get the bounding box of the mesh, caching the result.
    pub fn bounding_box(&mut self) -> BoundingBox3F {
        if let Some(bb) = self.bounding_box {
            return bb;
        }

        let bb = self.compute_bounding_box();
        self.bounding_box = Some(bb);
        bb
    }

    /// Get the bounding box without caching (const method).
    pub fn compute_bounding_box(&self) -> BoundingBox3F {
        let mut bb = BoundingBox3F::new();
        for v in &self.vertices {
            bb.merge_point(*v);
        }
        bb
    }

    /// Calculate the normal of a triangle.
    pub fn triangle_normal(&self, tri_idx: usize) -> Point3F {
        let [v0, v1, v2] = self.triangle_vertices(tri_idx);
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        e1.cross(&e2).normalize()
    }

    /// Calculate the area of a triangle.
    pub fn triangle_area(&self, tri_idx: usize) -> CoordF {
        let [v0, v1, v2] = self.triangle_vertices(tri_idx);
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        e1.cross(&e2).length() / 2.0
    }

    /// Translate the mesh by a vector.
    pub fn translate(&mut self, v: Point3F) {
        for vertex in &mut self.vertices {
            *vertex = *vertex + v;
        }
        self.bounding_box = None;
    }

    /// Scale the mesh uniformly about the origin.
    pub fn scale(&mut self, factor: CoordF) {
        for vertex in &mut self.vertices {
            *vertex = *vertex * factor;
        }
        self.bounding_box = None;
    }

    /// Validate the mesh (check for valid indices).
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len() as u32;
        for (i, tri) in self.indices.iter().enumerate() {
            for &idx in &tri.indices {
                if idx >= vertex_count {
                    return Err(Error::Mesh(format!(
                        "Triangle {} has invalid vertex index {} (only {} vertices)",
                        i, idx, vertex_count
                    )));
                }
            }
        }
        Ok(())
    }

    /// Create an axis-aligned box mesh centered at the origin.
    pub fn cuboid(size: Point3F) -> Self {
        let hx = size.x / 2.0;
        let hy = size.y / 2.0;
        let hz = size.z / 2.0;
        let vertices = vec![
            // Bottom face
            Point3F::new(-hx, -hy, -hz),
            Point3F::new(hx, -hy, -hz),
            Point3F::new(hx, hy, -hz),
            Point3F::new(-hx, hy, -hz),
            // Top face
            Point3F::new(-hx, -hy, hz),
            Point3F::new(hx, -hy, hz),
            Point3F::new(hx, hy, hz),
            Point3F::new(-hx, hy, hz),
        ];

        let indices = vec![
            // Bottom
            Triangle::new(0, 2, 1),
            Triangle::new(0, 3, 2),
            // Top
            Triangle::new(4, 5, 6),
            Triangle::new(4, 6, 7),
            // Front
            Triangle::new(0, 1, 5),
            Triangle::new(0, 5, 4),
            // Back
            Triangle::new(2, 3, 7),
            Triangle::new(2, 7, 6),
            // Left
            Triangle::new(0, 4, 7),
            Triangle::new(0, 7, 3),
            // Right
            Triangle::new(1, 2, 6),
            Triangle::new(1, 6, 5),
        ];

        Self::from_parts(vertices, indices)
    }

    /// Create a cube mesh centered at the origin.
    pub fn cube(size: CoordF) -> Self {
        Self::cuboid(Point3F::new(size, size, size))
    }
}

impl fmt::Debug for TriangleMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TriangleMesh({} vertices, {} triangles)",
            self.vertices.len(),
            self.indices.len()
        )
    }
}
