//! Octree construction over a nearest-surface-distance oracle.
//!
//! # Algorithm
//!
//! One corner-standing root cube, centered on the requested point and sized
//! to enclose the whole mesh, is subdivided breadth-wise from a worklist.
//! A cube splits into its eight children while two conditions hold: the
//! per-depth table has a finer level left, and the oracle reports a surface
//! closer than the cube's own face diagonal. Cubes that stop splitting
//! become leaves and are classified as filled (they will emit lines) when
//! the surface is within half the cube height or the cube center lies
//! inside the solid.
//!
//! Subdivision is all-or-nothing: every interior cube has exactly eight
//! children, so octant positions stay meaningful for the layer generator's
//! direction assignment.
//!
//! # BambuStudio Reference
//!
//! - `src/libslic3r/Fill/FillAdaptive.cpp` - `FillAdaptive::build_octree`,
//!   `Octree::insert_triangle`. The reference subdivides along intersecting
//!   triangles; here the same shape is grown from distance queries, which
//!   also refines near external sharp features the triangle walk misses.

use crate::geometry::{cube_frame_to_world, BoundingBox3F, Point3F};
use crate::mesh::{DistanceOracle, MeshDistanceField, TriangleMesh};
use crate::{CoordF, Error, Result};

use super::cube::{cube_properties_for_spacing, CubeProperties};

/// Child center directions in the cube-local frame, one per octant.
///
/// Octant index is the position in this table; the layer generator derives
/// line directions from it, so the order is fixed.
const CHILD_DIRECTIONS: [[CoordF; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// One octree cell, a corner-standing cube.
///
/// `children` is either empty (leaf) or holds exactly eight cubes in octant
/// order. Only leaves are classified: `filled` stays `false` on interior
/// cubes and on leaves whose center sits in air.
#[derive(Debug)]
pub struct Cube {
    /// Cube center in world coordinates (mm).
    pub center: Point3F,
    /// Depth in the octree; indexes the per-depth properties table.
    pub depth: usize,
    /// Leaf classification: this cube contributes lines to layers.
    pub filled: bool,
    /// Eight children in octant order, or empty for a leaf.
    pub children: Vec<Cube>,
}

impl Cube {
    fn new(center: Point3F, depth: usize) -> Self {
        Self {
            center,
            depth,
            filled: false,
            children: Vec::new(),
        }
    }

    /// Whether this cube has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The adaptive infill octree for one mesh.
///
/// Holds the root cube, the center it was grown around, and the per-depth
/// [`CubeProperties`] table (element 0 is the root level). A refused build
/// (degenerate input) yields a root-only octree with an empty table, which
/// generates no lines.
#[derive(Debug)]
pub struct Octree {
    root: Cube,
    origin: Point3F,
    cubes_properties: Vec<CubeProperties>,
}

impl Octree {
    /// The root cube.
    #[inline]
    pub fn root(&self) -> &Cube {
        &self.root
    }

    /// The point the root cube is centered on.
    #[inline]
    pub fn origin(&self) -> Point3F {
        self.origin
    }

    /// Per-depth cube measurements, coarsest (root) first.
    #[inline]
    pub fn properties(&self) -> &[CubeProperties] {
        &self.cubes_properties
    }

    /// The deepest depth the properties table supports.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.cubes_properties.len().saturating_sub(1)
    }

    /// Total number of cubes in the tree.
    pub fn cube_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(cube) = stack.pop() {
            count += 1;
            stack.extend(cube.children.iter());
        }
        count
    }

    /// Number of leaves classified as filled.
    pub fn filled_leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(cube) = stack.pop() {
            if cube.is_leaf() && cube.filled {
                count += 1;
            }
            stack.extend(cube.children.iter());
        }
        count
    }

    fn refused(origin: Point3F) -> Self {
        Self {
            root: Cube::new(origin, 0),
            origin,
            cubes_properties: Vec::new(),
        }
    }
}

/// Build the adaptive infill octree for a triangle mesh.
///
/// Constructs a [`MeshDistanceField`] over `mesh` and grows the octree
/// around `requested_center` (callers pass the mesh bounding-box center so
/// lattice lines land consistently across restarts).
///
/// Degenerate input (empty mesh, zero bounding volume, non-positive
/// `line_spacing`, or a mesh with no usable triangles) is refused: a
/// warning is logged and a root-only octree is returned so the remaining
/// layers of the job still print, just without infill for this mesh.
/// Structural mesh errors and oracle failures are propagated.
pub fn build_octree(
    mesh: &TriangleMesh,
    line_spacing: CoordF,
    requested_center: Point3F,
) -> Result<Octree> {
    if line_spacing <= 0.0 {
        return Ok(refuse(
            requested_center,
            &format!("line spacing {line_spacing} is not positive"),
        ));
    }
    if mesh.is_empty() {
        return Ok(refuse(requested_center, "mesh has no triangles"));
    }

    let bounds = mesh.compute_bounding_box();
    if !bounds.is_defined() || bounds.volume() <= 0.0 {
        return Ok(refuse(requested_center, "mesh bounding box has no volume"));
    }

    let field = match MeshDistanceField::build(mesh) {
        Ok(field) => field,
        Err(Error::DegenerateInput(reason)) => return Ok(refuse(requested_center, &reason)),
        Err(err) => return Err(err),
    };

    let properties = cube_properties_for_spacing(line_spacing, bounds.size().length());
    expand(&field, properties, requested_center)
}

/// Build an octree from a caller-supplied distance oracle.
///
/// `bounds` stands in for the mesh extents the oracle represents; it sizes
/// the root cube exactly as [`build_octree`] does from the mesh bounding
/// box. Degenerate input is refused the same way.
pub fn build_octree_with_oracle(
    oracle: &dyn DistanceOracle,
    bounds: &BoundingBox3F,
    line_spacing: CoordF,
    requested_center: Point3F,
) -> Result<Octree> {
    if line_spacing <= 0.0 {
        return Ok(refuse(
            requested_center,
            &format!("line spacing {line_spacing} is not positive"),
        ));
    }
    if !bounds.is_defined() || bounds.volume() <= 0.0 {
        return Ok(refuse(requested_center, "oracle bounds have no volume"));
    }

    let properties = cube_properties_for_spacing(line_spacing, bounds.size().length());
    expand(oracle, properties, requested_center)
}

fn refuse(origin: Point3F, reason: &str) -> Octree {
    log::warn!("adaptive infill refused: {reason}; this mesh gets no infill");
    Octree::refused(origin)
}

/// Grow the octree by processing a worklist of pending cubes.
///
/// Worklist entries are octant index paths from the root; each is resolved
/// to a `&mut Cube` when popped, so the tree is built without recursion and
/// without holding references across mutations.
fn expand(
    oracle: &dyn DistanceOracle,
    properties: Vec<CubeProperties>,
    origin: Point3F,
) -> Result<Octree> {
    debug_assert!(!properties.is_empty());
    let max_depth = properties.len() - 1;

    let rotation = cube_frame_to_world();
    let child_directions: Vec<Point3F> = CHILD_DIRECTIONS
        .iter()
        .map(|[x, y, z]| rotation.mul_vec(&Point3F::new(*x, *y, *z)))
        .collect();

    let mut root = Cube::new(origin, 0);
    let mut pending: Vec<Vec<u8>> = vec![Vec::new()];

    while let Some(path) = pending.pop() {
        let cube = cube_at_path_mut(&mut root, &path);
        let props = &properties[cube.depth];

        let distance = oracle.nearest_distance(&cube.center).ok_or_else(|| {
            Error::OracleUnavailable(format!(
                "no nearest-surface answer at cube center {}",
                cube.center
            ))
        })?;

        if cube.depth < max_depth && distance < props.diagonal_length {
            let offset = props.edge_length / 4.0;
            let center = cube.center;
            let depth = cube.depth;
            cube.children = child_directions
                .iter()
                .map(|direction| Cube::new(center + *direction * offset, depth + 1))
                .collect();
            for octant in 0..CHILD_DIRECTIONS.len() as u8 {
                let mut child_path = path.clone();
                child_path.push(octant);
                pending.push(child_path);
            }
        } else {
            cube.filled = distance <= props.height / 2.0
                || oracle.contains(&cube.center).ok_or_else(|| {
                    Error::OracleUnavailable(format!(
                        "no inside/outside answer at cube center {}",
                        cube.center
                    ))
                })?;
        }
    }

    let octree = Octree {
        root,
        origin,
        cubes_properties: properties,
    };
    log::debug!(
        "adaptive infill octree: {} cubes, {} filled leaves, max depth {}",
        octree.cube_count(),
        octree.filled_leaf_count(),
        max_depth
    );
    Ok(octree)
}

fn cube_at_path_mut<'a>(root: &'a mut Cube, path: &[u8]) -> &'a mut Cube {
    let mut cube = root;
    for &octant in path {
        cube = &mut cube.children[octant as usize];
    }
    cube
}
