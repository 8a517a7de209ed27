//! # Adaptive Volumetric Infill
//!
//! Octree-based adaptive cubic infill generation for 3D printing slicers.
//!
//! Given a closed triangle mesh and a target line spacing, this crate builds an
//! octree of corner-standing cubes (each cube rotated so one space diagonal is
//! vertical) whose cell size shrinks near the mesh surface, then derives, for any
//! horizontal slicing plane, connected line segments approximating an isotropic
//! 3D lattice inside the solid. Coarse cells fill deep bulk material with sparse
//! lines; fine cells near the surface provide dense support for skins and
//! overhangs.
//!
//! This is a port of the adaptive cubic infill from BambuStudio / PrusaSlicer
//! (`libslic3r/Fill/FillAdaptive.cpp`), restructured around an explicit
//! nearest-surface-distance oracle.
//!
//! ## Pipeline
//!
//! ```text
//! TriangleMesh ──► MeshDistanceField ──► build_octree ──► Octree
//! Octree + z   ──► generate_for_layer ──► raw segments ──► connect ──► Polylines
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use adaptive_infill::infill::{AdaptiveInfillConfig, AdaptiveInfillGenerator};
//! use adaptive_infill::mesh::TriangleMesh;
//!
//! let mesh = TriangleMesh::cube(20.0);
//! let config = AdaptiveInfillConfig::from_density(0.15, 0.45);
//! let mut generator = AdaptiveInfillGenerator::new(config);
//! generator.prepare(&mesh)?;
//!
//! for z in [0.2, 0.4, 0.6] {
//!     let paths = generator.fill_layer(z);
//!     // hand `paths` to the toolpath assembler
//! }
//! ```
//!
//! ## Coordinate convention
//!
//! 3D mesh and octree arithmetic is done in `f64` millimeters ([`CoordF`]).
//! Emitted 2D geometry (points, lines, polylines) uses scaled `i64` coordinates
//! ([`Coord`]) with [`SCALING_FACTOR`] units per millimeter, converted by
//! [`scale`] / [`unscale`] at the emission boundary only.

use thiserror::Error as ThisError;

pub mod geometry;
pub mod infill;
pub mod mesh;

/// Scaled integer coordinate. 1 mm = [`SCALING_FACTOR`] units (1 unit = 1 nm).
pub type Coord = i64;

/// Unscaled floating-point coordinate in millimeters.
pub type CoordF = f64;

/// Number of scaled units per millimeter.
pub const SCALING_FACTOR: CoordF = 1_000_000.0;

/// Convert millimeters to scaled integer units.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Convert scaled integer units back to millimeters.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Errors produced by mesh validation, oracle construction, and octree building.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The mesh is structurally invalid (e.g. out-of-range vertex indices).
    #[error("Mesh error: {0}")]
    Mesh(String),

    /// The input cannot support adaptive infill: empty mesh, zero bounding
    /// volume, or non-positive line spacing. [`infill::build_octree`] catches
    /// this internally and refuses to build (root-only octree) rather than
    /// aborting the job.
    #[error("Degenerate infill input: {0}")]
    DegenerateInput(String),

    /// The distance oracle failed to answer a query; octree construction for
    /// this mesh is aborted. Other meshes in the job are unaffected.
    #[error("Distance oracle unavailable: {0}")]
    OracleUnavailable(String),
}

/// Result type for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

pub use infill::{
    build_octree, connect, generate_for_layer, AdaptiveInfillConfig, AdaptiveInfillGenerator,
    AdaptiveInfillResult, Octree,
};
pub use mesh::{DistanceOracle, MeshDistanceField, TriangleMesh};
