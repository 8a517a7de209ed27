//! Adaptive cubic infill.
//!
//! # Algorithm Overview
//!
//! The generator approximates the space-filling corner-standing cube
//! lattice: cubes rotated so one space diagonal is vertical, recursively
//! subdivided in an octree so cell size halves near the mesh surface.
//! Slicing a cube with a horizontal plane yields one chord per cube; the
//! per-depth direction rotation weaves the chords of successive layers
//! into a self-supporting 3D lattice whose density adapts to the surface.
//!
//! The pipeline has three steps, each usable on its own:
//!
//! 1. [`build_octree`] grows the octree over a nearest-surface-distance
//!    oracle (normally a [`MeshDistanceField`](crate::mesh::MeshDistanceField)
//!    built from the mesh).
//! 2. [`generate_for_layer`] cuts the octree at a layer height, emitting
//!    raw segments.
//! 3. [`connect`] stitches the segments into printable polylines.
//!
//! [`AdaptiveInfillGenerator`] packages the three behind a prepare-once,
//! fill-per-layer interface.
//!
//! # BambuStudio Reference
//!
//! - `src/libslic3r/Fill/FillAdaptive.cpp` / `FillAdaptive.hpp` - octree
//!   construction and line generation
//! - Cura's `SierpinskiFill` and the "CrossFill" paper lineage for the
//!   corner-standing cube idea

mod connect;
mod cube;
mod lines;
mod octree;

pub use connect::{connect, connect_with_tolerance, STITCH_TOLERANCE};
pub use cube::{cube_properties_for_spacing, CubeProperties};
pub use lines::generate_for_layer;
pub use octree::{build_octree, build_octree_with_oracle, Cube, Octree};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point3F, Polyline, Polylines};
use crate::mesh::TriangleMesh;
use crate::{CoordF, Result, SCALING_FACTOR};

/// Parameters of adaptive infill generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveInfillConfig {
    /// Distance between neighboring lines at the finest octree level (mm).
    pub line_spacing: CoordF,

    /// Endpoint tolerance when stitching segments into polylines (mm).
    pub stitch_tolerance: CoordF,

    /// Stitch raw segments into connected polylines. When disabled every
    /// chord becomes its own two-point polyline.
    pub connect_lines: bool,
}

impl Default for AdaptiveInfillConfig {
    fn default() -> Self {
        Self {
            line_spacing: 2.0,
            stitch_tolerance: STITCH_TOLERANCE,
            connect_lines: true,
        }
    }
}

impl AdaptiveInfillConfig {
    /// Derive the line spacing from an infill density fraction and the
    /// extrusion width, the way slicer frontends express it.
    ///
    /// `density` is clamped to `0.01..=1.0`.
    pub fn from_density(density: CoordF, extrusion_width: CoordF) -> Self {
        let density = density.clamp(0.01, 1.0);
        Self {
            line_spacing: extrusion_width / density,
            ..Self::default()
        }
    }

    /// Set the line spacing (mm).
    pub fn with_line_spacing(mut self, line_spacing: CoordF) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    /// Set the stitch tolerance (mm).
    pub fn with_stitch_tolerance(mut self, stitch_tolerance: CoordF) -> Self {
        self.stitch_tolerance = stitch_tolerance;
        self
    }

    /// Enable or disable stitching.
    pub fn with_connect_lines(mut self, connect_lines: bool) -> Self {
        self.connect_lines = connect_lines;
        self
    }
}

/// Prepare-once, fill-per-layer adaptive infill for one mesh.
///
/// [`prepare`](Self::prepare) builds the octree; afterwards
/// [`fill_layer`](Self::fill_layer) is `&self` and layers can be filled
/// in any order or in parallel via [`fill_layers`](Self::fill_layers).
#[derive(Debug)]
pub struct AdaptiveInfillGenerator {
    config: AdaptiveInfillConfig,
    octree: Option<Octree>,
}

impl AdaptiveInfillGenerator {
    /// Create a generator with the given configuration.
    pub fn new(config: AdaptiveInfillConfig) -> Self {
        Self {
            config,
            octree: None,
        }
    }

    /// Create a generator with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AdaptiveInfillConfig::default())
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &AdaptiveInfillConfig {
        &self.config
    }

    /// Build the octree for `mesh`, centered on its bounding-box center.
    ///
    /// Degenerate meshes are accepted (the generator then produces no
    /// infill); structural mesh errors and oracle failures are returned.
    pub fn prepare(&mut self, mesh: &TriangleMesh) -> Result<()> {
        let bounds = mesh.compute_bounding_box();
        let center = if bounds.is_defined() {
            bounds.center()
        } else {
            Point3F::zero()
        };
        self.octree = Some(build_octree(mesh, self.config.line_spacing, center)?);
        Ok(())
    }

    /// Whether [`prepare`](Self::prepare) has succeeded.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.octree.is_some()
    }

    /// The prepared octree, if any.
    #[inline]
    pub fn octree(&self) -> Option<&Octree> {
        self.octree.as_ref()
    }

    /// Produce the infill paths for the layer at height `z` (mm).
    ///
    /// Returns no paths before [`prepare`](Self::prepare) or when the
    /// plane misses every filled cube.
    pub fn fill_layer(&self, z: CoordF) -> Polylines {
        let Some(octree) = &self.octree else {
            return Polylines::new();
        };

        let segments = generate_for_layer(octree, z);
        let paths = if self.config.connect_lines {
            connect_with_tolerance(&segments, self.config.stitch_tolerance)
        } else {
            segments.iter().map(Polyline::from_line).collect()
        };
        log::debug!(
            "adaptive infill layer z={z:.3}: {} segments -> {} paths",
            segments.len(),
            paths.len()
        );
        paths
    }

    /// [`fill_layer`](Self::fill_layer) plus summary statistics.
    pub fn fill_layer_result(&self, z: CoordF) -> AdaptiveInfillResult {
        AdaptiveInfillResult::new(self.fill_layer(z))
    }

    /// Fill many layers in parallel.
    ///
    /// Output order matches `layer_heights` regardless of scheduling.
    pub fn fill_layers(&self, layer_heights: &[CoordF]) -> Vec<Polylines> {
        let mut indexed: Vec<(usize, Polylines)> = layer_heights
            .par_iter()
            .enumerate()
            .map(|(index, &z)| (index, self.fill_layer(z)))
            .collect();
        indexed.sort_by_key(|&(index, _)| index);
        indexed.into_iter().map(|(_, paths)| paths).collect()
    }
}

/// The paths of one filled layer plus summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveInfillResult {
    /// The stitched infill paths.
    pub polylines: Polylines,
    /// Total extrusion path length (mm).
    pub total_length_mm: CoordF,
}

impl AdaptiveInfillResult {
    /// Wrap layer paths and compute their statistics.
    pub fn new(polylines: Polylines) -> Self {
        let total_length_mm =
            polylines.iter().map(Polyline::length).sum::<CoordF>() / SCALING_FACTOR;
        Self {
            polylines,
            total_length_mm,
        }
    }

    /// Number of paths in the layer.
    #[inline]
    pub fn path_count(&self) -> usize {
        self.polylines.len()
    }

    /// Whether the layer received no infill.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_generator() -> AdaptiveInfillGenerator {
        let config = AdaptiveInfillConfig::default().with_line_spacing(0.5);
        let mut generator = AdaptiveInfillGenerator::new(config);
        generator.prepare(&TriangleMesh::cube(2.0)).unwrap();
        generator
    }

    #[test]
    fn test_config_defaults() {
        let config = AdaptiveInfillConfig::default();
        assert!((config.line_spacing - 2.0).abs() < 1e-12);
        assert!((config.stitch_tolerance - STITCH_TOLERANCE).abs() < 1e-12);
        assert!(config.connect_lines);
    }

    #[test]
    fn test_config_from_density() {
        let config = AdaptiveInfillConfig::from_density(0.5, 0.45);
        assert!((config.line_spacing - 0.9).abs() < 1e-12);

        // Density is clamped away from zero.
        let sparse = AdaptiveInfillConfig::from_density(0.0, 0.45);
        assert!((sparse.line_spacing - 45.0).abs() < 1e-12);

        let dense = AdaptiveInfillConfig::from_density(5.0, 0.45);
        assert!((dense.line_spacing - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_config_builders() {
        let config = AdaptiveInfillConfig::default()
            .with_line_spacing(1.2)
            .with_stitch_tolerance(0.02)
            .with_connect_lines(false);
        assert!((config.line_spacing - 1.2).abs() < 1e-12);
        assert!((config.stitch_tolerance - 0.02).abs() < 1e-12);
        assert!(!config.connect_lines);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = AdaptiveInfillConfig::default().with_line_spacing(1.5);
        let json = serde_json::to_string(&config).unwrap();
        let back: AdaptiveInfillConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_generator_before_prepare_is_empty() {
        let generator = AdaptiveInfillGenerator::with_defaults();
        assert!(!generator.is_ready());
        assert!(generator.octree().is_none());
        assert!(generator.fill_layer(0.0).is_empty());
    }

    #[test]
    fn test_generator_fills_center_layer() {
        let generator = make_test_generator();
        assert!(generator.is_ready());

        let paths = generator.fill_layer(0.0);
        assert!(!paths.is_empty());
        for path in &paths {
            assert!(path.len() >= 2);
        }
    }

    #[test]
    fn test_unconnected_mode_yields_two_point_paths() {
        let config = AdaptiveInfillConfig::default()
            .with_line_spacing(0.5)
            .with_connect_lines(false);
        let mut generator = AdaptiveInfillGenerator::new(config);
        generator.prepare(&TriangleMesh::cube(2.0)).unwrap();

        let paths = generator.fill_layer(0.0);
        assert!(!paths.is_empty());
        for path in &paths {
            assert_eq!(path.len(), 2);
        }
    }

    #[test]
    fn test_fill_layers_matches_single_layer_calls() {
        let generator = make_test_generator();
        let heights = [-0.6, -0.2, 0.0, 0.4, 100.0];

        let all = generator.fill_layers(&heights);
        assert_eq!(all.len(), heights.len());
        for (paths, &z) in all.iter().zip(&heights) {
            assert_eq!(*paths, generator.fill_layer(z));
        }
        // The last height is above the mesh.
        assert!(all[4].is_empty());
    }

    #[test]
    fn test_degenerate_mesh_prepares_without_infill() {
        let mut generator = AdaptiveInfillGenerator::with_defaults();
        generator.prepare(&TriangleMesh::new()).unwrap();

        assert!(generator.is_ready());
        assert!(generator.fill_layer(0.0).is_empty());
    }

    #[test]
    fn test_fill_layer_result_statistics() {
        let generator = make_test_generator();

        let result = generator.fill_layer_result(0.0);
        assert!(!result.is_empty());
        assert_eq!(result.path_count(), result.polylines.len());
        assert!(result.total_length_mm > 0.0);
        // Paths live inside a 2 mm cube footprint; a gross upper bound
        // still catches unit mistakes in the length accounting.
        assert!(result.total_length_mm < 1000.0);

        let empty = generator.fill_layer_result(50.0);
        assert!(empty.is_empty());
        assert_eq!(empty.path_count(), 0);
        assert!(empty.total_length_mm.abs() < 1e-12);
    }
}
