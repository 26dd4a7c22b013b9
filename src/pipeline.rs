//! The slicing pipeline
//!
//! One [`Slicer`] owns the mesh table and the configuration. Slicing fans
//! the scheduled planes out over a rayon worker pool: layers share nothing
//! but the read-only mesh, so each plane runs the full cross-section ->
//! contours -> perimeters -> infill chain independently and the results are
//! collected back in schedule order.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use lamina_mesh::{stl, TriangleMesh};
use lamina_path::{GyroidInfill, InfillGraph, LayerPaths, PerimeterSet};
use lamina_slice::{build_contours, CrossSection, LayerSchedule};

use crate::{LayerMode, PipelineError, SlicerConfig};

/// Kind of a recovered per-layer condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerWarningKind {
    /// The cross-section had edges but no closed contours survived
    NonManifoldSlice,
    /// Contours existed but every perimeter offset dissolved
    DegenerateGeometry,
}

/// A per-layer condition that was recovered, not fatal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerWarning {
    /// Index into the layer schedule
    pub layer: usize,
    /// Height of the affected plane
    pub z0: f64,
    /// What went wrong
    pub kind: LayerWarningKind,
    /// Human-readable reason
    pub reason: String,
}

/// The result of slicing a mesh: layers ascending by z plus warnings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SliceReport {
    /// One record per scheduled layer, ascending by `z0`
    pub layers: Vec<LayerPaths>,
    /// Recovered per-layer conditions
    pub warnings: Vec<LayerWarning>,
}

impl SliceReport {
    /// Total printed segments across all layers
    pub fn total_segments(&self) -> usize {
        self.layers.iter().map(LayerPaths::segment_count).sum()
    }
}

/// Slicing pipeline entry point
pub struct Slicer {
    mesh: TriangleMesh,
    config: SlicerConfig,
}

impl Slicer {
    /// Create a slicer over an already-loaded mesh
    pub fn new(mesh: TriangleMesh, config: SlicerConfig) -> Self {
        Self { mesh, config }
    }

    /// Load an STL file and create a slicer for it
    pub fn from_stl<P: AsRef<Path>>(path: P, config: SlicerConfig) -> Result<Self, PipelineError> {
        let mesh = stl::load(path)?;
        Ok(Self::new(mesh, config))
    }

    /// The mesh being sliced
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Compute the layer schedule for the mesh under the current config
    pub fn schedule(&self) -> Result<LayerSchedule, PipelineError> {
        let (min_z, max_z) = self
            .mesh
            .z_range()
            .ok_or(PipelineError::Mesh(lamina_mesh::MeshError::EmptyMesh))?;
        let schedule = match self.config.layers.mode {
            LayerMode::Thickness => {
                LayerSchedule::by_thickness(min_z, max_z, self.config.layers.value)?
            }
            LayerMode::Count => {
                LayerSchedule::by_count(min_z, max_z, self.config.layers.value as usize)?
            }
        };
        Ok(schedule)
    }

    /// Slice the whole schedule
    pub fn slice(&self) -> Result<SliceReport, PipelineError> {
        self.slice_cancellable(&AtomicBool::new(false))
    }

    /// Slice the whole schedule, checking `cancel` at each layer boundary
    pub fn slice_cancellable(&self, cancel: &AtomicBool) -> Result<SliceReport, PipelineError> {
        let schedule = self.schedule()?;
        info!(
            "slicing {} triangles into {} layers",
            self.mesh.triangle_count(),
            schedule.len()
        );

        let outcomes: Vec<Option<(LayerPaths, Vec<LayerWarning>)>> = schedule
            .planes()
            .par_iter()
            .enumerate()
            .map(|(layer, &z0)| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                Some(self.process_layer(layer, z0))
            })
            .collect();

        let mut report = SliceReport::default();
        for outcome in outcomes {
            let Some((paths, warnings)) = outcome else {
                return Err(PipelineError::Cancelled);
            };
            report.layers.push(paths);
            report.warnings.extend(warnings);
        }

        info!(
            "sliced {} layers, {} segments, {} warnings",
            report.layers.len(),
            report.total_segments(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Run one plane through cross-section, contours, perimeters, and infill
    fn process_layer(&self, layer: usize, z0: f64) -> (LayerPaths, Vec<LayerWarning>) {
        let mut warnings = Vec::new();

        let section = CrossSection::slice_mesh(&self.mesh, z0);
        let polygons = build_contours(&section);
        if polygons.is_empty() && !section.is_empty() {
            let reason = format!(
                "{} edges produced no closed contours",
                section.edge_count()
            );
            warn!("layer {} (z = {}): {}", layer, z0, reason);
            warnings.push(LayerWarning {
                layer,
                z0,
                kind: LayerWarningKind::NonManifoldSlice,
                reason,
            });
        }

        let line_width = self.config.extrusion.line_width;
        let wall_count = self.config.extrusion.wall_count;

        let mut perimeter_pieces = Vec::new();
        for polygon in &polygons {
            perimeter_pieces.extend(PerimeterSet::build(polygon, line_width, wall_count).flattened());
        }
        if perimeter_pieces.is_empty() && !polygons.is_empty() && wall_count > 0 {
            let reason = "every perimeter offset dissolved".to_string();
            warn!("layer {} (z = {}): {}", layer, z0, reason);
            warnings.push(LayerWarning {
                layer,
                z0,
                kind: LayerWarningKind::DegenerateGeometry,
                reason,
            });
        }

        let infill = GyroidInfill {
            line_spacing: self.config.infill.line_spacing,
            sampling_step: self.config.infill.sampling_step,
            tolerance: self.config.infill.tolerance,
            max_iterations: self.config.infill.max_iterations,
        };
        let polylines = infill.generate(&polygons, line_width, wall_count, z0);
        let graph = InfillGraph::from_polylines(&polylines, z0);

        debug!(
            "layer {} (z = {}): {} polygons, {} wall pieces, {} infill edges",
            layer,
            z0,
            polygons.len(),
            perimeter_pieces.len(),
            graph.edges.len()
        );

        (LayerPaths::assemble(z0, perimeter_pieces, graph), warnings)
    }
}
