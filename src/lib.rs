//! Lamina - slicer core
//!
//! Converts a closed triangle mesh into layered, toolpath-ready geometry:
//! per-layer cross-section polygons, concentric perimeter walls, and gyroid
//! infill polylines, assembled into one indexed edge graph per layer.
//!
//! The heavy lifting lives in the member crates; this crate adds the
//! configuration layer and the pipeline orchestrator and re-exports the
//! types a consumer needs.

mod config;
mod error;
mod pipeline;

pub use config::{
    ConfigError, ExtrusionConfig, InfillConfig, LayerConfig, LayerMode, SlicerConfig,
};
pub use error::PipelineError;
pub use pipeline::{LayerWarning, LayerWarningKind, SliceReport, Slicer};

// Re-export the pipeline stages for library consumers
pub use lamina_math::{Aabb2, Vec2, Vec3};
pub use lamina_mesh::{stl, MeshError, TriangleMesh, VertexPool};
pub use lamina_path::{
    interior_region, GyroidInfill, InfillGraph, LayerPaths, PerimeterSet, WaveOrientation,
};
pub use lamina_slice::{build_contours, CrossSection, LayerSchedule, ScheduleError};
