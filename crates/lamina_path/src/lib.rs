//! Toolpath geometry for the lamina pipeline
//!
//! Takes the polygons-with-holes of one layer and produces everything the
//! downstream emitter needs: concentric perimeter walls, gyroid infill
//! polylines clipped to the interior, and the merged per-layer vertex/edge
//! graph.

mod infill;
mod layer;
mod perimeter;

pub use infill::{merge_polylines, GyroidInfill, InfillGraph, WaveOrientation};
pub use layer::LayerPaths;
pub use perimeter::{erode, interior_region, PerimeterSet, Wall};
