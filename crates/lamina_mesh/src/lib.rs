//! Mesh input for the lamina slicer
//!
//! Loads ASCII and binary STL files into a deduplicated vertex/face/normal
//! table. Format detection, the binary record layout, and the 9-decimal
//! vertex keying are part of the slicing contract; see [`stl`] for details.

mod error;
mod mesh;
pub mod stl;

pub use error::MeshError;
pub use mesh::{TriangleMesh, VertexPool};
