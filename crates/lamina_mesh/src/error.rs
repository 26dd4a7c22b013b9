//! Mesh loading error types

use std::fmt;
use std::io;

/// Error type for mesh loading
#[derive(Debug)]
pub enum MeshError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Truncated binary payload or unparseable ASCII body
    Malformed(String),
    /// The file parsed but contains zero triangles
    EmptyMesh,
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::Io(err) => write!(f, "Mesh IO error: {}", err),
            MeshError::Malformed(msg) => write!(f, "Malformed mesh file: {}", msg),
            MeshError::EmptyMesh => write!(f, "Mesh file contains no triangles"),
        }
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshError::Io(err) => Some(err),
            MeshError::Malformed(_) => None,
            MeshError::EmptyMesh => None,
        }
    }
}

impl From<io::Error> for MeshError {
    fn from(err: io::Error) -> Self {
        MeshError::Io(err)
    }
}
