//! Pipeline error types

use std::fmt;

use lamina_mesh::MeshError;
use lamina_slice::ScheduleError;

/// Error type for a whole slicing run
///
/// Mesh and schedule problems abort the run before any layer is produced.
/// Per-layer conditions (non-manifold loops, dissolved offsets) never reach
/// this type; they are reported as [`LayerWarning`](crate::LayerWarning)s.
#[derive(Debug)]
pub enum PipelineError {
    /// The input mesh could not be loaded
    Mesh(MeshError),
    /// The layer schedule parameters are unusable
    Schedule(ScheduleError),
    /// The run was cancelled at a layer boundary
    Cancelled,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Mesh(err) => write!(f, "Mesh error: {}", err),
            PipelineError::Schedule(err) => write!(f, "Schedule error: {}", err),
            PipelineError::Cancelled => write!(f, "Slicing cancelled"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Mesh(err) => Some(err),
            PipelineError::Schedule(err) => Some(err),
            PipelineError::Cancelled => None,
        }
    }
}

impl From<MeshError> for PipelineError {
    fn from(err: MeshError) -> Self {
        PipelineError::Mesh(err)
    }
}

impl From<ScheduleError> for PipelineError {
    fn from(err: ScheduleError) -> Self {
        PipelineError::Schedule(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = PipelineError::from(MeshError::EmptyMesh);
        assert!(format!("{}", err).contains("no triangles"));

        let err = PipelineError::from(ScheduleError::InvalidCount { count: 1 });
        assert!(format!("{}", err).contains("greater than 1"));

        assert!(format!("{}", PipelineError::Cancelled).contains("cancelled"));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;
        assert!(PipelineError::from(MeshError::EmptyMesh).source().is_some());
        assert!(PipelineError::Cancelled.source().is_none());
    }
}
