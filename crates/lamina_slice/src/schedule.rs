//! Layer schedule construction

use std::fmt;

use lamina_math::TOP_CLAMP;

/// Error type for schedule construction
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Layer thickness is non-positive or too large for the model height
    InvalidThickness { step: f64, range: f64 },
    /// Count mode needs at least two layers
    InvalidCount { count: usize },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidThickness { step, range } => write!(
                f,
                "layer thickness {} is invalid for a model of height {}",
                step, range
            ),
            ScheduleError::InvalidCount { count } => {
                write!(f, "layer count must be greater than 1, got {}", count)
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// The ordered z values at which the mesh is sliced
///
/// The final plane always sits at `max_z - 1e-5` so it never samples exactly
/// on the topmost face.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSchedule {
    planes: Vec<f64>,
}

impl LayerSchedule {
    /// Arithmetic progression from `min_z` with the given step
    ///
    /// Steps at or above half the model height are rejected, as are
    /// non-positive steps.
    pub fn by_thickness(min_z: f64, max_z: f64, step: f64) -> Result<Self, ScheduleError> {
        let range = max_z - min_z;
        if step <= 0.0 || step >= range / 2.0 {
            return Err(ScheduleError::InvalidThickness { step, range });
        }

        let mut planes = Vec::new();
        let mut k = 0u32;
        loop {
            let z = min_z + f64::from(k) * step;
            if z >= max_z {
                break;
            }
            planes.push(z);
            k += 1;
        }
        planes.push(max_z - TOP_CLAMP);
        Ok(Self { planes })
    }

    /// `count` linearly spaced values from `min_z` to `max_z`
    pub fn by_count(min_z: f64, max_z: f64, count: usize) -> Result<Self, ScheduleError> {
        if count <= 1 {
            return Err(ScheduleError::InvalidCount { count });
        }

        let mut planes = Vec::with_capacity(count);
        for i in 0..count {
            let t = i as f64 / (count - 1) as f64;
            planes.push(min_z + (max_z - min_z) * t);
        }
        *planes.last_mut().expect("count > 1") = max_z - TOP_CLAMP;
        Ok(Self { planes })
    }

    /// The scheduled planes, ascending
    pub fn planes(&self) -> &[f64] {
        &self.planes
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Whether the schedule is empty
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}
