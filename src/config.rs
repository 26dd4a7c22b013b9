//! Slicer configuration
//!
//! Configuration is loaded from multiple sources with the following priority
//! (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`LAMINA_SECTION__KEY`)

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main slicer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlicerConfig {
    /// Layer schedule configuration
    #[serde(default)]
    pub layers: LayerConfig,
    /// Extrusion configuration
    #[serde(default)]
    pub extrusion: ExtrusionConfig,
    /// Infill configuration
    #[serde(default)]
    pub infill: InfillConfig,
}

impl SlicerConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`LAMINA_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        // Load default config (required)
        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // LAMINA_EXTRUSION__WALL_COUNT=2 -> extrusion.wall_count = 2
        figment = figment.merge(Env::prefixed("LAMINA_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Layer schedule mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerMode {
    /// `value` is the layer pitch in millimeters
    Thickness,
    /// `value` is the number of layers
    Count,
}

/// Layer schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Schedule generator to use
    pub mode: LayerMode,
    /// Layer pitch (thickness mode) or layer count (count mode)
    pub value: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            mode: LayerMode::Thickness,
            value: 1.0,
        }
    }
}

/// Extrusion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtrusionConfig {
    /// Nominal extrusion width (mm)
    pub line_width: f64,
    /// Number of perimeter shells
    pub wall_count: usize,
}

impl Default for ExtrusionConfig {
    fn default() -> Self {
        Self {
            line_width: 0.5,
            wall_count: 3,
        }
    }
}

/// Infill configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfillConfig {
    /// Nominal infill line spacing (mm)
    pub line_spacing: f64,
    /// Base sampling step for the gyroid wave (radians)
    pub sampling_step: f64,
    /// Chord-slope tolerance for midpoint refinement
    pub tolerance: f64,
    /// Cap on refinement steps per segment
    pub max_iterations: u32,
}

impl Default for InfillConfig {
    fn default() -> Self {
        Self {
            line_spacing: 1.0,
            sampling_step: std::f64::consts::PI / 50.0,
            tolerance: 0.1,
            max_iterations: 100,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
