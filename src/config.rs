//! Cloth configuration.
//!
//! Defaults reproduce the reference scene: a 20x20 cell sheet, 4 units wide,
//! hanging 2 units above the floor with its four corners pinned.
//!
//! ```
//! use drape::ClothConfig;
//!
//! let config = ClothConfig::new()
//!     .with_grid(10, 10)
//!     .with_mass(0.25)
//!     .with_time_step(1.0 / 240.0);
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::spring::SpringConstants;

/// Which points are anchored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum PinPolicy {
    /// The four grid corners.
    #[default]
    Corners,
    /// Explicit point indices.
    Indices(Vec<usize>),
    /// Nothing pinned.
    None,
}

/// Every tunable of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothConfig {
    /// Cells along x (`numX`). Points per row is `cols + 1`.
    pub cols: usize,
    /// Cells along z (`numY`).
    pub rows: usize,
    /// Edge length of the sheet.
    pub size: f32,
    /// Initial height of the sheet above the floor.
    pub height: f32,
    pub structural: SpringConstants,
    pub shear: SpringConstants,
    pub bend: SpringConstants,
    /// Velocity damping coefficient, added as `damping * v`.
    pub damping: f32,
    pub gravity: Vec3,
    /// Mass of every point.
    pub mass: f32,
    /// Fixed physics timestep in seconds.
    pub time_step: f32,
    /// Maximum physics steps per presentation tick. 1 means no catch-up.
    pub max_steps_per_tick: u32,
    /// Hit-test radius for selecting a point.
    pub pick_radius: f32,
    pub pins: PinPolicy,
}

impl ClothConfig {
    pub fn new() -> Self {
        Self {
            cols: 20,
            rows: 20,
            size: 4.0,
            height: 2.0,
            structural: SpringConstants::new(0.5, -0.25),
            shear: SpringConstants::new(0.5, -0.25),
            bend: SpringConstants::new(0.85, -0.25),
            damping: -0.1,
            gravity: Vec3::new(0.0, -0.00981, 0.0),
            mass: 0.5,
            time_step: 1.0 / 120.0,
            max_steps_per_tick: 1,
            pick_radius: 0.1,
            pins: PinPolicy::Corners,
        }
    }

    pub fn with_grid(mut self, cols: usize, rows: usize) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn with_structural(mut self, ks: f32, kd: f32) -> Self {
        self.structural = SpringConstants::new(ks, kd);
        self
    }

    pub fn with_shear(mut self, ks: f32, kd: f32) -> Self {
        self.shear = SpringConstants::new(ks, kd);
        self
    }

    pub fn with_bend(mut self, ks: f32, kd: f32) -> Self {
        self.bend = SpringConstants::new(ks, kd);
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_time_step(mut self, dt: f32) -> Self {
        self.time_step = dt;
        self
    }

    /// Allow up to `steps` physics steps per tick (clamped to at least 1).
    pub fn with_max_steps_per_tick(mut self, steps: u32) -> Self {
        self.max_steps_per_tick = steps.max(1);
        self
    }

    pub fn with_pick_radius(mut self, radius: f32) -> Self {
        self.pick_radius = radius;
        self
    }

    pub fn with_pins(mut self, pins: PinPolicy) -> Self {
        self.pins = pins;
        self
    }

    /// Number of mass points, `(cols + 1) * (rows + 1)`.
    pub fn point_count(&self) -> usize {
        (self.cols + 1) * (self.rows + 1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols < 2 || self.rows < 2 {
            return Err(ConfigError::GridTooSmall {
                cols: self.cols,
                rows: self.rows,
            });
        }

        for (name, value) in [
            ("size", self.size),
            ("mass", self.mass),
            ("time_step", self.time_step),
            ("pick_radius", self.pick_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        let finite = [
            ("height", self.height.is_finite()),
            ("damping", self.damping.is_finite()),
            ("gravity", self.gravity.is_finite()),
            ("structural", self.structural.ks.is_finite() && self.structural.kd.is_finite()),
            ("shear", self.shear.ks.is_finite() && self.shear.kd.is_finite()),
            ("bend", self.bend.ks.is_finite() && self.bend.kd.is_finite()),
        ];
        if let Some(&(name, _)) = finite.iter().find(|(_, ok)| !ok) {
            return Err(ConfigError::NotFinite { name });
        }

        if let PinPolicy::Indices(indices) = &self.pins {
            let count = self.point_count();
            if let Some(&index) = indices.iter().find(|&&i| i >= count) {
                return Err(ConfigError::PinOutOfBounds { index, count });
            }
        }

        Ok(())
    }

    /// Load and validate a JSON config. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for ClothConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClothConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.point_count(), 441);
    }

    #[test]
    fn test_small_grid_rejected() {
        let config = ClothConfig::new().with_grid(1, 4);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooSmall { cols: 1, rows: 4 })
        ));
    }

    #[test]
    fn test_bad_mass_rejected() {
        let config = ClothConfig::new().with_mass(0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { name: "mass", .. })
        ));
    }

    #[test]
    fn test_nan_gravity_rejected() {
        let config = ClothConfig::new().with_gravity(Vec3::new(0.0, f32::NAN, 0.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { name: "gravity" })
        ));
    }

    #[test]
    fn test_pin_out_of_bounds() {
        let config = ClothConfig::new()
            .with_grid(2, 2)
            .with_pins(PinPolicy::Indices(vec![0, 9]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PinOutOfBounds { index: 9, count: 9 })
        ));
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config: ClothConfig = serde_json::from_str(r#"{ "cols": 8, "mass": 1.0 }"#).unwrap();
        assert_eq!(config.cols, 8);
        assert_eq!(config.rows, 20);
        assert_eq!(config.mass, 1.0);
        assert_eq!(config.pins, PinPolicy::Corners);
    }

    #[test]
    fn test_max_steps_clamped() {
        let config = ClothConfig::new().with_max_steps_per_tick(0);
        assert_eq!(config.max_steps_per_tick, 1);
    }
}
