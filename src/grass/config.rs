//! Grass field configuration.
//!
//! Constant for the lifetime of an active field. Changing any value means
//! deactivating and reactivating the field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// User-facing grass field configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassConfig {
    /// Chunks per side of the square chunk grid.
    pub chunk_dimension: u32,
    /// Blades per side of one chunk before density is applied.
    pub instances_per_chunk_dimension: u32,
    /// Multiplier on `instances_per_chunk_dimension`.
    pub density_per_dimension: u32,
    /// Side length of the whole field in meters, centered on the origin.
    pub field_size: f32,
    /// Vertical extent of every chunk bound.
    pub bound_height: f32,
    /// Blades farther than this from the camera are culled.
    pub distance_cutoff: f32,
    /// Chunks whose center is farther than this use the reduced mesh.
    pub lod_distance: f32,
    /// Blade height used to test the tip as well as the root.
    pub blade_height: f32,
    /// Clip-space tolerance around the view volume.
    pub frustum_margin: f32,
    /// Extra vertical tolerance scaled by |sin(pitch)|.
    pub pitch_margin: f32,
    /// Skip chunks whose bound is outside the frustum or cutoff.
    pub chunk_precull: bool,
    /// Placement seed.
    pub seed: u32,
    /// Random offset as a fraction of blade spacing, 0..1.
    pub jitter: f32,
    /// Peak height of the ground under the blades (0 = flat).
    pub height_amplitude: f32,
    /// Frequency of the ground height noise, per meter.
    pub height_frequency: f32,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            chunk_dimension: 2,
            instances_per_chunk_dimension: 64,
            density_per_dimension: 1,
            field_size: 100.0,
            bound_height: 20.0,
            distance_cutoff: 150.0,
            lod_distance: 40.0,
            blade_height: 1.0,
            frustum_margin: 0.1,
            pitch_margin: 0.25,
            chunk_precull: true,
            seed: 12345,
            jitter: 0.5,
            height_amplitude: 0.0,
            height_frequency: 0.05,
        }
    }
}

impl GrassConfig {
    /// Blades per side of one chunk.
    pub fn per_dimension(&self) -> u32 {
        self.instances_per_chunk_dimension * self.density_per_dimension
    }

    /// Candidate instances in one chunk.
    pub fn instances_per_chunk(&self) -> u32 {
        self.per_dimension() * self.per_dimension()
    }

    pub fn chunk_count(&self) -> usize {
        (self.chunk_dimension * self.chunk_dimension) as usize
    }

    /// Side length of one chunk in meters.
    pub fn chunk_size(&self) -> f32 {
        self.field_size / self.chunk_dimension as f32
    }

    /// Reject values that would reach a dispatch with an empty or
    /// overflowing buffer.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_dimension == 0 {
            return Err(Error::Config("chunk_dimension must be at least 1".into()));
        }
        if self.instances_per_chunk_dimension == 0 {
            return Err(Error::Config("instances_per_chunk_dimension must be at least 1".into()));
        }
        if self.density_per_dimension == 0 {
            return Err(Error::Config("density_per_dimension must be at least 1".into()));
        }

        let per_dimension = self
            .instances_per_chunk_dimension
            .checked_mul(self.density_per_dimension)
            .ok_or_else(|| Error::Config("blades per chunk dimension overflow u32".into()))?;
        per_dimension
            .checked_mul(per_dimension)
            .ok_or_else(|| Error::Config(format!(
                "{per_dimension}x{per_dimension} blades per chunk overflow u32"
            )))?;
        self.chunk_dimension
            .checked_mul(self.chunk_dimension)
            .ok_or_else(|| Error::Config("chunk grid overflows u32".into()))?;

        positive("field_size", self.field_size)?;
        positive("bound_height", self.bound_height)?;
        non_negative("distance_cutoff", self.distance_cutoff)?;
        non_negative("lod_distance", self.lod_distance)?;
        non_negative("blade_height", self.blade_height)?;
        non_negative("frustum_margin", self.frustum_margin)?;
        non_negative("pitch_margin", self.pitch_margin)?;
        non_negative("height_amplitude", self.height_amplitude)?;
        non_negative("height_frequency", self.height_frequency)?;
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(Error::Config(format!("jitter must be within 0..=1, got {}", self.jitter)));
        }
        Ok(())
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be a positive finite number, got {value}")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be finite and non-negative, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = GrassConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.per_dimension(), 64);
        assert_eq!(cfg.instances_per_chunk(), 4096);
        assert_eq!(cfg.chunk_count(), 4);
        assert_eq!(cfg.chunk_size(), 50.0);
    }

    #[test]
    fn test_density_multiplies_dimension() {
        let cfg = GrassConfig {
            instances_per_chunk_dimension: 10,
            density_per_dimension: 3,
            ..Default::default()
        };
        assert_eq!(cfg.per_dimension(), 30);
        assert_eq!(cfg.instances_per_chunk(), 900);
    }

    #[test]
    fn test_rejects_zero_counts() {
        for cfg in [
            GrassConfig { chunk_dimension: 0, ..Default::default() },
            GrassConfig { instances_per_chunk_dimension: 0, ..Default::default() },
            GrassConfig { density_per_dimension: 0, ..Default::default() },
        ] {
            assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_rejects_overflow() {
        let cfg = GrassConfig {
            instances_per_chunk_dimension: 70_000,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_bad_floats() {
        let cfg = GrassConfig { field_size: 0.0, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = GrassConfig { distance_cutoff: f32::NAN, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = GrassConfig { lod_distance: -1.0, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = GrassConfig { jitter: 1.5, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("grass.json");
        let cfg = GrassConfig {
            chunk_dimension: 3,
            distance_cutoff: 75.0,
            chunk_precull: false,
            ..Default::default()
        };
        cfg.save(&path).unwrap();
        let loaded = GrassConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: GrassConfig = serde_json::from_str(r#"{ "chunk_dimension": 4 }"#).unwrap();
        assert_eq!(cfg.chunk_dimension, 4);
        assert_eq!(cfg.instances_per_chunk_dimension, 64);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "density_per_dimension": 0 }"#).unwrap();
        assert!(matches!(GrassConfig::load(&path), Err(Error::Config(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(GrassConfig::load(&path), Err(Error::Json(_))));
    }
}
