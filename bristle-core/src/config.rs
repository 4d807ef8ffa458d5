use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for the bristle ensemble.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrushConfig {
    pub max_bristle_length: f32,
    pub max_bristle_thickness: f32,
    /// Upper bound of the per-update jitter added along the brush width.
    pub max_horizontal_noise: f32,
    /// Spread of the fixed bristle offsets across the brush depth.
    pub vertical_noise: f32,
    pub noise_speed: f32,
    /// Averaging window, and the number of updates before anchors exist.
    pub positions_for_average: usize,
    /// Bristles per unit of brush size are drawn from this range.
    pub bristle_density_min: f32,
    pub bristle_density_max: f32,
    /// A direction change whose cosine drops below this flips the bristles.
    pub sharp_turn_cos: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            max_bristle_length: 15.0,
            max_bristle_thickness: 5.0,
            max_horizontal_noise: 8.0,
            vertical_noise: 8.0,
            noise_speed: 0.04,
            positions_for_average: 5,
            bristle_density_min: 1.1,
            bristle_density_max: 1.3,
            sharp_turn_cos: 0.3,
        }
    }
}

/// Tunables for the stroke color pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    pub brightness_relative_change: f32,
    /// First step at which bristles pick up paint from the canvas.
    pub mix_starting_step: usize,
    pub mix_strength: f32,
    pub max_alpha_decrement: i32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            brightness_relative_change: 0.1,
            mix_starting_step: 10,
            mix_strength: 0.02,
            max_alpha_decrement: 25,
        }
    }
}

/// Tunables for the random-walk strokes painted by [`crate::sketch`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SketchConfig {
    pub n_steps: usize,
    pub speed: f32,
    pub brush_size: f32,
    pub heading_noise_scale: f32,
    /// Fraction of the canvas kept free on each side when picking a start.
    pub margin: f32,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            n_steps: 80,
            speed: 2.0,
            brush_size: 50.0,
            heading_noise_scale: 0.007,
            margin: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub brush: BrushConfig,
    pub trace: TraceConfig,
    pub sketch: SketchConfig,
}

impl Config {
    /// Parses a TOML document. Missing tables and keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the ranges the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.brush;
        if b.positions_for_average == 0 {
            return Err(ConfigError::Invalid(
                "brush.positions_for_average must be at least 1".into(),
            ));
        }
        if !(b.bristle_density_min > 0.0 && b.bristle_density_min <= b.bristle_density_max) {
            return Err(ConfigError::Invalid(format!(
                "brush bristle density range {}..{} is empty or not positive",
                b.bristle_density_min, b.bristle_density_max
            )));
        }
        if !(0.0..=1.0).contains(&self.trace.mix_strength) {
            return Err(ConfigError::Invalid(format!(
                "trace.mix_strength {} is outside 0..=1",
                self.trace.mix_strength
            )));
        }
        if self.trace.max_alpha_decrement < 0 {
            return Err(ConfigError::Invalid(
                "trace.max_alpha_decrement must not be negative".into(),
            ));
        }
        let s = &self.sketch;
        if s.n_steps == 0 {
            return Err(ConfigError::Invalid("sketch.n_steps must be at least 1".into()));
        }
        if !(s.brush_size.is_finite() && s.brush_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sketch.brush_size {} must be positive",
                s.brush_size
            )));
        }
        if !(0.0..0.5).contains(&s.margin) {
            return Err(ConfigError::Invalid(format!(
                "sketch.margin {} is outside 0..0.5",
                s.margin
            )));
        }
        Ok(())
    }
}
