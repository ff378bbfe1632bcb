//! Configuration loading for a field session

use crate::drive::DriveTiming;
use crate::error::{FieldError, Result};
use serde::Deserialize;
use std::path::Path;

/// Field and drive parameters. Every key is optional in the TOML source:
///
/// ```toml
/// width = 30
/// height = 20
/// obstacle_rate = 0.2
/// speed = 5
///
/// [timing]
/// min_delay_ms = 20
/// base_delay_ms = 200
/// per_speed_ms = 15
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FieldConfig {
    /// Field width in cells, border included (default: 30)
    #[serde(default = "default_width")]
    pub width: usize,

    /// Field height in cells, border included (default: 20)
    #[serde(default = "default_height")]
    pub height: usize,

    /// Probability that a free interior cell becomes blocked when randomizing (default: 0.2)
    #[serde(default = "default_obstacle_rate")]
    pub obstacle_rate: f64,

    /// Inverse step delay knob, higher is faster (default: 5)
    #[serde(default = "default_speed")]
    pub speed: u32,

    #[serde(default)]
    pub timing: DriveTiming,
}

fn default_width() -> usize {
    30
}
fn default_height() -> usize {
    20
}
fn default_obstacle_rate() -> f64 {
    0.2
}
fn default_speed() -> u32 {
    5
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            obstacle_rate: default_obstacle_rate(),
            speed: default_speed(),
            timing: DriveTiming::default(),
        }
    }
}

impl FieldConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: FieldConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.width < 3 || self.height < 3 {
            return Err(FieldError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(0.0..=1.0).contains(&self.obstacle_rate) {
            return Err(FieldError::Config(format!(
                "obstacle_rate must lie in [0, 1], got {}",
                self.obstacle_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_gives_defaults() {
        assert_eq!(FieldConfig::from_toml_str("").unwrap(), FieldConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = FieldConfig::from_toml_str(
            "width = 12\nspeed = 9\n\n[timing]\nmin_delay_ms = 5\n",
        )
        .unwrap();
        assert_eq!(config.width, 12);
        assert_eq!(config.height, 20);
        assert_eq!(config.speed, 9);
        assert_eq!(config.timing.min_delay_ms, 5);
        assert_eq!(config.timing.base_delay_ms, 200);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            FieldConfig::from_toml_str("obstacle_rate = 1.5"),
            Err(FieldError::Config(_))
        ));
        assert!(matches!(
            FieldConfig::from_toml_str("height = 2"),
            Err(FieldError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            FieldConfig::from_toml_str("width = \"wide\""),
            Err(FieldError::Config(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            FieldConfig::load("/nonexistent/field.toml"),
            Err(FieldError::Io(_))
        ));
    }
}
