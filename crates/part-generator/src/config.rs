//! Tunable constants of the generation pipeline.

use serde::{Deserialize, Serialize};

use crate::types::GenerateError;

/// Knobs that apply to every difficulty. Changing any of them changes the
/// output for a given seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Placement attempts per candidate size.
    pub max_attempts: u32,
    /// Scale applied to a candidate after its placement attempts run out.
    pub shrink_factor: f64,
    /// How many shrunk re-placements precede a drop.
    pub shrink_retries: u32,
    /// Amount (mm) the safety pass takes off a thin-walled tool.
    pub safety_decrement: f64,
    /// Extra length (mm) a cutter extends past each face it opens.
    pub through_overshoot: f64,
    /// Grid (mm) that sampled sizes and positions snap to.
    pub size_step: f64,
    /// Lower bound of the placement margin (mm).
    pub margin_floor: f64,
    /// Placement margin as a fraction of the smallest base extent.
    pub margin_ratio: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            shrink_factor: 0.5,
            shrink_retries: 1,
            safety_decrement: 1.0,
            through_overshoot: 1.0,
            size_step: 0.5,
            margin_floor: 2.0,
            margin_ratio: 0.02,
        }
    }
}

impl GeneratorConfig {
    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), GenerateError> {
        let reason = if self.max_attempts == 0 {
            Some("max_attempts must be at least 1")
        } else if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            Some("shrink_factor must be in (0, 1)")
        } else if !(self.safety_decrement > 0.0) {
            Some("safety_decrement must be positive")
        } else if !(self.through_overshoot >= 0.0) {
            Some("through_overshoot must not be negative")
        } else if !(self.size_step > 0.0) {
            Some("size_step must be positive")
        } else if !(self.margin_floor >= 0.0 && self.margin_ratio >= 0.0) {
            Some("margin parameters must not be negative")
        } else {
            None
        };
        match reason {
            Some(r) => Err(GenerateError::InvalidPolicy {
                reason: r.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Round a size to the nearest grid step, never below one step.
    pub fn snap_size(&self, value: f64) -> f64 {
        ((value / self.size_step).round() * self.size_step).max(self.size_step)
    }

    /// Snap a coordinate toward zero so a symmetric range stays respected.
    pub fn snap_position(&self, value: f64) -> f64 {
        let snapped = (value / self.size_step).trunc() * self.size_step;
        // Avoid emitting -0.0.
        if snapped == 0.0 {
            0.0
        } else {
            snapped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let c = GeneratorConfig::default();
        assert_eq!(c.max_attempts, 8);
        assert_eq!(c.shrink_factor, 0.5);
        assert_eq!(c.shrink_retries, 1);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = GeneratorConfig::from_json(r#"{"max_attempts": 4}"#).unwrap();
        assert_eq!(c.max_attempts, 4);
        assert_eq!(c.size_step, 0.5);
    }

    #[test]
    fn rejects_zero_attempts() {
        let c = GeneratorConfig {
            max_attempts: 0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(GenerateError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn snapping() {
        let c = GeneratorConfig::default();
        assert_eq!(c.snap_size(3.3), 3.5);
        assert_eq!(c.snap_size(0.1), 0.5);
        assert_eq!(c.snap_position(-7.9), -7.5);
        assert_eq!(c.snap_position(7.9), 7.5);
        assert!(c.snap_position(-0.2).is_sign_positive());
    }
}
