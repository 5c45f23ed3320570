//! Difficulty policy: the table that maps a difficulty level to sizing,
//! feature counts, allowed operations and safety thresholds.

use serde::{Deserialize, Serialize};

use recipe_types::{BooleanKind, Difficulty};

use crate::types::GenerateError;

/// Closed real interval `[min, max]` in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f64,
    pub max: f64,
}

impl SizeRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Inclusive feature-count interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

/// Everything the builder needs to know about a difficulty level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyPolicy {
    pub width: SizeRange,
    pub depth: SizeRange,
    pub height: SizeRange,
    pub feature_count: CountRange,
    pub allowed_ops: Vec<BooleanKind>,
    /// Thinnest wall (mm) the safety pass accepts at a cut site.
    pub min_wall_thickness: f64,
    /// Gap (mm) a tool must keep from tools it may not touch.
    pub collision_clearance: f64,
    /// Whether cutters may run along X or Y as well as Z.
    pub off_axis_features: bool,
}

impl DifficultyPolicy {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Beginner => Self {
                width: SizeRange::new(50.0, 200.0),
                depth: SizeRange::new(20.0, 150.0),
                height: SizeRange::new(10.0, 150.0),
                feature_count: CountRange { min: 1, max: 3 },
                allowed_ops: vec![BooleanKind::Subtract, BooleanKind::Union],
                min_wall_thickness: 2.0,
                collision_clearance: 3.0,
                off_axis_features: false,
            },
            Difficulty::Intermediate => Self {
                width: SizeRange::new(60.0, 240.0),
                depth: SizeRange::new(30.0, 180.0),
                height: SizeRange::new(15.0, 120.0),
                feature_count: CountRange { min: 3, max: 6 },
                allowed_ops: vec![
                    BooleanKind::Subtract,
                    BooleanKind::Union,
                    BooleanKind::Intersect,
                ],
                min_wall_thickness: 1.75,
                collision_clearance: 2.0,
                off_axis_features: true,
            },
            Difficulty::Expert => Self {
                width: SizeRange::new(40.0, 300.0),
                depth: SizeRange::new(25.0, 250.0),
                height: SizeRange::new(15.0, 160.0),
                feature_count: CountRange { min: 6, max: 9 },
                allowed_ops: vec![
                    BooleanKind::Subtract,
                    BooleanKind::Union,
                    BooleanKind::Intersect,
                ],
                min_wall_thickness: 1.5,
                collision_clearance: 1.0,
                off_axis_features: true,
            },
        }
    }

    pub fn allows(&self, kind: BooleanKind) -> bool {
        self.allowed_ops.contains(&kind)
    }

    /// Reject tables that could only produce invalid recipes.
    pub fn validate(&self) -> Result<(), GenerateError> {
        for (name, r) in [
            ("width", self.width),
            ("depth", self.depth),
            ("height", self.height),
        ] {
            if !(r.min.is_finite() && r.max.is_finite()) || r.min > r.max {
                return Err(GenerateError::InvalidPolicy {
                    reason: format!("{} range {}..{} is malformed", name, r.min, r.max),
                });
            }
            if r.min <= 0.0 {
                return Err(GenerateError::InvalidPolicy {
                    reason: format!("{} range {}..{} is not positive", name, r.min, r.max),
                });
            }
        }
        if self.feature_count.min > self.feature_count.max {
            return Err(GenerateError::InvalidPolicy {
                reason: format!(
                    "feature count range {}..{} is empty",
                    self.feature_count.min, self.feature_count.max
                ),
            });
        }
        if !(self.min_wall_thickness > 0.0) {
            return Err(GenerateError::InvalidPolicy {
                reason: "min_wall_thickness must be positive".into(),
            });
        }
        if !(self.collision_clearance >= 0.0) {
            return Err(GenerateError::InvalidPolicy {
                reason: "collision_clearance must not be negative".into(),
            });
        }
        Ok(())
    }
}
