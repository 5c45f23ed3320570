use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::NodeId;
use crate::operation::Operation;
use crate::shape::Primitive;

/// Exercise difficulty. Always chosen by the caller, never randomized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a difficulty name that is not one of the three levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDifficulty(pub String);

impl fmt::Display for UnknownDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown difficulty '{}'", self.0)
    }
}

impl std::error::Error for UnknownDifficulty {}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "expert" => Ok(Difficulty::Expert),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Linear unit system. Millimetres are the only accepted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    #[default]
    #[serde(rename = "mm")]
    Millimetres,
}

/// Nominal size of the base volume in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, depth: f64, height: f64) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.width, self.depth, self.height]
    }

    pub fn min_extent(&self) -> f64 {
        self.width.min(self.depth).min(self.height)
    }

    pub fn is_positive(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Generation statistics and provenance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMetadata {
    /// Features present in the finished recipe.
    pub feature_count: usize,
    /// Features drawn before placement and safety.
    pub sampled_features: usize,
    /// `sampled_features - feature_count`.
    pub dropped_features: usize,
    pub placement_drops: usize,
    pub safety_drops: usize,
    pub shrunk_features: usize,
    /// Tool ids of features that did not survive, in drop order.
    #[serde(default)]
    pub dropped_feature_ids: Vec<NodeId>,
    /// Longest target-reference chain back to a primitive.
    pub csg_depth: usize,
    /// Number of distinct primitive kinds used.
    pub primitive_kinds: usize,
    #[serde(default)]
    pub generator: String,
    #[serde(default)]
    pub rng: String,
    /// Free-form extras (fixture name, provenance notes).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The generation artifact: a bounded solid and its ordered boolean features.
///
/// Treated as an immutable snapshot once returned; consumers that need a
/// different recipe build a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecipe {
    pub id: Uuid,
    pub seed: u64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub units: Units,
    #[serde(rename = "bounding_mm")]
    pub bounding_mm: Dimensions,
    /// Creation order.
    pub primitives: Vec<Primitive>,
    /// Application order.
    pub operations: Vec<Operation>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: RecipeMetadata,
}

impl PartRecipe {
    pub fn primitive(&self, id: &NodeId) -> Option<&Primitive> {
        self.primitives.iter().find(|p| &p.id == id)
    }

    pub fn operation(&self, id: &NodeId) -> Option<&Operation> {
        self.operations.iter().find(|o| &o.id == id)
    }

    /// The base solid, `p0`.
    pub fn base(&self) -> Option<&Primitive> {
        self.primitive(&NodeId::primitive(0))
    }

    /// Semantic content only: two recipes from the same seed and difficulty
    /// compare equal here even if generated at different times.
    pub fn same_geometry(&self, other: &PartRecipe) -> bool {
        self.id == other.id
            && self.seed == other.seed
            && self.difficulty == other.difficulty
            && self.bounding_mm == other.bounding_mm
            && self.primitives == other.primitives
            && self.operations == other.operations
            && self.metadata == other.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Expert".parse::<Difficulty>(), Ok(Difficulty::Expert));
        assert_eq!(" beginner ".parse::<Difficulty>(), Ok(Difficulty::Beginner));
        assert!("hard".parse::<Difficulty>().is_err());
    }

    #[test]
    fn units_serialize_as_mm() {
        assert_eq!(serde_json::to_string(&Units::Millimetres).unwrap(), "\"mm\"");
        assert!(serde_json::from_str::<Units>("\"in\"").is_err());
    }

    #[test]
    fn dimensions_min_extent() {
        let d = Dimensions::new(100.0, 50.0, 25.0);
        assert_eq!(d.min_extent(), 25.0);
        assert!(d.is_positive());
        assert!(!Dimensions::new(100.0, 0.0, 25.0).is_positive());
    }
}
