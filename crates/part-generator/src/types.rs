use recipe_types::NodeId;

/// Errors that abort a whole generation. Every variant is a caller-side
/// contract violation; nothing here is produced by an unlucky seed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid difficulty '{value}' (expected beginner, intermediate or expert)")]
    InvalidDifficulty { value: String },

    #[error("invalid seed '{value}': expected an unsigned 64-bit integer")]
    InvalidSeed { value: String },

    #[error("bounding box must be positive, got {width} x {depth} x {height} mm")]
    NonPositiveBounds { width: f64, depth: f64, height: f64 },

    #[error("invalid difficulty policy: {reason}")]
    InvalidPolicy { reason: String },
}

/// Why a single feature could not be placed. Recovered inside the builder
/// by shrinking or dropping the feature.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementError {
    #[error("no collision-free position after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("candidate does not fit inside the margin-shrunk bounds")]
    DoesNotFit,

    #[error("feature unavailable: {reason}")]
    Unavailable { reason: String },
}

/// What the safety pass did to one feature.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SafetyAction {
    /// Tool reduced by the configured decrement; `thickness` is the
    /// estimate that triggered the shrink.
    Shrunk { feature: NodeId, thickness: f64 },
    /// Operation and tool removed; `thickness` is the estimate after the
    /// shrink attempt.
    Dropped { feature: NodeId, thickness: f64 },
}

impl SafetyAction {
    pub fn feature(&self) -> &NodeId {
        match self {
            SafetyAction::Shrunk { feature, .. } | SafetyAction::Dropped { feature, .. } => feature,
        }
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, SafetyAction::Dropped { .. })
    }
}
