//! Pinned regression fixtures.
//!
//! A pinned `(seed, difficulty)` pair skips the random draws and emits a
//! fixed part, but still goes through ordering, the safety pass and
//! finalization like any other recipe.

use recipe_types::{Axis, Difficulty, Dimensions, FeatureTag};

use crate::catalog::{FeatureKind, Mount, ToolRole};
use crate::feature::{Candidate, Profile};

/// A feature with its placement already decided.
#[derive(Debug, Clone, PartialEq)]
pub struct PinnedFeature {
    pub candidate: Candidate,
    pub uv: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub name: &'static str,
    pub bounds: Dimensions,
    pub features: Vec<PinnedFeature>,
}

pub const SIMPLE_PLATE_SEED: u64 = 12345;

/// The fixture pinned to `(seed, difficulty)`, if any.
pub fn pinned(seed: u64, difficulty: Difficulty) -> Option<Fixture> {
    match (seed, difficulty) {
        (SIMPLE_PLATE_SEED, Difficulty::Beginner) => Some(simple_plate()),
        _ => None,
    }
}

/// 100 x 50 x 25 plate with one 20 mm through hole at its centre.
fn simple_plate() -> Fixture {
    Fixture {
        name: "simple-plate",
        bounds: Dimensions::new(100.0, 50.0, 25.0),
        features: vec![PinnedFeature {
            candidate: Candidate {
                kind: FeatureKind::Hole,
                variant: None,
                role: ToolRole::Cutter,
                axis: Axis::Z,
                mount: Mount::Through,
                tag: FeatureTag::ThroughHole,
                profile: Profile::Round { radius: 10.0 },
                length: 0.0,
            },
            uv: (0.0, 0.0),
        }],
    }
}
