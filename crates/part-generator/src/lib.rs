//! Deterministic, seeded generator of mechanical-part recipes.
//!
//! A recipe is a base box plus an ordered chain of boolean operations
//! against primitive tools. The same `(seed, difficulty)` pair always
//! yields the same primitives, operations and bounding box.

pub mod builder;
pub mod catalog;
pub mod config;
pub mod feature;
pub mod fixtures;
pub mod placement;
pub mod policy;
pub mod rng;
pub mod safety;
pub mod types;

pub use builder::{csg_depth, order_operations, recipe_id, rethread, RecipeBuilder};
pub use config::GeneratorConfig;
pub use policy::{CountRange, DifficultyPolicy, SizeRange};
pub use rng::{Mulberry32, RandomSource};
pub use safety::{safety_pass, site_thickness, SafetyReport};
pub use types::{GenerateError, PlacementError, SafetyAction};

use recipe_types::{Difficulty, PartRecipe};
use tracing::instrument;

/// Generate the recipe for `(seed, difficulty)` with the built-in policy.
#[instrument]
pub fn generate(seed: u64, difficulty: Difficulty) -> Result<PartRecipe, GenerateError> {
    RecipeBuilder::new(seed, difficulty).build()
}

/// Generate from untyped inputs, as received from a command line or a
/// request body.
pub fn generate_from_str(seed: &str, difficulty: &str) -> Result<PartRecipe, GenerateError> {
    generate(parse_seed(seed)?, parse_difficulty(difficulty)?)
}

/// Decimal or `0x`-prefixed hexadecimal `u64`.
pub fn parse_seed(value: &str) -> Result<u64, GenerateError> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|_| GenerateError::InvalidSeed {
        value: value.to_string(),
    })
}

pub fn parse_difficulty(value: &str) -> Result<Difficulty, GenerateError> {
    value
        .parse::<Difficulty>()
        .map_err(|e| GenerateError::InvalidDifficulty { value: e.0 })
}
